//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use smrv_errors::{Error, NetworkError};
    use smrv_events::{channel, AppEvent, DownloadEvent};
    use smrv_net::*;
    use std::time::Duration;

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_fetch_bytes() {
        let server = MockServer::start_async().await;
        let (tx, _rx) = channel();

        let content = b"PK\x03\x04 archive bytes";
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/version/abc/download");
                then.status(200).body(content);
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let bytes = fetch_bytes(&client, &server.url("/v1/version/abc/download"), &tx)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, content);
    }

    #[tokio::test]
    async fn test_http_error_handling() {
        let server = MockServer::start_async().await;
        let (tx, _rx) = channel();

        server
            .mock_async(|when, then| {
                when.method(GET).path("/404");
                then.status(404).body("Not Found");
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let error = fetch_bytes(&client, &server.url("/404"), &tx)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            Error::Network(NetworkError::HttpError { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_download_first_try() {
        let server = MockServer::start_async().await;
        let (tx, mut rx) = channel();

        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/archive.zip");
                then.status(200).body("zip");
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let downloaded =
            download_with_retry(&client, &server.url("/archive.zip"), &quick_policy(3), &tx)
                .await
                .unwrap();

        mock.assert_hits_async(1).await;
        assert_eq!(downloaded.bytes, b"zip");
        assert_eq!(downloaded.attempts, 1);

        let mut saw_complete = false;
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Download(DownloadEvent::Completed { size, attempts, .. }) =
                message.event
            {
                assert_eq!(size, 3);
                assert_eq!(attempts, 1);
                saw_complete = true;
            }
        }
        assert!(saw_complete);
    }

    #[tokio::test]
    async fn test_persistent_bad_request_exhausts_attempts() {
        let server = MockServer::start_async().await;
        let (tx, mut rx) = channel();

        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/pending.zip");
                then.status(400).body("file not ready");
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let error =
            download_with_retry(&client, &server.url("/pending.zip"), &quick_policy(3), &tx)
                .await
                .unwrap_err();

        mock.assert_hits_async(3).await;
        assert!(matches!(
            error,
            Error::Network(NetworkError::RetriesExhausted { attempts: 3, .. })
        ));

        let mut saw_failed = false;
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Download(DownloadEvent::Failed { attempts, .. }) = message.event {
                assert_eq!(attempts, 3);
                saw_failed = true;
            }
        }
        assert!(saw_failed);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start_async().await;
        let (tx, _rx) = channel();

        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/broken.zip");
                then.status(500);
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let error =
            download_with_retry(&client, &server.url("/broken.zip"), &quick_policy(5), &tx)
                .await
                .unwrap_err();

        mock.assert_hits_async(1).await;
        assert!(matches!(
            error,
            Error::Network(NetworkError::HttpError { status: 500, .. })
        ));
    }
}

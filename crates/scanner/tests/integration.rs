//! Integration tests for scanner crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;
    use smrv_errors::{Error, ScanError};
    use smrv_events::channel;
    use smrv_scanner::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn spawn_scanner(server: &MockServer, results: &TempDir) -> FileScanner {
        let (tx, _rx) = channel();
        let transport = VirusTotalTransport::new(
            server.url("/api/v3"),
            "test-key",
            Duration::from_secs(10),
        )
        .unwrap();
        let (queue, _drainer) = RequestQueue::spawn(
            Arc::new(transport),
            RateLimit::new(10, Duration::from_secs(60)),
            tx.clone(),
        );

        FileScanner::new(
            queue,
            ScanSettings {
                results_dir: results.path().to_path_buf(),
                first_poll_delay: Duration::from_millis(10),
                poll_delay: Duration::from_millis(10),
            },
            tx,
        )
    }

    #[tokio::test]
    async fn test_scan_against_virustotal_api() {
        let server = MockServer::start_async().await;
        let results = TempDir::new().unwrap();

        let upload_url = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v3/files/upload_url")
                    .header("x-apikey", "test-key");
                then.status(200)
                    .json_body(json!({ "data": server.url("/upload/abc") }));
            })
            .await;
        let upload = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/upload/abc")
                    .header("x-apikey", "test-key")
                    .body_contains("name=\"file\"")
                    .body_contains("filename=\"v9_Mod.dll\"")
                    .body_contains("payload-bytes");
                then.status(200)
                    .json_body(json!({ "data": { "type": "analysis", "id": "an-9" } }));
            })
            .await;
        let analysis = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v3/analyses/an-9");
                then.status(200).json_body(json!({
                    "data": {
                        "id": "an-9",
                        "attributes": {
                            "status": "completed",
                            "stats": { "harmless": 0, "suspicious": 0, "malicious": 0, "undetected": 70 }
                        }
                    }
                }));
            })
            .await;

        let scanner = spawn_scanner(&server, &results);
        let clean = scanner
            .scan(b"payload-bytes".to_vec(), "v9_Mod.dll", "Mod/2.0.0/v9/Mod.dll")
            .await
            .unwrap();

        assert!(clean);
        upload_url.assert_hits_async(1).await;
        upload.assert_hits_async(1).await;
        analysis.assert_hits_async(1).await;

        let saved = std::fs::read_to_string(results.path().join("Mod/2.0.0/v9/Mod.dll.json")).unwrap();
        assert!(saved.contains("\"undetected\": 70"));
    }

    #[tokio::test]
    async fn test_scanner_error_propagates() {
        let server = MockServer::start_async().await;
        let results = TempDir::new().unwrap();

        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v3/files/upload_url");
                then.status(401).body("{\"error\":{\"code\":\"WrongCredentialsError\"}}");
            })
            .await;

        let scanner = spawn_scanner(&server, &results);
        let error = scanner
            .scan(b"x".to_vec(), "label", "key")
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            Error::Scan(ScanError::HttpStatus { status: 401, .. })
        ));
        assert!(!results.path().join("key.json").exists());
    }

    #[tokio::test]
    async fn test_malformed_upload_reply() {
        let server = MockServer::start_async().await;
        let results = TempDir::new().unwrap();

        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v3/files/upload_url");
                then.status(200).json_body(json!({ "data": 42 }));
            })
            .await;

        let scanner = spawn_scanner(&server, &results);
        let error = scanner.scan(b"x".to_vec(), "label", "key").await.unwrap_err();
        assert!(matches!(
            error,
            Error::Scan(ScanError::UnexpectedResponse { .. })
        ));
    }
}

//! Archive downloads with bounded retry
//!
//! Only "bad request" responses are retried; the registry answers 400 for a
//! freshly uploaded version whose file is not yet available. Every other
//! failure aborts immediately.

mod config;
mod retry;
mod validation;

pub use config::{Downloaded, RetryPolicy};
pub use retry::retry_bad_request;
pub(crate) use validation::validate_response;

use crate::client::NetClient;
use smrv_errors::{Error, NetworkError};
use smrv_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext};

/// Download a file into memory, retrying bad-request failures
///
/// # Errors
///
/// Returns `NetworkError::RetriesExhausted` when every attempt was answered
/// with a bad request, or the first non-retryable error otherwise.
pub async fn download_with_retry(
    client: &NetClient,
    url: &str,
    policy: &RetryPolicy,
    tx: &EventSender,
) -> Result<Downloaded, Error> {
    let result = retry_bad_request(policy, url, tx, |attempt| async move {
        tx.emit(AppEvent::Download(DownloadEvent::Started {
            url: url.to_string(),
            attempt,
        }));
        crate::fetch_bytes(client, url, tx).await
    })
    .await;

    match result {
        Ok((bytes, attempts)) => {
            tx.emit(AppEvent::Download(DownloadEvent::Completed {
                url: url.to_string(),
                size: bytes.len() as u64,
                attempts,
            }));
            Ok(Downloaded { bytes, attempts })
        }
        Err(e) => {
            let attempts = match &e {
                Error::Network(NetworkError::RetriesExhausted { attempts, .. }) => *attempts,
                _ => 1,
            };
            tx.emit(AppEvent::Download(DownloadEvent::Failed {
                url: url.to_string(),
                attempts,
                failure: FailureContext::from_error(&e),
            }));
            Err(e)
        }
    }
}

//! Retry loop for bad-request failures

use super::config::RetryPolicy;
use smrv_errors::{Error, NetworkError};
use smrv_events::{AppEvent, DownloadEvent, EventEmitter, EventSender};
use std::future::Future;

/// Run `attempt` until it succeeds, fails with something other than a bad
/// request, or `policy.max_attempts` attempts were made.
///
/// The closure receives the 1-based attempt number. On success the value is
/// returned together with the number of attempts used.
///
/// # Errors
///
/// Returns the first non-bad-request error unchanged, or
/// `NetworkError::RetriesExhausted` once the attempt budget is spent.
pub async fn retry_bad_request<T, F, Fut>(
    policy: &RetryPolicy,
    url: &str,
    tx: &EventSender,
    mut attempt: F,
) -> Result<(T, u32), Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut n = 1;

    loop {
        match attempt(n).await {
            Ok(value) => return Ok((value, n)),
            Err(Error::Network(e)) if e.is_bad_request() && n < max_attempts => {
                tx.emit(AppEvent::Download(DownloadEvent::RetryScheduled {
                    url: url.to_string(),
                    attempt: n,
                    max_attempts,
                    delay: policy.delay,
                    error: e.to_string(),
                }));
                tokio::time::sleep(policy.delay).await;
                n += 1;
            }
            Err(Error::Network(e)) if e.is_bad_request() => {
                return Err(NetworkError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: n,
                    last_error: e.to_string(),
                }
                .into());
            }
            Err(e) => return Err(e),
        }
    }
}

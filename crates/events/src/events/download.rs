use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Archive download events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// An attempt started
    Started { url: String, attempt: u32 },

    /// A bad-request failure will be retried after a delay
    RetryScheduled {
        url: String,
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
        error: String,
    },

    /// The body was fully received
    Completed {
        url: String,
        size: u64,
        attempts: u32,
    },

    /// The download was given up
    Failed {
        url: String,
        attempts: u32,
        failure: FailureContext,
    },
}

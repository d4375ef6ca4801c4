use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Admission events of the rate-limited scanner request queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueEvent {
    /// A request was placed at the back of the queue
    Queued { endpoint: String, method: String },

    /// A new admission window opened
    EpochStarted { epoch: u64, quota: u32 },

    /// A request left the queue and is being executed
    Admitted {
        epoch: u64,
        endpoint: String,
        admitted: u32,
    },

    /// The window's quota was used up
    QuotaExhausted { epoch: u64, admitted: u32 },

    /// The window closed before its quota was used up
    EpochElapsed { epoch: u64, admitted: u32 },

    /// An executed request failed; only its caller sees the error
    RequestFailed {
        endpoint: String,
        failure: FailureContext,
    },

    /// Every queue handle was dropped and the drainer stopped
    Closed { epochs: u64 },
}

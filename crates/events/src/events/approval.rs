use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Poll loop and approval decisions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApprovalEvent {
    /// A poll tick finished listing unapproved versions
    PollCompleted { unapproved: usize, dispatched: usize },

    /// Listing unapproved versions failed; the loop keeps going
    PollFailed { failure: FailureContext },

    /// A version was seen for the first time and handed to verification
    VersionDispatched { version_id: String, version: String },

    /// Verification could not complete; the version stays unapproved
    VerificationFailed {
        version_id: String,
        version: String,
        failure: FailureContext,
    },

    /// The version did not scan clean
    ManualReviewRequired { version_id: String, version: String },

    /// Someone else approved the version while it was being verified
    AlreadyApproved { version_id: String, version: String },

    /// The version was approved
    Approved { version_id: String, version: String },

    /// The registry answered the approval with `false`
    ApprovalRejected { version_id: String, version: String },

    /// The approval call itself failed
    ApprovalFailed {
        version_id: String,
        version: String,
        failure: FailureContext,
    },
}

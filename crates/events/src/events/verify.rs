use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Per-version verification events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VerifyEvent {
    /// Verification of a version started
    Started { version_id: String, version: String },

    /// Candidate executables were selected from the archive
    CandidatesFound {
        version_id: String,
        paths: Vec<String>,
    },

    /// A selected entry is absent or unreadable and was not scanned
    EntrySkipped {
        version_id: String,
        path: String,
        reason: String,
    },

    /// One entry finished scanning
    EntryScanned {
        version_id: String,
        path: String,
        clean: bool,
    },

    /// One entry could not be scanned and counts as unsafe
    EntryFailed {
        version_id: String,
        path: String,
        failure: FailureContext,
    },

    /// The version's aggregate decision
    Completed {
        version_id: String,
        version: String,
        safe: bool,
        duration: Duration,
    },
}

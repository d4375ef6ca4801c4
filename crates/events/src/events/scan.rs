use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Progress of a single file through the scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScanEvent {
    /// Bytes were uploaded and an analysis id handed out
    Submitted {
        label: String,
        analysis_id: String,
        size: u64,
    },

    /// The analysis is not finished yet
    Pending {
        label: String,
        analysis_id: String,
        status: String,
    },

    /// The analysis finished
    Completed {
        label: String,
        analysis_id: String,
        suspicious: u64,
        malicious: u64,
        clean: bool,
    },

    /// The raw verdict was written to the results directory
    ResultPersisted { label: String, path: PathBuf },
}

//! Scanner verdict types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque analysis identifier handed out by the scanner after an upload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanHandle(String);

impl ScanHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Progress of a scanner analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisStatus {
    Queued,
    InProgress,
    Completed,
    /// Any status string this client does not know about; never terminal
    #[serde(other)]
    Unknown,
}

impl AnalysisStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Outcome of one analysis poll
#[derive(Debug, Clone, PartialEq)]
pub struct ScanVerdict {
    pub status: AnalysisStatus,
    pub suspicious: u64,
    pub malicious: u64,
    /// Full scanner reply, persisted verbatim once terminal
    pub raw: serde_json::Value,
}

impl ScanVerdict {
    /// A file is clean only when no engine flagged it at all.
    ///
    /// Suspicious and malicious detections gate approval identically.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.suspicious == 0 && self.malicious == 0
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(suspicious: u64, malicious: u64) -> ScanVerdict {
        ScanVerdict {
            status: AnalysisStatus::Completed,
            suspicious,
            malicious,
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_clean_only_when_both_counts_zero() {
        assert!(verdict(0, 0).is_clean());
        assert!(!verdict(1, 0).is_clean());
        assert!(!verdict(0, 1).is_clean());
        assert!(!verdict(3, 7).is_clean());
    }

    #[test]
    fn test_status_parsing() {
        let parse = |s: &str| serde_json::from_value::<AnalysisStatus>(s.into()).unwrap();
        assert_eq!(parse("queued"), AnalysisStatus::Queued);
        assert_eq!(parse("in-progress"), AnalysisStatus::InProgress);
        assert_eq!(parse("completed"), AnalysisStatus::Completed);
        assert_eq!(parse("cancelled"), AnalysisStatus::Unknown);
        assert!(parse("completed").is_terminal());
        assert!(!parse("queued").is_terminal());
        assert!(!parse("cancelled").is_terminal());
    }
}

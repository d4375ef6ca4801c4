//! Result types of ops operations

use smrv_errors::Error;
use smrv_types::PackageVersion;
use std::fmt;
use std::time::Duration;

/// Final state of one version after the approval driver handled it
#[derive(Debug, Clone)]
pub enum VersionOutcome {
    /// Every candidate scanned clean and the registry accepted the approval
    Approved,
    /// Clean, but approved by someone else in the meantime
    AlreadyApproved,
    /// At least one candidate did not scan clean
    NeedsManualReview,
    /// Clean, but the registry answered the approval with `false`
    ApprovalRejected,
    /// Verification or a registry call failed; the version stays unapproved
    Failed(Error),
}

impl VersionOutcome {
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved | Self::AlreadyApproved)
    }
}

impl fmt::Display for VersionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => f.write_str("approved"),
            Self::AlreadyApproved => f.write_str("already approved"),
            Self::NeedsManualReview => f.write_str("needs manual review"),
            Self::ApprovalRejected => f.write_str("approval rejected"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Result of a one-off verification, which never approves anything
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub version: PackageVersion,
    pub result: Result<bool, Error>,
    pub duration: Duration,
}

impl VerificationReport {
    /// `ok` for safe, `bad` for unsafe, `error` when verification failed
    #[must_use]
    pub fn verdict(&self) -> &'static str {
        match self.result {
            Ok(true) => "ok",
            Ok(false) => "bad",
            Err(_) => "error",
        }
    }
}

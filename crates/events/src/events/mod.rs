use serde::{Deserialize, Serialize};

use crate::EventSource;
use smrv_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureContext {
    /// Stable error code, when the error type provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod approval;
pub mod download;
pub mod general;
pub mod queue;
pub mod scan;
pub mod verify;

pub use approval::*;
pub use download::*;
pub use general::*;
pub use queue::*;
pub use scan::*;
pub use verify::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Scanner request queue admission
    Queue(QueueEvent),

    /// Per-file scan progress
    Scan(ScanEvent),

    /// Archive downloads and their retries
    Download(DownloadEvent),

    /// Per-version verification
    Verify(VerifyEvent),

    /// Poll loop and registry approval decisions
    Approval(ApprovalEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Queue(_) => EventSource::QUEUE,
            Self::Scan(_) => EventSource::SCAN,
            Self::Download(_) => EventSource::DOWNLOAD,
            Self::Verify(_) => EventSource::VERIFY,
            Self::Approval(_) => EventSource::APPROVAL,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            // Error-level events
            Self::General(GeneralEvent::Error { .. })
            | Self::Queue(QueueEvent::RequestFailed { .. })
            | Self::Download(DownloadEvent::Failed { .. })
            | Self::Verify(VerifyEvent::EntryFailed { .. })
            | Self::Approval(
                ApprovalEvent::PollFailed { .. }
                | ApprovalEvent::VerificationFailed { .. }
                | ApprovalEvent::ApprovalRejected { .. }
                | ApprovalEvent::ApprovalFailed { .. },
            ) => Level::ERROR,

            // Warning-level events
            Self::General(GeneralEvent::Warning { .. })
            | Self::Download(DownloadEvent::RetryScheduled { .. })
            | Self::Verify(VerifyEvent::EntrySkipped { .. })
            | Self::Approval(ApprovalEvent::ManualReviewRequired { .. }) => Level::WARN,

            // Debug-level events (queue traffic, scan polling, internal state)
            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Queue(_)
            | Self::Scan(_)
            | Self::Download(DownloadEvent::Started { .. })
            | Self::Verify(VerifyEvent::EntryScanned { .. }) => Level::DEBUG,

            // Default to INFO for most events
            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "smrv::events::general",
            Self::Queue(_) => "smrv::events::queue",
            Self::Scan(_) => "smrv::events::scan",
            Self::Download(_) => "smrv::events::download",
            Self::Verify(_) => "smrv::events::verify",
            Self::Approval(_) => "smrv::events::approval",
        }
    }
}

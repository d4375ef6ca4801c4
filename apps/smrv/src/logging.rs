//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields.
//! Library crates never log themselves; everything the service reports goes
//! through here.

use smrv_events::{
    AppEvent, ApprovalEvent, DownloadEvent, EventMessage, GeneralEvent, QueueEvent, ScanEvent,
    VerifyEvent,
};
use tracing::{debug, error, info, trace, warn, Level};

/// Log at a level only known at runtime
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => error!($($arg)+),
            Level::WARN => warn!($($arg)+),
            Level::INFO => info!($($arg)+),
            Level::DEBUG => debug!($($arg)+),
            Level::TRACE => trace!($($arg)+),
        }
    };
}

/// Log an `AppEvent` using the tracing infrastructure with structured fields
#[allow(clippy::too_many_lines)]
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;
    let level = meta.tracing_level();

    match event {
        AppEvent::Approval(approval_event) => match approval_event {
            ApprovalEvent::PollCompleted {
                unapproved,
                dispatched,
            } => {
                log_at!(
                    if *dispatched > 0 { Level::INFO } else { Level::DEBUG },
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    unapproved = unapproved,
                    dispatched = dispatched,
                    "Polled unapproved versions"
                );
            }
            ApprovalEvent::PollFailed { failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    "Error checking for unapproved versions"
                );
            }
            ApprovalEvent::VersionDispatched { version_id, version } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    version_id = %version_id,
                    "Verifying {version}"
                );
            }
            ApprovalEvent::VerificationFailed {
                version_id,
                version,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    version_id = %version_id,
                    code = ?failure.code,
                    hint = ?failure.hint,
                    "Error verifying {version}: {}",
                    failure.message
                );
            }
            ApprovalEvent::ManualReviewRequired { version_id, version } => {
                warn!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    version_id = %version_id,
                    "{version} should be checked manually"
                );
            }
            ApprovalEvent::AlreadyApproved { version_id, version } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    version_id = %version_id,
                    "{version} was already approved in the meantime"
                );
            }
            ApprovalEvent::Approved { version_id, version } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    version_id = %version_id,
                    "Approved {version}"
                );
            }
            ApprovalEvent::ApprovalRejected { version_id, version } => {
                error!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    version_id = %version_id,
                    "Failed to approve {version}: registry refused"
                );
            }
            ApprovalEvent::ApprovalFailed {
                version_id,
                version,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    version_id = %version_id,
                    code = ?failure.code,
                    "Error approving {version}: {}",
                    failure.message
                );
            }
        },

        AppEvent::Verify(verify_event) => match verify_event {
            VerifyEvent::Completed {
                version_id,
                version,
                safe,
                duration,
            } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    version_id = %version_id,
                    safe = safe,
                    duration = ?duration,
                    "Result of verifying {version} is {}",
                    if *safe { "ok" } else { "bad" }
                );
            }
            VerifyEvent::EntryFailed {
                version_id,
                path,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    version_id = %version_id,
                    path = %path,
                    code = ?failure.code,
                    message = %failure.message,
                    "Scanning archive entry failed"
                );
            }
            VerifyEvent::EntrySkipped {
                version_id,
                path,
                reason,
            } => {
                warn!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    version_id = %version_id,
                    path = %path,
                    reason = %reason,
                    "Archive entry skipped"
                );
            }
            other => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    event = ?other,
                    "Verification event"
                );
            }
        },

        AppEvent::Download(download_event) => match download_event {
            DownloadEvent::RetryScheduled {
                url,
                attempt,
                max_attempts,
                delay,
                error,
            } => {
                warn!(
                    source = meta.source.as_str(),
                    url = %url,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_secs = delay.as_secs(),
                    error = %error,
                    "Download failed, retrying"
                );
            }
            DownloadEvent::Failed {
                url,
                attempts,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    url = %url,
                    attempts = attempts,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    "Download failed"
                );
            }
            other => {
                log_at!(level, source = meta.source.as_str(), event = ?other, "Download event");
            }
        },

        AppEvent::Scan(scan_event) => match scan_event {
            ScanEvent::Completed {
                label,
                analysis_id,
                suspicious,
                malicious,
                clean,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    label = %label,
                    analysis_id = %analysis_id,
                    suspicious = suspicious,
                    malicious = malicious,
                    clean = clean,
                    "Analysis completed"
                );
            }
            other => {
                log_at!(level, source = meta.source.as_str(), event = ?other, "Scan event");
            }
        },

        AppEvent::Queue(queue_event) => match queue_event {
            QueueEvent::RequestFailed { endpoint, failure } => {
                debug!(
                    source = meta.source.as_str(),
                    endpoint = %endpoint,
                    code = ?failure.code,
                    message = %failure.message,
                    "Scanner request failed"
                );
            }
            other => {
                log_at!(level, source = meta.source.as_str(), event = ?other, "Queue event");
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Error { message, details } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    details = ?details,
                    "{message}"
                );
            }
            GeneralEvent::Warning { message, context } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    context = ?context,
                    "{message}"
                );
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(
                    source = meta.source.as_str(),
                    context = ?context,
                    "{message}"
                );
            }
            other => {
                log_at!(level, source = meta.source.as_str(), event = ?other, "General event");
            }
        },
    }
}

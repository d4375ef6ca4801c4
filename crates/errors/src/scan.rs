//! Malware scanner error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ScanError {
    #[error("scanner request to {endpoint} failed: {message}")]
    RequestFailed { endpoint: String, message: String },

    #[error("scanner returned HTTP {status} for {endpoint}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("unexpected scanner response from {endpoint}: {message}")]
    UnexpectedResponse { endpoint: String, message: String },

    #[error("request queue is closed")]
    QueueClosed,

    #[error("failed to persist scan result to {path}: {message}")]
    PersistFailed { path: String, message: String },
}

impl UserFacingError for ScanError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::HttpStatus { status: 401 | 403, .. } => Some("Check scanner.api_key."),
            Self::HttpStatus { status: 429, .. } => {
                Some("The scanner quota was exceeded; lower scanner.rate_limit.")
            }
            Self::QueueClosed => Some("The request queue stopped; restart the service."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed { .. } | Self::HttpStatus { status: 429 | 500..=599, .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::RequestFailed { .. } => "scan.request_failed",
            Self::HttpStatus { .. } => "scan.http_status",
            Self::UnexpectedResponse { .. } => "scan.unexpected_response",
            Self::QueueClosed => "scan.queue_closed",
            Self::PersistFailed { .. } => "scan.persist_failed",
        })
    }
}

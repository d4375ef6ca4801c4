//! Mod registry error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("registry request failed: {message}")]
    RequestFailed { message: String },

    #[error("registry returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("registry query failed: {message}")]
    Query { message: String },

    #[error("unexpected registry response: {message}")]
    UnexpectedResponse { message: String },

    #[error("version not found: {id}")]
    VersionNotFound { id: String },
}

impl UserFacingError for RegistryError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::HttpStatus { status: 401 | 403, .. } => Some("Check registry.token."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed { .. } | Self::HttpStatus { status: 500..=599, .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::RequestFailed { .. } => "registry.request_failed",
            Self::HttpStatus { .. } => "registry.http_status",
            Self::Query { .. } => "registry.query",
            Self::UnexpectedResponse { .. } => "registry.unexpected_response",
            Self::VersionNotFound { .. } => "registry.version_not_found",
        })
    }
}

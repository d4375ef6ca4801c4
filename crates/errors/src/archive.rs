//! Package archive error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ArchiveError {
    #[error("not a readable zip archive: {message}")]
    InvalidArchive { message: String },

    #[error("invalid manifest {path}: {message}")]
    InvalidManifest { path: String, message: String },

    #[error("archive has no manifest {path}")]
    ManifestMissing { path: String },

    #[error("archive entry escapes the package root: {path}")]
    UnsafePath { path: String },
}

impl UserFacingError for ArchiveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("The uploaded package is malformed and needs manual review.")
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InvalidArchive { .. } => "archive.invalid",
            Self::InvalidManifest { .. } => "archive.invalid_manifest",
            Self::ManifestMissing { .. } => "archive.manifest_missing",
            Self::UnsafePath { .. } => "archive.unsafe_path",
        })
    }
}

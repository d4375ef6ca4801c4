#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Version verification for smrv
//!
//! A version is safe when every candidate executable in its archive scans
//! clean. An archive without candidates is trivially safe.

mod candidates;
mod workflow;

pub use candidates::{extract_candidates, Extraction, SkippedEntry, MANIFEST_PATH};
pub use workflow::{VerifySettings, VersionVerifier};

use async_trait::async_trait;
use smrv_errors::Error;
use smrv_types::PackageVersion;

/// Decides whether a version may be approved automatically
#[async_trait]
pub trait VersionCheck: Send + Sync {
    /// `Ok(true)` when every candidate scanned clean
    async fn verify(&self, version: &PackageVersion) -> Result<bool, Error>;
}

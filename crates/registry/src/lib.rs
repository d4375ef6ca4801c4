#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Mod registry access for smrv
//!
//! The approval driver only ever sees the [`Registry`] trait. The production
//! implementation talks GraphQL to the registry API.

mod graphql;
mod queries;

pub use graphql::GraphqlRegistry;

use async_trait::async_trait;
use smrv_errors::Error;
use smrv_types::PackageVersion;

/// Operations the verifier needs from the mod registry
#[async_trait]
pub trait Registry: Send + Sync {
    /// Every version currently waiting for approval
    async fn list_unapproved_versions(&self) -> Result<Vec<PackageVersion>, Error>;

    /// Current approval state of one version
    async fn is_version_approved(&self, version_id: &str) -> Result<bool, Error>;

    /// Approve a version; `false` means the registry refused
    async fn approve_version(&self, version_id: &str) -> Result<bool, Error>;

    /// Look up a single version by id
    async fn get_version(&self, version_id: &str) -> Result<PackageVersion, Error>;

    /// Recent versions of a page of mods, for smoke testing
    async fn sample_versions(
        &self,
        limit: u32,
        offset: u32,
        versions_per_mod: u32,
    ) -> Result<Vec<PackageVersion>, Error>;
}

//! GraphQL documents and the shapes of their `data`

use serde::Deserialize;
use smrv_types::PackageVersion;

pub(crate) const UNAPPROVED_VERSIONS: &str = r"
query {
  getUnapprovedVersions {
    versions {
      id
      mod_id
      version
      link
    }
  }
}";

pub(crate) const VERSION_APPROVED: &str = r"
query($versionId: VersionID!) {
  getVersion(versionId: $versionId) {
    approved
  }
}";

pub(crate) const APPROVE_VERSION: &str = r"
mutation($versionId: VersionID!) {
  approveVersion(versionId: $versionId)
}";

pub(crate) const GET_VERSION: &str = r"
query($versionId: VersionID!) {
  getVersion(versionId: $versionId) {
    id
    mod_id
    version
    link
  }
}";

pub(crate) const SAMPLE_VERSIONS: &str = r"
query($limit: Int!, $offset: Int!, $versions: Int!) {
  getMods(filter: { limit: $limit, offset: $offset }) {
    mods {
      versions(filter: { limit: $versions }) {
        id
        mod_id
        version
        link
      }
    }
  }
}";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnapprovedVersionsData {
    pub get_unapproved_versions: VersionList,
}

#[derive(Deserialize)]
pub(crate) struct VersionList {
    pub versions: Vec<PackageVersion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VersionApprovedData {
    pub get_version: Option<ApprovedFlag>,
}

#[derive(Deserialize)]
pub(crate) struct ApprovedFlag {
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApproveVersionData {
    pub approve_version: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GetVersionData {
    pub get_version: Option<PackageVersion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SampleVersionsData {
    pub get_mods: ModList,
}

#[derive(Deserialize)]
pub(crate) struct ModList {
    pub mods: Vec<VersionList>,
}

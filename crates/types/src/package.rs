//! Package-related type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A submitted version of a mod, as reported by the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageVersion {
    /// Registry identity of this version
    pub id: String,
    /// Identity of the owning mod
    pub mod_id: String,
    /// Version string as uploaded
    pub version: String,
    /// Download link, relative to the registry API root
    pub link: String,
}

impl PackageVersion {
    /// Label submitted to the scanner for one archive entry
    #[must_use]
    pub fn scan_label(&self, entry_path: &str) -> String {
        format!("{}_{entry_path}", self.id)
    }

    /// Key under which the verdict for one archive entry is persisted
    #[must_use]
    pub fn output_key(&self, entry_path: &str) -> String {
        format!("{}/{}/{}/{entry_path}", self.mod_id, self.version, self.id)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.mod_id, self.version, self.id)
    }
}

/// A file pulled out of a package archive for scanning
#[derive(Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path of the entry inside the archive
    pub path: String,
    pub content: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(path: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }
}

impl fmt::Debug for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("path", &self.path)
            .field("size", &self.content.len())
            .finish()
    }
}

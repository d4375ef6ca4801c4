//! Selection of archive entries that must be scanned before approval

use std::path::Path;

/// Object types in a package manifest that carry executable code
pub const DEFAULT_MANIFEST_TYPES: &[&str] = &["sml_mod", "core_mod"];

/// File extensions treated as executable payloads
pub const DEFAULT_CANDIDATE_EXTENSIONS: &[&str] = &["dll", "so", "exe"];

/// How candidate executable entries are picked out of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidatePolicy {
    /// Read the `data.json` manifest and take every object whose `type` is listed
    Manifest { types: Vec<String> },
    /// Take every file whose extension is listed (case-insensitive)
    Extension { extensions: Vec<String> },
}

impl CandidatePolicy {
    /// Whether a manifest object of this type should be scanned
    #[must_use]
    pub fn accepts_type(&self, object_type: &str) -> bool {
        match self {
            Self::Manifest { types } => types.iter().any(|t| t == object_type),
            Self::Extension { .. } => false,
        }
    }

    /// Whether a file at this path should be scanned
    #[must_use]
    pub fn accepts_path(&self, path: &str) -> bool {
        match self {
            Self::Manifest { .. } => false,
            Self::Extension { extensions } => Path::new(path)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))),
        }
    }
}

impl Default for CandidatePolicy {
    fn default() -> Self {
        Self::Manifest {
            types: DEFAULT_MANIFEST_TYPES.iter().map(ToString::to_string).collect(),
        }
    }
}

//! Versions already handed to verification

use std::collections::HashSet;

/// Append-only set of version ids the driver has dispatched
///
/// A version is marked the moment it is first seen, before any of its work
/// starts, so a later poll listing it again does not start it twice.
#[derive(Debug, Default)]
pub struct DispatchedVersions {
    ids: HashSet<String>,
}

impl DispatchedVersions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`; returns `true` if it had not been seen before
    pub fn mark(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

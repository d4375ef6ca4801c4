//! Configuration structures for archive downloads

use std::time::Duration;

/// Retry configuration for downloads
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(10),
        }
    }
}

/// Result of a download operation
#[derive(Debug)]
pub struct Downloaded {
    pub bytes: Vec<u8>,
    /// Attempts used, including the successful one
    pub attempts: u32,
}

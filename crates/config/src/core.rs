//! Configuration sections and their defaults

use crate::constants;
use serde::{Deserialize, Serialize};
use smrv_types::{CandidatePolicy, DEFAULT_CANDIDATE_EXTENSIONS, DEFAULT_MANIFEST_TYPES};
use std::path::PathBuf;
use std::time::Duration;

/// General service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64, // seconds
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            debug: false,
            results_dir: default_results_dir(),
            log_file: default_log_file(),
        }
    }
}

impl GeneralConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}

/// Mod registry connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_api_url")]
    pub api_url: String,
    #[serde(default = "default_graphql_path")]
    pub graphql_path: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            api_url: default_registry_api_url(),
            graphql_path: default_graphql_path(),
            token: None,
        }
    }
}

impl RegistryConfig {
    /// Full URL of the GraphQL endpoint
    #[must_use]
    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), self.graphql_path)
    }
}

/// Malware scanner connection and quota
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_scanner_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_rate_window")]
    pub rate_window: u64, // seconds
    #[serde(default = "default_first_poll_delay")]
    pub first_poll_delay: u64, // seconds
    #[serde(default = "default_poll_delay")]
    pub poll_delay: u64, // seconds
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            api_url: default_scanner_api_url(),
            api_key: None,
            rate_limit: default_rate_limit(),
            rate_window: default_rate_window(),
            first_poll_delay: default_first_poll_delay(),
            poll_delay: default_poll_delay(),
        }
    }
}

impl ScannerConfig {
    #[must_use]
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    #[must_use]
    pub fn first_poll_delay(&self) -> Duration {
        Duration::from_secs(self.first_poll_delay)
    }

    #[must_use]
    pub fn poll_delay(&self) -> Duration {
        Duration::from_secs(self.poll_delay)
    }
}

/// Archive download behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
            timeout: default_timeout(),
        }
    }
}

impl DownloadConfig {
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Which selection rule decides the candidate executables of an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePolicyKind {
    #[default]
    Manifest,
    Extension,
}

/// Candidate executable selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateConfig {
    #[serde(default)]
    pub policy: CandidatePolicyKind,
    #[serde(default = "default_manifest_types")]
    pub manifest_types: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            policy: CandidatePolicyKind::default(),
            manifest_types: default_manifest_types(),
            extensions: default_extensions(),
        }
    }
}

impl CandidateConfig {
    /// Build the selection policy used by the verifier
    #[must_use]
    pub fn policy(&self) -> CandidatePolicy {
        match self.policy {
            CandidatePolicyKind::Manifest => CandidatePolicy::Manifest {
                types: self.manifest_types.clone(),
            },
            CandidatePolicyKind::Extension => CandidatePolicy::Extension {
                extensions: self.extensions.clone(),
            },
        }
    }
}

// Default value functions for serde
fn default_poll_interval() -> u64 {
    5
}

fn default_results_dir() -> PathBuf {
    PathBuf::from(constants::RESULTS_DIR)
}

fn default_log_file() -> PathBuf {
    PathBuf::from(constants::LOG_FILE)
}

fn default_registry_api_url() -> String {
    constants::REGISTRY_API_URL.to_string()
}

fn default_graphql_path() -> String {
    constants::REGISTRY_GRAPHQL_PATH.to_string()
}

fn default_scanner_api_url() -> String {
    constants::SCANNER_API_URL.to_string()
}

fn default_rate_limit() -> u32 {
    constants::SCANNER_RATE_LIMIT
}

fn default_rate_window() -> u64 {
    constants::SCANNER_RATE_WINDOW_SECS
}

fn default_first_poll_delay() -> u64 {
    30 // first-seen files take a while to be analysed
}

fn default_poll_delay() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    10
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_manifest_types() -> Vec<String> {
    DEFAULT_MANIFEST_TYPES.iter().map(ToString::to_string).collect()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_CANDIDATE_EXTENSIONS
        .iter()
        .map(ToString::to_string)
        .collect()
}

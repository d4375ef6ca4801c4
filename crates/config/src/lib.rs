#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for smrv
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/smrv/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;
pub mod core;

pub use core::{
    CandidateConfig, CandidatePolicyKind, DownloadConfig, GeneralConfig, RegistryConfig,
    ScannerConfig,
};

use serde::{Deserialize, Serialize};
use smrv_errors::{ConfigError, Error};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub candidates: CandidateConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("smrv").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(token) = std::env::var(constants::ENV_REGISTRY_TOKEN) {
            self.registry.token = Some(token);
        }

        if let Ok(key) = std::env::var(constants::ENV_SCANNER_API_KEY) {
            self.scanner.api_key = Some(key);
        }

        if let Ok(interval) = std::env::var(constants::ENV_POLL_INTERVAL) {
            self.general.poll_interval =
                interval.parse().map_err(|_| ConfigError::InvalidValue {
                    field: constants::ENV_POLL_INTERVAL.to_string(),
                    value: interval,
                })?;
        }

        if let Ok(debug) = std::env::var(constants::ENV_DEBUG) {
            self.general.debug = match debug.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: constants::ENV_DEBUG.to_string(),
                        value: debug,
                    }
                    .into())
                }
            };
        }

        if let Ok(dir) = std::env::var(constants::ENV_RESULTS_DIR) {
            self.general.results_dir = PathBuf::from(dir);
        }

        Ok(())
    }

    /// Check that the configuration can drive the service
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is missing or a limit is zero.
    pub fn validate(&self) -> Result<(), Error> {
        if self.registry.token.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingField {
                field: "registry.token".to_string(),
            }
            .into());
        }

        if self.scanner.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingField {
                field: "scanner.api_key".to_string(),
            }
            .into());
        }

        let positive = [
            ("scanner.rate_limit", u64::from(self.scanner.rate_limit)),
            ("scanner.rate_window", self.scanner.rate_window),
            ("general.poll_interval", self.general.poll_interval),
            ("download.max_attempts", u64::from(self.download.max_attempts)),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                }
                .into());
            }
        }

        match self.candidates.policy {
            CandidatePolicyKind::Manifest if self.candidates.manifest_types.is_empty() => {
                Err(ConfigError::Invalid {
                    message: "candidates.manifest_types is empty".to_string(),
                }
                .into())
            }
            CandidatePolicyKind::Extension if self.candidates.extensions.is_empty() => {
                Err(ConfigError::Invalid {
                    message: "candidates.extensions is empty".to_string(),
                }
                .into())
            }
            _ => Ok(()),
        }
    }
}

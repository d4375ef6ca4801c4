//! Well-known endpoints, environment variables and defaults for smrv

pub const REGISTRY_API_URL: &str = "https://api.ficsit.app";
pub const REGISTRY_GRAPHQL_PATH: &str = "/v2/query";
pub const SCANNER_API_URL: &str = "https://www.virustotal.com/api/v3";

/// Published public-API quota of the scanner: 240 calls per hour
pub const SCANNER_RATE_LIMIT: u32 = 240;
pub const SCANNER_RATE_WINDOW_SECS: u64 = 60 * 60;

pub const RESULTS_DIR: &str = "scanResults";
pub const LOG_FILE: &str = "smrv.log";

pub const ENV_REGISTRY_TOKEN: &str = "SMRV_REGISTRY_TOKEN";
pub const ENV_SCANNER_API_KEY: &str = "SMRV_SCANNER_API_KEY";
pub const ENV_POLL_INTERVAL: &str = "SMRV_POLL_INTERVAL";
pub const ENV_DEBUG: &str = "SMRV_DEBUG";
pub const ENV_RESULTS_DIR: &str = "SMRV_RESULTS_DIR";

#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for smrv
//!
//! This crate handles plain HTTP fetches against the mod registry, most
//! importantly archive downloads with bounded retry on bad-request responses.

mod client;
mod download;

pub use client::{NetClient, NetConfig};
pub use download::{download_with_retry, retry_bad_request, Downloaded, RetryPolicy};

use smrv_errors::{Error, NetworkError};
use smrv_events::{EventEmitter, EventSender};
use url::Url;

/// Fetch binary content from a URL in a single attempt
///
/// # Errors
///
/// Returns an error if the HTTP request fails, the server returns an error status,
/// or the response body cannot be read as bytes.
pub async fn fetch_bytes(
    client: &NetClient,
    url: &str,
    tx: &EventSender,
) -> Result<Vec<u8>, Error> {
    tx.emit_debug(format!("Fetching bytes from {url}"));

    let response = client.get(url).await?;
    download::validate_response(&response)?;

    response
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| NetworkError::DownloadFailed(e.to_string()).into())
}

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}

/// Resolve a registry link against the registry API root
///
/// Absolute links are returned unchanged; relative links are appended to
/// `base` with exactly one separating slash.
///
/// # Errors
///
/// Returns an error if the resulting URL is malformed.
pub fn resolve_link(base: &str, link: &str) -> Result<String, Error> {
    if let Ok(absolute) = Url::parse(link) {
        return Ok(absolute.to_string());
    }

    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        link.trim_start_matches('/')
    );
    parse_url(&joined)?;
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://example.com").is_ok());
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("https://api.ficsit.app", "/v1/version/abc/download").unwrap(),
            "https://api.ficsit.app/v1/version/abc/download"
        );
        assert_eq!(
            resolve_link("https://api.ficsit.app/", "v1/version/abc/download").unwrap(),
            "https://api.ficsit.app/v1/version/abc/download"
        );
        assert_eq!(
            resolve_link("https://api.ficsit.app", "https://cdn.example/abc.zip").unwrap(),
            "https://cdn.example/abc.zip"
        );
        assert!(resolve_link("not a base", "/abc").is_err());
    }
}

//! HTTP response validation for downloads

use smrv_errors::{Error, NetworkError};

/// Validate HTTP response for download
pub(crate) fn validate_response(response: &reqwest::Response) -> Result<(), Error> {
    let status = response.status();

    if !status.is_success() {
        return Err(NetworkError::HttpError {
            status: status.as_u16(),
            message: status.to_string(),
        }
        .into());
    }

    Ok(())
}

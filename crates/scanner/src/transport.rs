//! Scanner HTTP transport

use crate::queue::{Method, RequestBody, ScanRequest};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use smrv_errors::{Error, ScanError};
use std::time::Duration;

/// Executes one scanner request
///
/// The queue owns the only instance; nothing else talks to the scanner.
#[async_trait]
pub trait ScanTransport: Send + Sync {
    /// Perform the request and return the decoded JSON reply
    async fn execute(&self, request: ScanRequest) -> Result<Value, Error>;
}

/// VirusTotal v3 API transport
pub struct VirusTotalTransport {
    client: Client,
    api_url: String,
    api_key: String,
}

impl VirusTotalTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("smrv/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScanError::RequestFailed {
                endpoint: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Upload URLs handed out by the API are absolute and used verbatim
    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!(
                "{}/{}",
                self.api_url.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            )
        }
    }
}

#[async_trait]
impl ScanTransport for VirusTotalTransport {
    async fn execute(&self, request: ScanRequest) -> Result<Value, Error> {
        let ScanRequest {
            endpoint,
            method,
            body,
        } = request;
        let url = self.url_for(&endpoint);

        let builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Multipart { file_name, bytes } => {
                builder.multipart(Form::new().part("file", Part::bytes(bytes).file_name(file_name)))
            }
        };

        let response = builder
            .header("x-apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| ScanError::RequestFailed {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScanError::HttpStatus {
                endpoint,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| {
                ScanError::UnexpectedResponse {
                    endpoint,
                    message: e.to_string(),
                }
                .into()
            })
    }
}

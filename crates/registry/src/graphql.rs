//! GraphQL client for the mod registry

use crate::queries::{
    ApproveVersionData, GetVersionData, SampleVersionsData, UnapprovedVersionsData,
    VersionApprovedData, APPROVE_VERSION, GET_VERSION, SAMPLE_VERSIONS, UNAPPROVED_VERSIONS,
    VERSION_APPROVED,
};
use crate::Registry;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use smrv_errors::{Error, RegistryError};
use smrv_types::PackageVersion;
use std::time::Duration;

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
}

/// Registry client speaking GraphQL over HTTP POST
pub struct GraphqlRegistry {
    client: Client,
    endpoint: String,
    token: String,
}

impl GraphqlRegistry {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("smrv/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::RequestFailed {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one GraphQL document and decode its `data`
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success statuses, replies that carry
    /// `error`/`errors`, and `data` that does not match `T`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<T, Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", &self.token)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| RegistryError::RequestFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RegistryError::HttpStatus {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| unexpected(e.to_string()))?;
        decode_response(body)
    }
}

/// Split a GraphQL reply into its `data` or its reported error
fn decode_response<T: DeserializeOwned>(mut body: Value) -> Result<T, Error> {
    for key in ["error", "errors"] {
        match body.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::Array(errors)) if errors.is_empty() => {}
            Some(error) => {
                return Err(RegistryError::Query {
                    message: describe_error(error),
                }
                .into())
            }
        }
    }

    let data = body
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| unexpected("missing `data`".to_string()))?;
    serde_json::from_value(data).map_err(|e| unexpected(e.to_string()))
}

fn describe_error(error: &Value) -> String {
    let message_of = |e: &Value| {
        e.get("message")
            .and_then(Value::as_str)
            .map_or_else(|| e.to_string(), ToString::to_string)
    };

    match error {
        Value::Array(errors) => errors.iter().map(message_of).collect::<Vec<_>>().join("; "),
        Value::String(s) => s.clone(),
        other => message_of(other),
    }
}

fn unexpected(message: String) -> Error {
    RegistryError::UnexpectedResponse { message }.into()
}

#[async_trait]
impl Registry for GraphqlRegistry {
    async fn list_unapproved_versions(&self) -> Result<Vec<PackageVersion>, Error> {
        let data: UnapprovedVersionsData = self.query(UNAPPROVED_VERSIONS, None).await?;
        Ok(data.get_unapproved_versions.versions)
    }

    async fn is_version_approved(&self, version_id: &str) -> Result<bool, Error> {
        let data: VersionApprovedData = self
            .query(VERSION_APPROVED, Some(json!({ "versionId": version_id })))
            .await?;
        data.get_version
            .map(|v| v.approved)
            .ok_or_else(|| {
                RegistryError::VersionNotFound {
                    id: version_id.to_string(),
                }
                .into()
            })
    }

    async fn approve_version(&self, version_id: &str) -> Result<bool, Error> {
        let data: ApproveVersionData = self
            .query(APPROVE_VERSION, Some(json!({ "versionId": version_id })))
            .await?;
        Ok(data.approve_version)
    }

    async fn get_version(&self, version_id: &str) -> Result<PackageVersion, Error> {
        let data: GetVersionData = self
            .query(GET_VERSION, Some(json!({ "versionId": version_id })))
            .await?;
        data.get_version.ok_or_else(|| {
            RegistryError::VersionNotFound {
                id: version_id.to_string(),
            }
            .into()
        })
    }

    async fn sample_versions(
        &self,
        limit: u32,
        offset: u32,
        versions_per_mod: u32,
    ) -> Result<Vec<PackageVersion>, Error> {
        let data: SampleVersionsData = self
            .query(
                SAMPLE_VERSIONS,
                Some(json!({ "limit": limit, "offset": offset, "versions": versions_per_mod })),
            )
            .await?;
        Ok(data
            .get_mods
            .mods
            .into_iter()
            .flat_map(|m| m.versions)
            .collect())
    }
}

//! Integration tests for registry crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;
    use smrv_errors::{Error, RegistryError};
    use smrv_registry::{GraphqlRegistry, Registry};
    use std::time::Duration;

    fn registry(server: &MockServer) -> GraphqlRegistry {
        GraphqlRegistry::new(server.url("/v2/query"), "secret-token", Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_unapproved_versions() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/query")
                    .header("Authorization", "secret-token")
                    .body_contains("getUnapprovedVersions");
                then.status(200).json_body(json!({
                    "data": {
                        "getUnapprovedVersions": {
                            "versions": [
                                { "id": "v1", "mod_id": "ModA", "version": "1.0.0", "link": "/v1/version/v1/download" },
                                { "id": "v2", "mod_id": "ModB", "version": "0.3.1", "link": "/v1/version/v2/download" }
                            ]
                        }
                    }
                }));
            })
            .await;

        let versions = registry(&server).list_unapproved_versions().await.unwrap();

        mock.assert_async().await;
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].id, "v1");
        assert_eq!(versions[1].mod_id, "ModB");
        assert_eq!(versions[1].link, "/v1/version/v2/download");
    }

    #[tokio::test]
    async fn test_approval_round_trip() {
        let server = MockServer::start_async().await;
        let status = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/query")
                    .body_contains("approved")
                    .json_body_partial(r#"{ "variables": { "versionId": "v7" } }"#);
                then.status(200)
                    .json_body(json!({ "data": { "getVersion": { "approved": false } } }));
            })
            .await;
        let approve = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/query")
                    .body_contains("approveVersion")
                    .json_body_partial(r#"{ "variables": { "versionId": "v7" } }"#);
                then.status(200)
                    .json_body(json!({ "data": { "approveVersion": true } }));
            })
            .await;

        let registry = registry(&server);
        assert!(!registry.is_version_approved("v7").await.unwrap());
        assert!(registry.approve_version("v7").await.unwrap());

        status.assert_async().await;
        approve.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_error_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/query");
                then.status(200).json_body(json!({
                    "errors": [{ "message": "user not authorized to perform this action" }],
                    "data": null
                }));
            })
            .await;

        let error = registry(&server).approve_version("v1").await.unwrap_err();
        assert!(matches!(error, Error::Registry(RegistryError::Query { .. })));
    }

    #[tokio::test]
    async fn test_http_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/query");
                then.status(502).body("bad gateway");
            })
            .await;

        let error = registry(&server)
            .list_unapproved_versions()
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            Error::Registry(RegistryError::HttpStatus { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_version_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/query");
                then.status(200).json_body(json!({ "data": { "getVersion": null } }));
            })
            .await;

        let error = registry(&server).get_version("missing").await.unwrap_err();
        assert!(matches!(
            error,
            Error::Registry(RegistryError::VersionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_sample_versions_flattens_mods() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/query")
                    .body_contains("getMods")
                    .json_body_partial(r#"{ "variables": { "limit": 2, "offset": 5, "versions": 3 } }"#);
                then.status(200).json_body(json!({
                    "data": {
                        "getMods": {
                            "mods": [
                                { "versions": [
                                    { "id": "a1", "mod_id": "A", "version": "1.0.0", "link": "/a1" },
                                    { "id": "a2", "mod_id": "A", "version": "0.9.0", "link": "/a2" }
                                ] },
                                { "versions": [
                                    { "id": "b1", "mod_id": "B", "version": "2.0.0", "link": "/b1" }
                                ] }
                            ]
                        }
                    }
                }));
            })
            .await;

        let versions = registry(&server).sample_versions(2, 5, 3).await.unwrap();

        mock.assert_async().await;
        let ids: Vec<_> = versions.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2", "b1"]);
    }
}

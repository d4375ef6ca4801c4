//! Integration tests for types

#[cfg(test)]
mod tests {
    use serde_json::json;
    use smrv_types::*;

    #[test]
    fn test_package_version_from_registry_json() {
        let version: PackageVersion = serde_json::from_value(json!({
            "id": "9xQ2mPz",
            "mod_id": "SmartFoundations",
            "version": "3.1.0",
            "link": "/v1/version/9xQ2mPz/download",
            "approved": false
        }))
        .unwrap();

        assert_eq!(version.scan_label("Win64/Smart.dll"), "9xQ2mPz_Win64/Smart.dll");
        assert_eq!(
            version.output_key("Win64/Smart.dll"),
            "SmartFoundations/3.1.0/9xQ2mPz/Win64/Smart.dll"
        );
    }

    #[test]
    fn test_unknown_status_is_never_terminal() {
        let status: AnalysisStatus = serde_json::from_value(json!("timed-out")).unwrap();
        let verdict = ScanVerdict {
            status,
            suspicious: 0,
            malicious: 0,
            raw: json!({}),
        };

        assert!(verdict.is_clean());
        assert!(!verdict.is_complete());
    }

    #[test]
    fn test_default_policy_uses_manifest_types() {
        let policy = CandidatePolicy::default();
        for object_type in DEFAULT_MANIFEST_TYPES {
            assert!(policy.accepts_type(object_type));
        }
        assert!(!policy.accepts_type("pak"));
    }

    #[test]
    fn test_scan_handle_is_transparent() {
        let handle: ScanHandle = serde_json::from_value(json!("NjY0MjRlOTVjN2Q0")).unwrap();
        assert_eq!(handle.as_str(), "NjY0MjRlOTVjN2Q0");
        assert_eq!(serde_json::to_value(&handle).unwrap(), json!("NjY0MjRlOTVjN2Q0"));
    }
}

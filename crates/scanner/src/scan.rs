//! File scan workflow
//!
//! upload URL -> upload -> poll analysis until completed -> persist -> verdict

use crate::queue::{RequestQueue, ScanRequest};
use async_trait::async_trait;
use serde_json::Value;
use smrv_errors::{Error, ScanError};
use smrv_events::{AppEvent, EventEmitter, EventSender, ScanEvent};
use smrv_types::{AnalysisStatus, ScanHandle, ScanVerdict};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

const UPLOAD_URL_ENDPOINT: &str = "/files/upload_url";

/// Scans one file and reports whether it is clean
#[async_trait]
pub trait FileScan: Send + Sync {
    /// `label` names the upload; `output_key` decides where the raw verdict
    /// is persisted.
    async fn scan(&self, bytes: Vec<u8>, label: &str, output_key: &str) -> Result<bool, Error>;
}

/// Timing and persistence settings of the scan workflow
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub results_dir: PathBuf,
    /// Pause after the first unfinished poll
    pub first_poll_delay: Duration,
    /// Pause after every later unfinished poll
    pub poll_delay: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("scanResults"),
            first_poll_delay: Duration::from_secs(30),
            poll_delay: Duration::from_secs(5),
        }
    }
}

/// Scanner workflow for single files, backed by the request queue
#[derive(Clone)]
pub struct FileScanner {
    queue: RequestQueue,
    settings: ScanSettings,
    tx: EventSender,
}

impl FileScanner {
    #[must_use]
    pub fn new(queue: RequestQueue, settings: ScanSettings, tx: EventSender) -> Self {
        Self {
            queue,
            settings,
            tx,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Upload a file and return the handle of its analysis
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails or a reply lacks the
    /// expected fields.
    pub async fn upload(&self, bytes: Vec<u8>, label: &str) -> Result<ScanHandle, Error> {
        let reply = self
            .queue
            .submit(ScanRequest::get(UPLOAD_URL_ENDPOINT))
            .await?;
        let upload_url = reply
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| unexpected(UPLOAD_URL_ENDPOINT, "missing upload URL in `data`"))?
            .to_string();

        let size = bytes.len() as u64;
        let reply = self
            .queue
            .submit(ScanRequest::upload(&upload_url, label, bytes))
            .await?;
        let id = reply
            .pointer("/data/id")
            .and_then(Value::as_str)
            .ok_or_else(|| unexpected(&upload_url, "missing analysis id in `data.id`"))?;

        let handle = ScanHandle::new(id);
        self.tx.emit(AppEvent::Scan(ScanEvent::Submitted {
            label: label.to_string(),
            analysis_id: handle.to_string(),
            size,
        }));
        Ok(handle)
    }

    /// Fetch the current state of an analysis once
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is malformed.
    pub async fn poll(&self, handle: &ScanHandle) -> Result<ScanVerdict, Error> {
        let endpoint = format!("/analyses/{handle}");
        let reply = self.queue.submit(ScanRequest::get(&endpoint)).await?;
        parse_verdict(&endpoint, reply)
    }

    /// Poll until the analysis completes
    ///
    /// # Errors
    ///
    /// Returns the first polling error; there is no retry.
    pub async fn wait_for_verdict(
        &self,
        handle: &ScanHandle,
        label: &str,
    ) -> Result<ScanVerdict, Error> {
        let mut delay = self.settings.first_poll_delay;

        loop {
            let verdict = self.poll(handle).await?;
            if verdict.is_complete() {
                self.tx.emit(AppEvent::Scan(ScanEvent::Completed {
                    label: label.to_string(),
                    analysis_id: handle.to_string(),
                    suspicious: verdict.suspicious,
                    malicious: verdict.malicious,
                    clean: verdict.is_clean(),
                }));
                return Ok(verdict);
            }

            self.tx.emit(AppEvent::Scan(ScanEvent::Pending {
                label: label.to_string(),
                analysis_id: handle.to_string(),
                status: format!("{:?}", verdict.status),
            }));
            tokio::time::sleep(delay).await;
            delay = self.settings.poll_delay;
        }
    }

    /// Write the raw verdict to `<results_dir>/<output_key>.json`
    ///
    /// # Errors
    ///
    /// Returns `ScanError::PersistFailed` if `output_key` would leave the
    /// results directory or the directory or file cannot be written.
    pub async fn persist(&self, verdict: &ScanVerdict, output_key: &str) -> Result<PathBuf, Error> {
        let path = self.settings.results_dir.join(format!("{output_key}.json"));
        let persist_failed = |message: String| ScanError::PersistFailed {
            path: path.display().to_string(),
            message,
        };

        if !is_relative_key(output_key) {
            return Err(persist_failed("key escapes the results directory".to_string()).into());
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| persist_failed(e.to_string()))?;
        }

        let content =
            serde_json::to_vec_pretty(&verdict.raw).map_err(|e| persist_failed(e.to_string()))?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| persist_failed(e.to_string()))?;

        Ok(path)
    }
}

#[async_trait]
impl FileScan for FileScanner {
    async fn scan(&self, bytes: Vec<u8>, label: &str, output_key: &str) -> Result<bool, Error> {
        let handle = self.upload(bytes, label).await?;
        let verdict = self.wait_for_verdict(&handle, label).await?;

        let path = self.persist(&verdict, output_key).await?;
        self.tx.emit(AppEvent::Scan(ScanEvent::ResultPersisted {
            label: label.to_string(),
            path,
        }));

        Ok(verdict.is_clean())
    }
}

/// A key made only of plain path segments stays under the directory it is joined to
fn is_relative_key(key: &str) -> bool {
    !key.is_empty()
        && Path::new(key)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Decode an analysis reply
///
/// Detection counts are only required once the analysis has completed.
///
/// # Errors
///
/// Returns `ScanError::UnexpectedResponse` when the status, or the stats of a
/// completed analysis, are missing.
pub fn parse_verdict(endpoint: &str, reply: Value) -> Result<ScanVerdict, Error> {
    let attributes = reply
        .pointer("/data/attributes")
        .ok_or_else(|| unexpected(endpoint, "missing `data.attributes`"))?;

    let status = attributes
        .get("status")
        .cloned()
        .ok_or_else(|| unexpected(endpoint, "missing analysis status"))
        .and_then(|s| {
            serde_json::from_value::<AnalysisStatus>(s)
                .map_err(|e| unexpected(endpoint, &e.to_string()))
        })?;

    let count = |field: &str| -> Result<u64, Error> {
        match attributes.get("stats").and_then(|stats| stats.get(field)) {
            Some(value) => value
                .as_u64()
                .ok_or_else(|| unexpected(endpoint, &format!("`stats.{field}` is not a count"))),
            None if status.is_terminal() => {
                Err(unexpected(endpoint, &format!("missing `stats.{field}`")))
            }
            None => Ok(0),
        }
    };
    let suspicious = count("suspicious")?;
    let malicious = count("malicious")?;

    Ok(ScanVerdict {
        status,
        suspicious,
        malicious,
        raw: reply,
    })
}

fn unexpected(endpoint: &str, message: &str) -> Error {
    ScanError::UnexpectedResponse {
        endpoint: endpoint.to_string(),
        message: message.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::RateLimit;
    use crate::transport::ScanTransport;
    use serde_json::json;
    use smrv_events::channel;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Answers analysis polls from a script, in order
    struct ScriptedScanner {
        polls: Mutex<VecDeque<Value>>,
        requests: Mutex<Vec<ScanRequest>>,
    }

    impl ScriptedScanner {
        fn new(polls: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                polls: Mutex::new(polls.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn endpoints(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.endpoint.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ScanTransport for ScriptedScanner {
        async fn execute(&self, request: ScanRequest) -> Result<Value, Error> {
            self.requests.lock().unwrap().push(request.clone());
            match request.endpoint.as_str() {
                UPLOAD_URL_ENDPOINT => Ok(json!({ "data": "https://upload.example/u/1" })),
                "https://upload.example/u/1" => Ok(json!({ "data": { "id": "an-1" } })),
                "/analyses/an-1" => Ok(self.polls.lock().unwrap().pop_front().unwrap()),
                other => panic!("unexpected endpoint {other}"),
            }
        }
    }

    fn analysis(status: &str, suspicious: u64, malicious: u64) -> Value {
        json!({
            "data": {
                "id": "an-1",
                "attributes": {
                    "status": status,
                    "stats": { "suspicious": suspicious, "malicious": malicious, "harmless": 0 }
                }
            }
        })
    }

    fn scanner(transport: Arc<ScriptedScanner>, results_dir: PathBuf) -> FileScanner {
        let (tx, _rx) = channel();
        let (queue, _drainer) =
            RequestQueue::spawn(transport, RateLimit::new(100, Duration::from_secs(60)), tx.clone());
        FileScanner::new(
            queue,
            ScanSettings {
                results_dir,
                first_poll_delay: Duration::from_millis(30),
                poll_delay: Duration::from_millis(5),
            },
            tx,
        )
    }

    #[tokio::test]
    async fn test_scan_polls_until_completed_and_persists() {
        let temp = TempDir::new().unwrap();
        let transport = ScriptedScanner::new(vec![
            json!({ "data": { "attributes": { "status": "queued" } } }),
            json!({ "data": { "attributes": { "status": "in-progress" } } }),
            analysis("completed", 0, 0),
        ]);
        let scanner = scanner(transport.clone(), temp.path().to_path_buf());

        let clean = scanner
            .scan(b"MZ".to_vec(), "v1_Mod.dll", "Mod/1.0.0/v1/Mod.dll")
            .await
            .unwrap();
        assert!(clean);

        assert_eq!(
            transport.endpoints(),
            [
                UPLOAD_URL_ENDPOINT,
                "https://upload.example/u/1",
                "/analyses/an-1",
                "/analyses/an-1",
                "/analyses/an-1",
            ]
        );

        let upload = transport.requests.lock().unwrap()[1].clone();
        assert_eq!(
            upload.body,
            crate::queue::RequestBody::Multipart {
                file_name: "v1_Mod.dll".into(),
                bytes: b"MZ".to_vec()
            }
        );

        let persisted = temp.path().join("Mod/1.0.0/v1/Mod.dll.json");
        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(persisted).unwrap()).unwrap();
        assert_eq!(saved, analysis("completed", 0, 0));
    }

    #[tokio::test]
    async fn test_persist_rejects_keys_outside_results_dir() {
        let temp = TempDir::new().unwrap();
        let results_dir = temp.path().join("scanResults");
        let scanner = scanner(ScriptedScanner::new(vec![]), results_dir.clone());
        let verdict = parse_verdict("/analyses/an-1", analysis("completed", 0, 0)).unwrap();

        for key in ["Mod/1.0/v1/../../../../escaped", "/tmp/escaped", ""] {
            let error = scanner.persist(&verdict, key).await.unwrap_err();
            assert!(
                matches!(error, Error::Scan(ScanError::PersistFailed { .. })),
                "{key}: {error:?}"
            );
        }
        assert!(!temp.path().join("escaped.json").exists());
        assert!(!results_dir.exists());

        let saved = scanner.persist(&verdict, "Mod/1.0/v1/Mod.dll").await.unwrap();
        assert!(saved.starts_with(&results_dir));
    }

    #[tokio::test]
    async fn test_any_detection_is_not_clean() {
        for (suspicious, malicious) in [(1, 0), (0, 1)] {
            let temp = TempDir::new().unwrap();
            let transport = ScriptedScanner::new(vec![analysis("completed", suspicious, malicious)]);
            let scanner = scanner(transport, temp.path().to_path_buf());

            let clean = scanner.scan(b"MZ".to_vec(), "l", "k").await.unwrap();
            assert!(!clean);
            assert!(temp.path().join("k.json").exists());
        }
    }

    #[tokio::test]
    async fn test_persist_overwrites_existing_result() {
        let temp = TempDir::new().unwrap();
        let transport = ScriptedScanner::new(vec![
            analysis("completed", 2, 0),
            analysis("completed", 0, 0),
        ]);
        let scanner = scanner(transport, temp.path().to_path_buf());

        assert!(!scanner.scan(b"a".to_vec(), "l", "m/1/v/x.so").await.unwrap());
        assert!(scanner.scan(b"a".to_vec(), "l", "m/1/v/x.so").await.unwrap());

        let saved: Value = serde_json::from_str(
            &std::fs::read_to_string(temp.path().join("m/1/v/x.so.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["data"]["attributes"]["stats"]["suspicious"], 0);
    }

    #[test]
    fn test_parse_verdict() {
        let verdict = parse_verdict("/analyses/x", analysis("completed", 1, 2)).unwrap();
        assert_eq!(verdict.status, AnalysisStatus::Completed);
        assert_eq!((verdict.suspicious, verdict.malicious), (1, 2));

        let pending =
            parse_verdict("/analyses/x", json!({ "data": { "attributes": { "status": "queued" } } }))
                .unwrap();
        assert!(!pending.is_complete());

        let unknown =
            parse_verdict("/analyses/x", json!({ "data": { "attributes": { "status": "paused" } } }))
                .unwrap();
        assert_eq!(unknown.status, AnalysisStatus::Unknown);
    }

    #[test]
    fn test_parse_verdict_rejects_malformed_replies() {
        for reply in [
            json!({}),
            json!({ "data": {} }),
            json!({ "data": { "attributes": {} } }),
            json!({ "data": { "attributes": { "status": "completed" } } }),
            json!({ "data": { "attributes": { "status": "completed", "stats": { "malicious": "x", "suspicious": 0 } } } }),
        ] {
            assert!(matches!(
                parse_verdict("/analyses/x", reply),
                Err(Error::Scan(ScanError::UnexpectedResponse { .. }))
            ));
        }
    }
}

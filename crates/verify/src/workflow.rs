//! Per-version verification: download, select candidates, scan, aggregate

use crate::candidates::{extract_candidates, Extraction};
use crate::VersionCheck;
use async_trait::async_trait;
use smrv_errors::Error;
use smrv_events::{AppEvent, EventEmitter, EventSender, FailureContext, VerifyEvent};
use smrv_net::{download_with_retry, resolve_link, NetClient, RetryPolicy};
use smrv_scanner::FileScan;
use smrv_types::{ArchiveEntry, CandidatePolicy, PackageVersion};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Settings of the verification workflow
#[derive(Debug, Clone)]
pub struct VerifySettings {
    /// Root that relative version links are resolved against
    pub registry_api_url: String,
    pub retry: RetryPolicy,
    pub policy: CandidatePolicy,
}

/// Verifies versions by scanning their candidate executables
pub struct VersionVerifier {
    client: NetClient,
    scanner: Arc<dyn FileScan>,
    settings: VerifySettings,
    tx: EventSender,
}

impl VersionVerifier {
    #[must_use]
    pub fn new(
        client: NetClient,
        scanner: Arc<dyn FileScan>,
        settings: VerifySettings,
        tx: EventSender,
    ) -> Self {
        Self {
            client,
            scanner,
            settings,
            tx,
        }
    }

    /// Download the archive of a version
    ///
    /// # Errors
    ///
    /// Returns an error if the link is invalid or the download fails; only
    /// bad-request responses are retried.
    pub async fn download(&self, version: &PackageVersion) -> Result<Vec<u8>, Error> {
        let url = resolve_link(&self.settings.registry_api_url, &version.link)?;
        let downloaded =
            download_with_retry(&self.client, &url, &self.settings.retry, &self.tx).await?;
        Ok(downloaded.bytes)
    }

    /// Extract candidates on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error if the archive or its manifest is malformed.
    pub async fn extract(&self, archive: Vec<u8>) -> Result<Extraction, Error> {
        let policy = self.settings.policy.clone();
        tokio::task::spawn_blocking(move || extract_candidates(&archive, &policy))
            .await
            .map_err(|e| Error::internal(format!("candidate extraction task failed: {e}")))?
    }

    /// Scan every entry concurrently and return one result per entry, in
    /// entry order
    ///
    /// A failed or panicked scan yields `false` for its entry.
    pub async fn scan_entries(
        &self,
        version: &PackageVersion,
        entries: Vec<ArchiveEntry>,
    ) -> Vec<bool> {
        let mut results = vec![false; entries.len()];
        let mut tasks = JoinSet::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let scanner = Arc::clone(&self.scanner);
            let label = version.scan_label(&entry.path);
            let output_key = version.output_key(&entry.path);

            tasks.spawn(async move {
                let result = scanner.scan(entry.content, &label, &output_key).await;
                (index, entry.path, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, path, Ok(clean))) => {
                    results[index] = clean;
                    self.tx.emit_correlated(
                        &version.id,
                        AppEvent::Verify(VerifyEvent::EntryScanned {
                            version_id: version.id.clone(),
                            path,
                            clean,
                        }),
                    );
                }
                Ok((_, path, Err(e))) => {
                    self.tx.emit_correlated(
                        &version.id,
                        AppEvent::Verify(VerifyEvent::EntryFailed {
                            version_id: version.id.clone(),
                            path,
                            failure: FailureContext::from_error(&e),
                        }),
                    );
                }
                Err(e) => {
                    self.tx.emit_error_with_details(
                        format!("scan task for {version} did not finish"),
                        e.to_string(),
                    );
                }
            }
        }

        results
    }

    fn report_extraction(&self, version: &PackageVersion, extraction: &Extraction) {
        for skipped in &extraction.skipped {
            self.tx.emit_correlated(
                &version.id,
                AppEvent::Verify(VerifyEvent::EntrySkipped {
                    version_id: version.id.clone(),
                    path: skipped.path.clone(),
                    reason: skipped.reason.clone(),
                }),
            );
        }

        self.tx.emit_correlated(
            &version.id,
            AppEvent::Verify(VerifyEvent::CandidatesFound {
                version_id: version.id.clone(),
                paths: extraction.paths(),
            }),
        );
    }
}

#[async_trait]
impl VersionCheck for VersionVerifier {
    async fn verify(&self, version: &PackageVersion) -> Result<bool, Error> {
        let started = Instant::now();
        self.tx.emit_correlated(
            &version.id,
            AppEvent::Verify(VerifyEvent::Started {
                version_id: version.id.clone(),
                version: version.to_string(),
            }),
        );

        let archive = self.download(version).await?;
        let extraction = self.extract(archive).await?;
        self.report_extraction(version, &extraction);

        // Every entry is scanned even once one is known to be bad
        let results = self.scan_entries(version, extraction.entries).await;
        let safe = results.iter().all(|clean| *clean);

        self.tx.emit_correlated(
            &version.id,
            AppEvent::Verify(VerifyEvent::Completed {
                version_id: version.id.clone(),
                version: version.to_string(),
                safe,
                duration: started.elapsed(),
            }),
        );

        Ok(safe)
    }
}


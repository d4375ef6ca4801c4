//! Poll loop and approval decisions
//!
//! Every tick lists the unapproved versions and dispatches the ones not seen
//! before. Each dispatched version runs on its own task:
//! verify -> re-check approval -> approve. Only this module mutates approval
//! state in the registry.

use crate::dispatched::DispatchedVersions;
use crate::types::VersionOutcome;
use smrv_errors::Error;
use smrv_events::{AppEvent, ApprovalEvent, EventEmitter, EventSender, FailureContext};
use smrv_registry::Registry;
use smrv_types::PackageVersion;
use smrv_verify::VersionCheck;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};

/// Owns the dispatched set and the in-flight version tasks
pub struct ApprovalDriver {
    registry: Arc<dyn Registry>,
    verifier: Arc<dyn VersionCheck>,
    dispatched: DispatchedVersions,
    tasks: JoinSet<(String, VersionOutcome)>,
    tx: EventSender,
}

impl ApprovalDriver {
    #[must_use]
    pub fn new(
        registry: Arc<dyn Registry>,
        verifier: Arc<dyn VersionCheck>,
        tx: EventSender,
    ) -> Self {
        Self {
            registry,
            verifier,
            dispatched: DispatchedVersions::new(),
            tasks: JoinSet::new(),
            tx,
        }
    }

    #[must_use]
    pub fn dispatched(&self) -> &DispatchedVersions {
        &self.dispatched
    }

    /// Number of versions still being processed
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Run one poll and return how many versions were newly dispatched
    ///
    /// A failed listing is reported as an event and dispatches nothing.
    pub async fn tick(&mut self) -> usize {
        self.reap();

        let versions = match self.registry.list_unapproved_versions().await {
            Ok(versions) => versions,
            Err(e) => {
                self.tx.emit(AppEvent::Approval(ApprovalEvent::PollFailed {
                    failure: FailureContext::from_error(&e),
                }));
                return 0;
            }
        };

        let unapproved = versions.len();
        let mut dispatched = 0;
        for version in versions {
            // Marked before the task exists, so the next tick cannot race it
            if !self.dispatched.mark(&version.id) {
                continue;
            }
            dispatched += 1;

            self.tx.emit_correlated(
                &version.id,
                AppEvent::Approval(ApprovalEvent::VersionDispatched {
                    version_id: version.id.clone(),
                    version: version.to_string(),
                }),
            );

            let registry = Arc::clone(&self.registry);
            let verifier = Arc::clone(&self.verifier);
            let tx = self.tx.clone();
            self.tasks.spawn(async move {
                let outcome = process_version(&*registry, &*verifier, &version, &tx).await;
                (version.id, outcome)
            });
        }

        self.tx.emit(AppEvent::Approval(ApprovalEvent::PollCompleted {
            unapproved,
            dispatched,
        }));
        dispatched
    }

    /// Poll forever: once immediately, then every `period`
    pub async fn run(&mut self, period: Duration) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Wait for every in-flight version and return their outcomes
    pub async fn drain(&mut self) -> Vec<(String, VersionOutcome)> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => self.report_panic(&e),
            }
        }
        outcomes
    }

    fn reap(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(e) = joined {
                self.report_panic(&e);
            }
        }
    }

    fn report_panic(&self, error: &tokio::task::JoinError) {
        self.tx
            .emit_error_with_details("version task did not finish", error.to_string());
    }
}

/// Verify one version and approve it when it is safe
///
/// Every failure is reported as an event and returned as
/// [`VersionOutcome::Failed`]; nothing is retried.
pub async fn process_version(
    registry: &dyn Registry,
    verifier: &dyn VersionCheck,
    version: &PackageVersion,
    tx: &EventSender,
) -> VersionOutcome {
    let version_id = version.id.clone();
    let label = version.to_string();
    let emit = |event: ApprovalEvent| tx.emit_correlated(&version_id, AppEvent::Approval(event));

    let safe = match verifier.verify(version).await {
        Ok(safe) => safe,
        Err(e) => {
            emit(ApprovalEvent::VerificationFailed {
                version_id: version_id.clone(),
                version: label,
                failure: FailureContext::from_error(&e),
            });
            return VersionOutcome::Failed(e);
        }
    };

    if !safe {
        emit(ApprovalEvent::ManualReviewRequired {
            version_id: version_id.clone(),
            version: label,
        });
        return VersionOutcome::NeedsManualReview;
    }

    match approve(registry, &version_id).await {
        Ok(outcome) => {
            let event = match outcome {
                VersionOutcome::AlreadyApproved => ApprovalEvent::AlreadyApproved {
                    version_id: version_id.clone(),
                    version: label,
                },
                VersionOutcome::ApprovalRejected => ApprovalEvent::ApprovalRejected {
                    version_id: version_id.clone(),
                    version: label,
                },
                _ => ApprovalEvent::Approved {
                    version_id: version_id.clone(),
                    version: label,
                },
            };
            emit(event);
            outcome
        }
        Err(e) => {
            emit(ApprovalEvent::ApprovalFailed {
                version_id: version_id.clone(),
                version: label,
                failure: FailureContext::from_error(&e),
            });
            VersionOutcome::Failed(e)
        }
    }
}

async fn approve(registry: &dyn Registry, version_id: &str) -> Result<VersionOutcome, Error> {
    // Someone may have approved it by hand while it was being scanned
    if registry.is_version_approved(version_id).await? {
        return Ok(VersionOutcome::AlreadyApproved);
    }

    if registry.approve_version(version_id).await? {
        Ok(VersionOutcome::Approved)
    } else {
        Ok(VersionOutcome::ApprovalRejected)
    }
}

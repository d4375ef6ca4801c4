//! One-off verification commands
//!
//! These run the full verification pipeline but never approve anything.

use crate::types::VerificationReport;
use crate::OpsCtx;
use futures::future::join_all;
use smrv_errors::Error;
use smrv_events::EventEmitter;
use smrv_types::PackageVersion;
use std::time::Instant;

/// Verify the given versions concurrently
///
/// # Errors
///
/// Returns an error if a version cannot be looked up in the registry.
/// Verification failures are part of the individual reports.
pub async fn verify_versions(
    ctx: &OpsCtx,
    version_ids: &[String],
) -> Result<Vec<VerificationReport>, Error> {
    let mut versions = Vec::with_capacity(version_ids.len());
    for id in version_ids {
        versions.push(ctx.registry.get_version(id).await?);
    }

    ctx.tx.emit_operation_started("verify");
    let reports = verify_all(ctx, versions).await;
    ctx.tx.emit_operation_completed("verify", true);
    Ok(reports)
}

/// Verify the newest versions of a page of mods
///
/// # Errors
///
/// Returns an error if the registry cannot list the sample.
pub async fn sample_versions(
    ctx: &OpsCtx,
    limit: u32,
    offset: u32,
    versions_per_mod: u32,
) -> Result<Vec<VerificationReport>, Error> {
    let versions = ctx
        .registry
        .sample_versions(limit, offset, versions_per_mod)
        .await?;

    ctx.tx.emit_operation_started("sample");
    let reports = verify_all(ctx, versions).await;
    ctx.tx.emit_operation_completed("sample", true);
    Ok(reports)
}

async fn verify_all(ctx: &OpsCtx, versions: Vec<PackageVersion>) -> Vec<VerificationReport> {
    join_all(versions.into_iter().map(|version| async move {
        let started = Instant::now();
        let result = ctx.verifier.verify(&version).await;
        VerificationReport {
            version,
            result,
            duration: started.elapsed(),
        }
    }))
    .await
}

//! Periodic retention sweep of old audit records.
//!
//! Spawns a background loop that deletes records older than the configured
//! retention period. Runs on a fixed interval using `tokio::time::interval`
//! until cancelled. Delete-only and idempotent, so the sweep never requires
//! pausing writers.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use papertrail_core::policy::AuditPolicy;
use papertrail_db::repositories::RecordRepo;

/// Run the retention sweep loop.
///
/// Deletes audit records strictly older than `policy.retention_days`.
/// Runs every `interval` until `cancel` is triggered.
pub async fn run(pool: PgPool, policy: AuditPolicy, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        retention_days = policy.retention_days,
        interval_secs = interval.as_secs(),
        "Retention sweep started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Retention sweep stopping");
                break;
            }
            _ = ticker.tick() => {
                let cutoff = policy.retention_cutoff(Utc::now());
                match RecordRepo::delete_older_than(&pool, cutoff).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, %cutoff, "Retention sweep: purged old records");
                        } else {
                            tracing::debug!(%cutoff, "Retention sweep: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Retention sweep failed");
                    }
                }
            }
        }
    }
}

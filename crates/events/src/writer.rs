//! Durable record persistence service.
//!
//! [`RecordWriter`] subscribes to the [`RecordBus`](crate::bus::RecordBus)
//! broadcast channel and appends every received draft to the record store.
//! It runs as a long-lived background task and shuts down gracefully when
//! the bus sender is dropped.
//!
//! A failed append is logged and skipped: audit logging never blocks or
//! fails the host's primary mutation, so write errors are strictly
//! non-fatal here.

use tokio::sync::broadcast;

use papertrail_core::record::RecordDraft;
use papertrail_db::models::record::NewAuditRecord;
use papertrail_db::repositories::RecordRepo;
use papertrail_db::DbPool;

/// Background service that persists published record drafts.
pub struct RecordWriter;

impl RecordWriter {
    /// Run the persistence loop.
    ///
    /// Drains the provided `receiver` until the channel closes (i.e. the
    /// [`RecordBus`](crate::bus::RecordBus) is dropped).
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<RecordDraft>) {
        loop {
            match receiver.recv().await {
                Ok(draft) => {
                    let record = NewAuditRecord::from_draft(&draft);
                    if let Err(e) = RecordRepo::insert(&pool, &record).await {
                        tracing::error!(
                            error = %e,
                            action = %record.action,
                            object_type = %record.object_type,
                            "Failed to persist audit record"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Record writer lagged, some audit records were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Record bus closed, writer shutting down");
                    break;
                }
            }
        }
    }
}

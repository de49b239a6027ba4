//! In-process record bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`RecordBus`] decouples the synchronous ingestion path from database
//! writes: the observer publishes assembled [`RecordDraft`]s and returns
//! immediately; the [`RecordWriter`](crate::writer::RecordWriter) drains
//! the channel on its own task. It is designed to be shared via
//! `Arc<RecordBus>` across the application.

use papertrail_core::record::RecordDraft;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out channel for audit record drafts.
pub struct RecordBus {
    sender: broadcast::Sender<RecordDraft>,
}

impl RecordBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed drafts are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a draft to all current subscribers.
    ///
    /// With zero subscribers the draft is silently dropped; persistence is
    /// fire-and-forget from the publisher's perspective either way.
    pub fn publish(&self, draft: RecordDraft) {
        let _ = self.sender.send(draft);
    }

    /// Subscribe to all drafts published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RecordDraft> {
        self.sender.subscribe()
    }
}

impl Default for RecordBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

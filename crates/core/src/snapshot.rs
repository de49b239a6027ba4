//! Lifecycle-scoped store of pre-mutation entity state.
//!
//! One [`SnapshotStore`] lives for exactly one host request/mutation
//! lifecycle. It is an explicit context object owned by the observer, never
//! ambient global state, so snapshots cannot leak across unrelated requests.

use std::collections::HashMap;

use serde_json::Value;

use crate::types::DbId;

/// Raw field-value mapping as captured from the host.
pub type FieldMap = serde_json::Map<String, Value>;

/// Transient keyed cache of "before" entity states.
///
/// `capture` is first-write-wins: within one lifecycle, several hook points
/// may fire before the terminal write, and "old" must reflect the state
/// before the first of them. `take` consumes the entry so each snapshot is
/// compared at most once.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    entries: HashMap<(String, DbId), FieldMap>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the pre-mutation state for `(entity_kind, entity_id)` unless a
    /// snapshot already exists for that key.
    pub fn capture(&mut self, entity_kind: &str, entity_id: DbId, fields: FieldMap) {
        self.entries
            .entry((entity_kind.to_string(), entity_id))
            .or_insert(fields);
    }

    /// Retrieve and remove the snapshot for `(entity_kind, entity_id)`.
    ///
    /// `None` means no pre-mutation state was captured; the caller treats
    /// the entity as newly created.
    pub fn take(&mut self, entity_kind: &str, entity_id: DbId) -> Option<FieldMap> {
        self.entries.remove(&(entity_kind.to_string(), entity_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all remaining snapshots. Called at lifecycle teardown.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Audit record entity model and DTOs.
//!
//! Records are immutable once created (no `updated_at`); the only deletes
//! are the retention sweep and clear-all.

use papertrail_core::record::RecordDraft;
use papertrail_core::severity::Severity;
use papertrail_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Audit record entity
// ---------------------------------------------------------------------------

/// A single persisted audit record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditRecord {
    pub id: DbId,
    pub timestamp: Timestamp,
    /// `None` means system-initiated (no acting user).
    pub actor_id: Option<DbId>,
    pub actor_ip: Option<String>,
    pub severity: String,
    pub action: String,
    pub object_type: String,
    /// `0` for records with no singular target.
    pub object_id: DbId,
    pub object_name: String,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

impl AuditRecord {
    /// Parse the stored severity string back into the taxonomy.
    pub fn severity(&self) -> Result<Severity, papertrail_core::CoreError> {
        Severity::from_str(&self.severity)
    }
}

// ---------------------------------------------------------------------------
// Insert DTO
// ---------------------------------------------------------------------------

/// DTO for inserting a new audit record.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAuditRecord {
    pub timestamp: Timestamp,
    pub actor_id: Option<DbId>,
    pub actor_ip: Option<String>,
    pub severity: Severity,
    pub action: String,
    pub object_type: String,
    pub object_id: DbId,
    pub object_name: String,
    pub details: serde_json::Value,
}

impl NewAuditRecord {
    /// Convert a mapper-produced draft into the insert DTO.
    ///
    /// Details that cannot be serialized are replaced by a placeholder note
    /// rather than dropping the whole record.
    pub fn from_draft(draft: &RecordDraft) -> Self {
        let details = serde_json::to_value(&draft.details).unwrap_or_else(|e| {
            tracing::warn!(error = %e, action = draft.action(), "Unserializable record details, substituting placeholder");
            serde_json::json!({"note": "(details unavailable)"})
        });

        Self {
            timestamp: draft.timestamp,
            actor_id: draft.actor_id,
            actor_ip: draft.actor_ip.clone(),
            severity: draft.severity,
            action: draft.action().to_string(),
            object_type: draft.object_type().to_string(),
            object_id: draft.object_id,
            object_name: draft.object_name.clone(),
            details,
        }
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for querying audit records. All filters are optional
/// and AND-combined; `search` alone fans out as an OR across object name,
/// details, and action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordQuery {
    pub severity: Option<Severity>,
    pub actor_id: Option<DbId>,
    pub action: Option<String>,
    pub object_type: Option<String>,
    pub object_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Read envelopes
// ---------------------------------------------------------------------------

/// Paginated response for record queries.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPage {
    pub items: Vec<AuditRecord>,
    pub total: i64,
}

/// One row of the action frequency table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActionCount {
    pub action: String,
    pub count: i64,
}

/// One row of the actor frequency table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActorCount {
    pub actor_id: Option<DbId>,
    pub count: i64,
}

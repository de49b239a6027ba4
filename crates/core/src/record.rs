//! The assembled, not-yet-persisted audit record.

use chrono::Utc;

use crate::change::Details;
use crate::events::EventKind;
use crate::severity::Severity;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// RecordDraft
// ---------------------------------------------------------------------------

/// A fully-assembled record as produced by the mapper, before the store
/// assigns its id. Cloneable so it can travel through a broadcast channel
/// to the persistence loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub timestamp: Timestamp,
    /// Acting user; `None` means system-initiated.
    pub actor_id: Option<DbId>,
    /// Validated IP string of the acting client, if known and recorded.
    pub actor_ip: Option<String>,
    pub severity: Severity,
    pub kind: EventKind,
    /// Target entity id; `0` for records with no singular target.
    pub object_id: DbId,
    pub object_name: String,
    pub details: Details,
    /// Source identifier checked against suppression patterns. Not
    /// persisted.
    pub source_key: String,
}

impl RecordDraft {
    /// Start a draft for `kind` targeting one entity, stamped now.
    ///
    /// The source key defaults to the action key; option events override it
    /// with the option name so housekeeping writes can be suppressed by
    /// name pattern.
    pub fn new(kind: EventKind, object_id: DbId, object_name: impl Into<String>) -> Self {
        let object_name = object_name.into();
        let source_key = if kind.object_type() == "option" {
            object_name.clone()
        } else {
            kind.as_str().to_string()
        };

        Self {
            timestamp: Utc::now(),
            actor_id: None,
            actor_ip: None,
            severity: kind.default_severity(),
            kind,
            object_id,
            object_name,
            details: Details::new(),
            source_key,
        }
    }

    /// Action key for storage and filtering.
    pub fn action(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Object type category for storage and filtering.
    pub fn object_type(&self) -> &'static str {
        self.kind.object_type()
    }
}

/// Validate a raw client address, returning it only if it parses as an
/// IPv4/IPv6 address. Anything else (including the empty string) is
/// dropped rather than stored.
pub fn validated_ip(raw: &str) -> Option<String> {
    raw.parse::<std::net::IpAddr>().ok().map(|ip| ip.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_starts_with_kind_defaults() {
        let draft = RecordDraft::new(EventKind::PostUpdated, 7, "Hello");
        assert_eq!(draft.severity, Severity::Info);
        assert_eq!(draft.action(), "post_updated");
        assert_eq!(draft.object_type(), "post");
        assert_eq!(draft.object_id, 7);
        assert!(draft.details.is_empty());
        assert!(draft.actor_id.is_none());
    }

    #[test]
    fn option_drafts_use_option_name_as_source_key() {
        let draft = RecordDraft::new(EventKind::OptionUpdated, 0, "_transient_feed");
        assert_eq!(draft.source_key, "_transient_feed");

        let draft = RecordDraft::new(EventKind::PostUpdated, 1, "_transient_feed");
        assert_eq!(draft.source_key, "post_updated");
    }

    #[test]
    fn validated_ip_accepts_v4_and_v6() {
        assert_eq!(validated_ip("192.0.2.7"), Some("192.0.2.7".to_string()));
        assert_eq!(validated_ip("::1"), Some("::1".to_string()));
    }

    #[test]
    fn validated_ip_rejects_garbage() {
        assert_eq!(validated_ip(""), None);
        assert_eq!(validated_ip("localhost"), None);
        assert_eq!(validated_ip("999.1.1.1"), None);
    }
}

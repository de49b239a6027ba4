//! Per-request mutation observer: the event-to-record mapper.
//!
//! One [`MutationObserver`] lives for exactly one host request/mutation
//! lifecycle. The host calls [`notify_pre_mutation`] at its "about to
//! mutate" point and [`notify_post_mutation`] once the mutation committed;
//! the observer captures before state, diffs it against after state,
//! assigns severity, applies the write-time policy gates, and publishes
//! surviving records to the [`RecordBus`].
//!
//! Both entry points are fail-open with respect to the host's primary
//! operation: nothing here blocks on I/O and nothing propagates out.
//!
//! [`notify_pre_mutation`]: MutationObserver::notify_pre_mutation
//! [`notify_post_mutation`]: MutationObserver::notify_post_mutation

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use papertrail_core::change::Details;
use papertrail_core::diff::{diff_nested, diff_scalar, diff_set, ids_from_value};
use papertrail_core::events::EventKind;
use papertrail_core::fields::{tracked_fields, FieldKind, RESTRICTED_STATUS};
use papertrail_core::policy::AuditPolicy;
use papertrail_core::record::{validated_ip, RecordDraft};
use papertrail_core::resolve::{fallback_label, DisplayNameResolver};
use papertrail_core::severity::Severity;
use papertrail_core::snapshot::{FieldMap, SnapshotStore};
use papertrail_core::types::DbId;

use crate::bus::RecordBus;

// ---------------------------------------------------------------------------
// MutationObserver
// ---------------------------------------------------------------------------

/// Lifecycle-scoped observer mapping host mutation events to audit records.
pub struct MutationObserver {
    policy: AuditPolicy,
    resolver: Arc<dyn DisplayNameResolver>,
    bus: Arc<RecordBus>,
    snapshots: SnapshotStore,
    /// Correlation ids already consumed in this lifecycle. A correlation
    /// leaves the captured state at most once; later notifications for the
    /// same id are no-ops.
    consumed: HashSet<String>,
    actor_id: Option<DbId>,
    actor_ip: Option<String>,
}

impl MutationObserver {
    /// Create an observer for one request lifecycle.
    pub fn new(policy: AuditPolicy, resolver: Arc<dyn DisplayNameResolver>, bus: Arc<RecordBus>) -> Self {
        Self {
            policy,
            resolver,
            bus,
            snapshots: SnapshotStore::new(),
            consumed: HashSet::new(),
            actor_id: None,
            actor_ip: None,
        }
    }

    /// Attach the acting user for all records of this lifecycle.
    pub fn with_actor(mut self, actor_id: DbId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Attach the acting client address. Anything that does not parse as an
    /// IP address is dropped.
    pub fn with_actor_ip(mut self, raw: &str) -> Self {
        self.actor_ip = validated_ip(raw);
        self
    }

    /// Host contract: a mutation of `(entity_kind, entity_id)` is about to
    /// commit; `current_fields` is the entity's current (pre-mutation)
    /// state. First capture wins within the lifecycle.
    pub fn notify_pre_mutation(&mut self, entity_kind: &str, entity_id: DbId, current_fields: FieldMap) {
        self.snapshots.capture(entity_kind, entity_id, current_fields);
        tracing::trace!(entity_kind, entity_id, "Captured pre-mutation snapshot");
    }

    /// Host contract: a mutation of `(entity_kind, entity_id)` committed as
    /// `kind`, leaving the entity in the state `new_fields`.
    ///
    /// `correlation_id` groups every notification belonging to one logical
    /// mutation; repeated notifications with the same id within this
    /// lifecycle produce exactly one record.
    pub fn notify_post_mutation(
        &mut self,
        entity_kind: &str,
        entity_id: DbId,
        kind: EventKind,
        new_fields: FieldMap,
        correlation_id: &str,
    ) {
        if !self.consumed.insert(correlation_id.to_string()) {
            tracing::debug!(correlation_id, "Duplicate post-mutation notification ignored");
            return;
        }

        let snapshot = self.snapshots.take(entity_kind, entity_id);
        let details = self.compute_details(entity_kind, kind, snapshot.as_ref(), &new_fields);

        if details.is_empty() && kind.requires_change() {
            tracing::debug!(
                entity_kind,
                entity_id,
                action = kind.as_str(),
                "Saved, no changes detected; record suppressed"
            );
            return;
        }

        let object_name = object_name_from(&new_fields, entity_kind, entity_id);
        let mut draft = RecordDraft::new(kind, entity_id, object_name);
        draft.details = details;
        draft.severity = assign_severity(kind, &draft.details, &new_fields);

        if self.policy.log_actor_id {
            draft.actor_id = self.actor_id;
        }
        if self.policy.log_ip {
            draft.actor_ip = self.actor_ip.clone();
        }

        if self.policy.should_suppress_source(&draft.source_key) {
            tracing::debug!(source_key = %draft.source_key, "Suppressed noisy source");
            return;
        }

        if !self.policy.should_write(draft.severity) {
            tracing::debug!(
                severity = %draft.severity,
                min = %self.policy.min_severity,
                "Record below severity threshold"
            );
            return;
        }

        self.bus.publish(draft);
    }

    /// Diff the snapshot against the post-mutation state.
    fn compute_details(
        &self,
        entity_kind: &str,
        kind: EventKind,
        snapshot: Option<&FieldMap>,
        new_fields: &FieldMap,
    ) -> Details {
        let empty = FieldMap::new();
        // No snapshot means no prior state: the entity is newly created and
        // every tracked value diffs against emptiness.
        let old_fields = snapshot.unwrap_or(&empty);

        let mut details = Details::new();
        let registry = tracked_fields(entity_kind);

        if registry.is_empty() {
            // Unregistered entity kind: generic structured diff.
            if let Some(change) = diff_nested(old_fields, new_fields) {
                details.push("changes", change);
            }
        } else {
            for field in registry {
                let old = old_fields.get(field.name);
                let new = new_fields.get(field.name);

                let change = match field.kind {
                    FieldKind::Relation(target) => diff_set(
                        &ids_from_value(old),
                        &ids_from_value(new),
                        target,
                        self.resolver.as_ref(),
                    ),
                    FieldKind::Serialized => match (old, new) {
                        (Some(Value::Object(o)), Some(Value::Object(n))) => diff_nested(o, n),
                        _ => diff_scalar(field, old, new, self.resolver.as_ref()),
                    },
                    _ => diff_scalar(field, old, new, self.resolver.as_ref()),
                };

                if let Some(change) = change {
                    details.push(field.name, change);
                }
            }
        }

        // Kinds that log without a diff never ship an empty details map; a
        // contextual note marks what happened instead.
        if details.is_empty() {
            if let Some(note) = kind.summary_note() {
                details.push_note("note", note);
            }
        }

        details
    }
}

// ---------------------------------------------------------------------------
// Severity assignment
// ---------------------------------------------------------------------------

/// Severity is a pure function of the event kind, with one exception: an
/// update that moves an entity into the restricted-visibility status
/// escalates to `warning`.
fn assign_severity(kind: EventKind, details: &Details, new_fields: &FieldMap) -> Severity {
    let base = kind.default_severity();

    if kind.requires_change()
        && details.get("status").is_some()
        && new_fields.get("status").and_then(Value::as_str) == Some(RESTRICTED_STATUS)
        && Severity::Warning.is_at_least(base)
    {
        return Severity::Warning;
    }

    base
}

/// Derive the record's display label from the post-mutation state.
fn object_name_from(fields: &FieldMap, entity_kind: &str, entity_id: DbId) -> String {
    for key in ["title", "display_name", "name"] {
        if let Some(Value::String(s)) = fields.get(key) {
            if !s.is_empty() {
                return s.clone();
            }
        }
    }
    fallback_label(entity_kind, entity_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use papertrail_core::change::Change;
    use papertrail_core::resolve::StaticResolver;
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;

    fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    struct Harness {
        observer: MutationObserver,
        rx: tokio::sync::broadcast::Receiver<RecordDraft>,
    }

    fn harness(policy: AuditPolicy) -> Harness {
        let mut resolver = StaticResolver::new();
        resolver.insert("term", 1, "Drafts");
        resolver.insert("term", 4, "News");
        resolver.insert("user", 2, "bob");

        let bus = Arc::new(RecordBus::default());
        let rx = bus.subscribe();
        let observer = MutationObserver::new(policy, Arc::new(resolver), bus).with_actor(2);
        Harness { observer, rx }
    }

    #[test]
    fn title_edit_produces_one_info_record() {
        let mut h = harness(AuditPolicy::default());

        h.observer
            .notify_pre_mutation("post", 7, fields(json!({"title": "A"})));
        h.observer.notify_post_mutation(
            "post",
            7,
            EventKind::PostUpdated,
            fields(json!({"title": "B"})),
            "save-7",
        );

        let draft = h.rx.try_recv().unwrap();
        assert_eq!(draft.severity, Severity::Info);
        assert_eq!(draft.action(), "post_updated");
        assert_eq!(draft.object_name, "B");
        assert_eq!(draft.details.len(), 1);
        assert_eq!(draft.details.get("title"), Some(&Change::scalar("A", "B")));

        assert_matches!(h.rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn unchanged_update_is_suppressed() {
        let mut h = harness(AuditPolicy::default());

        h.observer
            .notify_pre_mutation("post", 7, fields(json!({"title": "A"})));
        h.observer.notify_post_mutation(
            "post",
            7,
            EventKind::PostUpdated,
            fields(json!({"title": "A"})),
            "save-7",
        );

        assert_matches!(h.rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn term_relations_diff_as_set_delta() {
        let mut h = harness(AuditPolicy::default());

        h.observer.notify_pre_mutation(
            "post",
            7,
            fields(json!({"title": "A", "categories": [1, 2, 3]})),
        );
        h.observer.notify_post_mutation(
            "post",
            7,
            EventKind::PostUpdated,
            fields(json!({"title": "A", "categories": [2, 3, 4]})),
            "save-7",
        );

        let draft = h.rx.try_recv().unwrap();
        assert_eq!(
            draft.details.get("categories"),
            Some(&Change::Set {
                added: vec!["News".into()],
                removed: vec!["Drafts".into()],
            })
        );
    }

    #[test]
    fn duplicate_correlation_id_produces_one_record() {
        let mut h = harness(AuditPolicy::default());

        h.observer
            .notify_pre_mutation("post", 7, fields(json!({"title": "A"})));
        h.observer.notify_post_mutation(
            "post",
            7,
            EventKind::PostUpdated,
            fields(json!({"title": "B"})),
            "save-7",
        );
        // A second hook point claims the same logical mutation.
        h.observer.notify_post_mutation(
            "post",
            7,
            EventKind::PostUpdated,
            fields(json!({"title": "B"})),
            "save-7",
        );

        assert!(h.rx.try_recv().is_ok());
        assert_matches!(h.rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn creation_logs_without_a_snapshot() {
        let mut h = harness(AuditPolicy::default());

        h.observer.notify_post_mutation(
            "post",
            9,
            EventKind::PostCreated,
            fields(json!({"title": "Fresh", "status": "draft"})),
            "create-9",
        );

        let draft = h.rx.try_recv().unwrap();
        assert_eq!(draft.action(), "post_created");
        // New entity: tracked fields diff from emptiness.
        assert_eq!(
            draft.details.get("title"),
            Some(&Change::scalar("(empty)", "Fresh"))
        );
        assert!(!draft.details.is_empty());
    }

    #[test]
    fn login_logs_a_note_never_an_empty_details_map() {
        let mut h = harness(AuditPolicy::default());

        h.observer.notify_post_mutation(
            "user",
            2,
            EventKind::UserLoggedIn,
            fields(json!({"display_name": "bob"})),
            "login-2",
        );

        let draft = h.rx.try_recv().unwrap();
        assert_eq!(draft.action(), "user_logged_in");
        assert_eq!(draft.object_name, "bob");
        assert!(!draft.details.is_empty());
        assert_eq!(draft.details.get("note"), Some(&Change::note("Logged in")));
    }

    #[test]
    fn restricted_visibility_update_escalates_to_warning() {
        let mut h = harness(AuditPolicy::default());

        h.observer.notify_pre_mutation(
            "post",
            7,
            fields(json!({"title": "A", "status": "publish"})),
        );
        h.observer.notify_post_mutation(
            "post",
            7,
            EventKind::PostUpdated,
            fields(json!({"title": "A", "status": "private"})),
            "save-7",
        );

        let draft = h.rx.try_recv().unwrap();
        assert_eq!(draft.severity, Severity::Warning);
        assert_eq!(
            draft.details.get("status"),
            Some(&Change::scalar("Published", "Private"))
        );
    }

    #[test]
    fn ordinary_status_change_stays_info() {
        let mut h = harness(AuditPolicy::default());

        h.observer.notify_pre_mutation(
            "post",
            7,
            fields(json!({"status": "draft"})),
        );
        h.observer.notify_post_mutation(
            "post",
            7,
            EventKind::PostUpdated,
            fields(json!({"status": "publish"})),
            "save-7",
        );

        assert_eq!(h.rx.try_recv().unwrap().severity, Severity::Info);
    }

    #[test]
    fn suppressed_source_never_reaches_the_bus() {
        let mut h = harness(AuditPolicy::default());

        h.observer.notify_pre_mutation(
            "option",
            0,
            fields(json!({"name": "_transient_foo", "value": "1"})),
        );
        h.observer.notify_post_mutation(
            "option",
            0,
            EventKind::OptionUpdated,
            fields(json!({"name": "_transient_foo", "value": "2"})),
            "opt-transient",
        );

        assert_matches!(h.rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn ordinary_option_change_is_logged() {
        let mut h = harness(AuditPolicy::default());

        h.observer.notify_pre_mutation(
            "option",
            0,
            fields(json!({"name": "blogname", "value": "Old Site"})),
        );
        h.observer.notify_post_mutation(
            "option",
            0,
            EventKind::OptionUpdated,
            fields(json!({"name": "blogname", "value": "New Site"})),
            "opt-blogname",
        );

        let draft = h.rx.try_recv().unwrap();
        assert_eq!(draft.object_name, "blogname");
        assert_eq!(draft.object_id, 0);
        assert_eq!(
            draft.details.get("value"),
            Some(&Change::scalar("Old Site", "New Site"))
        );
    }

    #[test]
    fn severity_gate_drops_records_below_threshold() {
        let policy = AuditPolicy {
            min_severity: Severity::Warning,
            ..AuditPolicy::default()
        };
        let mut h = harness(policy);

        // Info-severity update is gated out...
        h.observer
            .notify_pre_mutation("post", 7, fields(json!({"title": "A"})));
        h.observer.notify_post_mutation(
            "post",
            7,
            EventKind::PostUpdated,
            fields(json!({"title": "B"})),
            "save-7",
        );
        assert_matches!(h.rx.try_recv(), Err(TryRecvError::Empty));

        // ...while a warning-severity deletion passes.
        h.observer.notify_post_mutation(
            "post",
            7,
            EventKind::PostDeleted,
            fields(json!({"title": "B"})),
            "delete-7",
        );
        assert_eq!(h.rx.try_recv().unwrap().severity, Severity::Warning);
    }

    #[test]
    fn first_snapshot_wins_within_a_lifecycle() {
        let mut h = harness(AuditPolicy::default());

        h.observer
            .notify_pre_mutation("post", 7, fields(json!({"title": "original"})));
        // A later hook point re-captures already-mutated state.
        h.observer
            .notify_pre_mutation("post", 7, fields(json!({"title": "mutated"})));
        h.observer.notify_post_mutation(
            "post",
            7,
            EventKind::PostUpdated,
            fields(json!({"title": "mutated"})),
            "save-7",
        );

        let draft = h.rx.try_recv().unwrap();
        assert_eq!(
            draft.details.get("title"),
            Some(&Change::scalar("original", "mutated"))
        );
    }

    #[test]
    fn actor_toggles_control_recorded_identity() {
        let policy = AuditPolicy {
            log_ip: false,
            ..AuditPolicy::default()
        };
        let bus = Arc::new(RecordBus::default());
        let mut rx = bus.subscribe();
        let mut observer =
            MutationObserver::new(policy, Arc::new(StaticResolver::new()), bus)
                .with_actor(2)
                .with_actor_ip("192.0.2.7");

        observer.notify_post_mutation(
            "user",
            2,
            EventKind::UserLoggedIn,
            fields(json!({"display_name": "bob"})),
            "login-2",
        );

        let draft = rx.try_recv().unwrap();
        assert_eq!(draft.actor_id, Some(2));
        // log_ip off: the validated address is still dropped at assembly.
        assert_eq!(draft.actor_ip, None);
    }

    #[test]
    fn unregistered_entity_kind_falls_back_to_nested_diff() {
        let mut h = harness(AuditPolicy::default());

        h.observer
            .notify_pre_mutation("widget", 5, fields(json!({"position": "sidebar"})));
        h.observer.notify_post_mutation(
            "widget",
            5,
            EventKind::OptionUpdated,
            fields(json!({"position": "footer"})),
            "widget-5",
        );

        let draft = h.rx.try_recv().unwrap();
        assert_matches!(draft.details.get("changes"), Some(Change::Note(_)));
    }
}

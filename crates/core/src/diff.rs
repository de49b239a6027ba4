//! Diff computation: scalar changes, set deltas, and nested map deltas.
//!
//! All functions are pure: they take old/new representations plus whatever
//! lookup seams they need, and return `Some(Change)` or `None`. A `None`
//! means no-op — equal values never produce a change entry.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::change::Change;
use crate::fields::{FieldKind, TrackedField};
use crate::format;
use crate::resolve::{resolve_or_fallback, DisplayNameResolver};
use crate::snapshot::FieldMap;
use crate::types::DbId;

/// Marker emitted by the nested diff for leaves it cannot compare
/// field-by-field.
pub const VALUE_CHANGED_MARKER: &str = "value changed";

// ---------------------------------------------------------------------------
// Scalar diff
// ---------------------------------------------------------------------------

/// Compare one tracked field across a mutation.
///
/// Structured values (arrays, objects) are compared structurally first, so
/// two serializations of the same payload never produce a false positive.
/// Everything else compares by rendered display string: if the rendered
/// forms are equal the change is a no-op, otherwise the emitted change
/// carries exactly those rendered forms.
pub fn diff_scalar(
    field: &TrackedField,
    old: Option<&Value>,
    new: Option<&Value>,
    resolver: &dyn DisplayNameResolver,
) -> Option<Change> {
    // Structural equality covers scalars and, crucially, serialized
    // payloads whose textual forms may differ only in key order.
    if old.unwrap_or(&Value::Null) == new.unwrap_or(&Value::Null) {
        return None;
    }

    let old_rendered = render_side(field, old, resolver);
    let new_rendered = render_side(field, new, resolver);

    if old_rendered == new_rendered {
        return None;
    }

    Some(Change::Scalar {
        old: old_rendered,
        new: new_rendered,
    })
}

/// Render one side of a scalar comparison, resolving reference fields to
/// display names.
fn render_side(
    field: &TrackedField,
    value: Option<&Value>,
    resolver: &dyn DisplayNameResolver,
) -> String {
    let value = value.unwrap_or(&Value::Null);

    match field.kind {
        FieldKind::Reference(target) => match as_db_id(value) {
            Some(id) => resolve_or_fallback(resolver, target, id),
            None => format::render_plain(value),
        },
        _ => format::render(&field.kind, value),
    }
}

/// Interpret a JSON value as a database id (number, or numeric string).
fn as_db_id(value: &Value) -> Option<DbId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Set diff
// ---------------------------------------------------------------------------

/// Compare a multi-valued relation across a mutation.
///
/// `added = new − old`, `removed = old − new`; both sides are resolved to
/// display names (fallback label for ids the resolver cannot answer for)
/// in ascending id order. Returns `None` when nothing was added or removed.
pub fn diff_set(
    old_ids: &[DbId],
    new_ids: &[DbId],
    target_type: &str,
    resolver: &dyn DisplayNameResolver,
) -> Option<Change> {
    let old_set: BTreeSet<DbId> = old_ids.iter().copied().collect();
    let new_set: BTreeSet<DbId> = new_ids.iter().copied().collect();

    let added: Vec<String> = new_set
        .difference(&old_set)
        .map(|id| resolve_or_fallback(resolver, target_type, *id))
        .collect();
    let removed: Vec<String> = old_set
        .difference(&new_set)
        .map(|id| resolve_or_fallback(resolver, target_type, *id))
        .collect();

    if added.is_empty() && removed.is_empty() {
        return None;
    }

    Some(Change::Set { added, removed })
}

/// Extract relation ids from a raw field value (a JSON array of numbers or
/// numeric strings). Missing or malformed values yield the empty set.
pub fn ids_from_value(value: Option<&Value>) -> Vec<DbId> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(as_db_id).collect(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Nested diff
// ---------------------------------------------------------------------------

/// Generic recursive diff of two structured maps.
///
/// Used for serialized values with no type-specific formatter (option
/// payloads and the like). The result is a free-form note object mapping
/// each differing key to:
///
/// - `{"old": ..., "new": ...}` for changed scalar leaves
/// - `{"new": ...}` / `{"old": ...}` for added / removed keys
/// - a nested object for maps on both sides
/// - the `"value changed"` marker when either side is non-scalar and
///   non-mapping (arrays, mixed shapes)
pub fn diff_nested(old: &FieldMap, new: &FieldMap) -> Option<Change> {
    let delta = diff_maps(old, new);
    if delta.is_empty() {
        return None;
    }
    Some(Change::Note(Value::Object(delta)))
}

fn diff_maps(old: &FieldMap, new: &FieldMap) -> FieldMap {
    let mut delta = FieldMap::new();

    let mut keys: Vec<&String> = old.keys().collect();
    for key in new.keys() {
        if !old.contains_key(key) {
            keys.push(key);
        }
    }

    for key in keys {
        match (old.get(key), new.get(key)) {
            (Some(o), Some(n)) => {
                if o == n {
                    continue;
                }
                delta.insert(key.clone(), leaf_delta(o, n));
            }
            (Some(o), None) => {
                let mut entry = FieldMap::new();
                entry.insert("old".to_string(), rendered_leaf(o));
                delta.insert(key.clone(), Value::Object(entry));
            }
            (None, Some(n)) => {
                let mut entry = FieldMap::new();
                entry.insert("new".to_string(), rendered_leaf(n));
                delta.insert(key.clone(), Value::Object(entry));
            }
            (None, None) => unreachable!("key came from one of the maps"),
        }
    }

    delta
}

/// Delta for a key present on both sides with unequal values.
fn leaf_delta(old: &Value, new: &Value) -> Value {
    match (old, new) {
        (Value::Object(o), Value::Object(n)) => Value::Object(diff_maps(o, n)),
        (o, n) if is_scalar(o) && is_scalar(n) => {
            let mut entry = FieldMap::new();
            entry.insert("old".to_string(), rendered_leaf(o));
            entry.insert("new".to_string(), rendered_leaf(n));
            Value::Object(entry)
        }
        _ => Value::String(VALUE_CHANGED_MARKER.to_string()),
    }
}

fn rendered_leaf(value: &Value) -> Value {
    if is_scalar(value) {
        Value::String(format::render_plain(value))
    } else {
        Value::String(VALUE_CHANGED_MARKER.to_string())
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

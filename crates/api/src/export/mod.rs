//! Export formatters: CSV, HTML, and the PDF rendering seam.
//!
//! Purely presentational — every formatter consumes already-filtered
//! records from the store and the structured details the diff engine
//! produced, and renders them without further policy decisions.

pub mod csv;
pub mod html;
pub mod pdf;

use papertrail_core::resolve::DisplayNameResolver;
use papertrail_core::types::DbId;

/// Resolve an actor id to the export `User` column value.
///
/// System-initiated records (no actor) render as an empty cell; ids the
/// resolver cannot answer for fall back to `User #<id>`.
pub(crate) fn actor_display(resolver: &dyn DisplayNameResolver, actor_id: Option<DbId>) -> String {
    match actor_id {
        Some(id) => papertrail_core::resolve::resolve_or_fallback(resolver, "user", id),
        None => String::new(),
    }
}

/// Flatten a stored details object to `key: value; key: value` form.
///
/// Change shapes render as `old -> new` (scalar), `added [..], removed [..]`
/// (set delta), or their plain text / compact JSON (notes). HTML markup is
/// stripped from the result.
pub(crate) fn flatten_details(details: &serde_json::Value) -> String {
    let entries = match details.as_object() {
        Some(map) => map,
        None => return papertrail_core::format::strip_html(&value_display(details)),
    };

    let flat = entries
        .iter()
        .map(|(key, value)| format!("{key}: {}", value_display(value)))
        .collect::<Vec<_>>()
        .join("; ");

    papertrail_core::format::strip_html(&flat)
}

/// Display form of one details value.
fn value_display(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            // Scalar change shape.
            if let (Some(Value::String(old)), Some(Value::String(new))) =
                (map.get("old"), map.get("new"))
            {
                if map.len() == 2 {
                    return format!("{old} -> {new}");
                }
            }

            // Set delta shape.
            let added = map.get("added").and_then(Value::as_array);
            let removed = map.get("removed").and_then(Value::as_array);
            if (added.is_some() || removed.is_some()) && map.len() <= 2 {
                let mut parts = Vec::new();
                if let Some(items) = added {
                    if !items.is_empty() {
                        parts.push(format!("added [{}]", join_strings(items)));
                    }
                }
                if let Some(items) = removed {
                    if !items.is_empty() {
                        parts.push(format!("removed [{}]", join_strings(items)));
                    }
                }
                if !parts.is_empty() {
                    return parts.join(", ");
                }
            }

            value.to_string()
        }
        other => other.to_string(),
    }
}

fn join_strings(items: &[serde_json::Value]) -> String {
    items
        .iter()
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

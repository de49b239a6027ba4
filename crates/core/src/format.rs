//! Type-aware value rendering for diff output.
//!
//! These rules are part of the engine's output contract and are relied on
//! by tests and by UI consumers of the details mapping:
//!
//! - booleans render as `Yes`/`No`
//! - null and empty strings render as `(empty)`
//! - long free text is truncated to a fixed prefix with a trailing `...`
//! - enumerated values map through a label table, falling back to the
//!   capitalized raw value
//! - dates normalize to `YYYY-MM-DD HH:MM:SS`

use std::sync::OnceLock;

use serde_json::Value;

use crate::fields::FieldKind;

/// Truncation prefix for body-like free text fields.
pub const LONG_TEXT_PREFIX: usize = 100;

/// Truncation prefix for short metadata text fields.
pub const SHORT_TEXT_PREFIX: usize = 50;

/// Rendering of null / empty-string values.
pub const EMPTY_PLACEHOLDER: &str = "(empty)";

/// Marker appended to truncated text.
pub const TRUNCATION_MARKER: &str = "...";

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a raw field value as a display string according to its kind.
///
/// `Reference` and `Relation` kinds are resolved by the diff engine (they
/// need a name resolver); if one reaches this function it degrades to the
/// plain scalar rendering of the raw id.
pub fn render(kind: &FieldKind, value: &Value) -> String {
    if is_empty_value(value) {
        return EMPTY_PLACEHOLDER.to_string();
    }

    match kind {
        FieldKind::Text => truncate(&scalar_text(value), SHORT_TEXT_PREFIX),
        FieldKind::LongText => truncate(&scalar_text(value), LONG_TEXT_PREFIX),
        FieldKind::Bool => render_bool(value),
        FieldKind::Date => render_date(value),
        FieldKind::Enumerated(table) => enumerated_label(table, &scalar_text(value)),
        // Scalar payloads read as text; structured ones as compact JSON.
        FieldKind::Serialized => scalar_text(value),
        FieldKind::Reference(_) | FieldKind::Relation(_) => render_plain(value),
    }
}

/// Render an arbitrary scalar value with no kind information.
///
/// Used by the nested diff, where leaf values carry no field descriptor.
pub fn render_plain(value: &Value) -> String {
    if is_empty_value(value) {
        return EMPTY_PLACEHOLDER.to_string();
    }
    match value {
        Value::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Extract the text form of a scalar value (strings unquoted, everything
/// else in its JSON text form).
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_bool(value: &Value) -> String {
    let truthy = match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().map(|v| v != 0).unwrap_or(false),
        Value::String(s) => matches!(s.as_str(), "1" | "true" | "yes" | "on"),
        _ => false,
    };
    let label = if truthy { "Yes" } else { "No" };
    label.to_string()
}

fn render_date(value: &Value) -> String {
    let raw = scalar_text(value);

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&raw) {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return format!("{} 00:00:00", d.format("%Y-%m-%d"));
    }
    // Unparseable date-ish values pass through unchanged.
    raw
}

/// Map an enumerated raw value through its label table, falling back to the
/// capitalized raw value when the table has no entry.
pub fn enumerated_label(table: &[(&str, &str)], raw: &str) -> String {
    table
        .iter()
        .find(|(key, _)| *key == raw)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| capitalize_raw(raw))
}

/// Capitalize a raw vocabulary value for display: underscores and dashes
/// become spaces, each word gets an uppercase first letter.
pub fn capitalize_raw(raw: &str) -> String {
    raw.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate `text` to a prefix of `max_chars` characters, appending the
/// truncation marker when anything was cut. Operates on characters, not
/// bytes, so multi-byte text never splits mid-codepoint.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars).collect();
    format!("{prefix}{TRUNCATION_MARKER}")
}

// ---------------------------------------------------------------------------
// HTML stripping
// ---------------------------------------------------------------------------

static HTML_TAG: OnceLock<regex::Regex> = OnceLock::new();

/// Remove HTML markup from a string, collapsing the tags to nothing.
///
/// Used by export formatters; details values may carry markup from the
/// host's rich-text fields.
pub fn strip_html(text: &str) -> String {
    let re = HTML_TAG.get_or_init(|| regex::Regex::new(r"<[^>]*>").expect("static pattern"));
    re.replace_all(text, "").into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Structured change model for audit record details.
//!
//! A [`Details`] map is what ends up in a record's `details` column: an
//! insertion-ordered mapping from change key (usually a field name) to a
//! [`Change`]. The three change shapes are a closed union so formatters can
//! handle them exhaustively instead of inspecting value types at runtime.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

/// A single structured delta for one field or relation.
///
/// Serialized untagged, so the JSON shapes are exactly:
///
/// - scalar change: `{"old": "A", "new": "B"}`
/// - set delta:     `{"added": ["X"], "removed": ["Y"]}` (empty sides omitted)
/// - free-form note: any other JSON value
///
/// A set delta with both sides empty is never constructed; diff functions
/// return `None` instead of an empty change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Change {
    /// Before/after pair, both rendered as display strings.
    Scalar { old: String, new: String },

    /// Added/removed display names for a multi-valued relation.
    Set {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        added: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        removed: Vec<String>,
    },

    /// Contextual metadata or links, not a before/after pair.
    Note(serde_json::Value),
}

impl Change {
    /// Build a scalar change from two rendered values.
    pub fn scalar(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self::Scalar {
            old: old.into(),
            new: new.into(),
        }
    }

    /// Build a free-form text note.
    pub fn note(text: impl Into<String>) -> Self {
        Self::Note(Value::String(text.into()))
    }

    /// Classify a raw JSON value into its change shape.
    ///
    /// Exactly `{"old": ..., "new": ...}` with string values is a scalar
    /// change; an object with only `added`/`removed` string arrays (at
    /// least one non-empty) is a set delta; everything else is a note.
    fn from_value(value: Value) -> Self {
        if let Value::Object(map) = &value {
            if map.len() == 2 {
                if let (Some(Value::String(old)), Some(Value::String(new))) =
                    (map.get("old"), map.get("new"))
                {
                    return Self::Scalar {
                        old: old.clone(),
                        new: new.clone(),
                    };
                }
            }

            if !map.is_empty() && map.keys().all(|k| k == "added" || k == "removed") {
                let added = string_items(map.get("added"));
                let removed = string_items(map.get("removed"));
                if let (Some(added), Some(removed)) = (added, removed) {
                    if !added.is_empty() || !removed.is_empty() {
                        return Self::Set { added, removed };
                    }
                }
            }
        }

        Self::Note(value)
    }
}

/// Read an optional array of strings; `None` input means the side was
/// omitted (empty), non-string items disqualify the shape.
fn string_items(value: Option<&Value>) -> Option<Vec<String>> {
    match value {
        None => Some(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(_) => None,
    }
}

impl<'de> Deserialize<'de> for Change {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Change::from_value(Value::deserialize(deserializer)?))
    }
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

/// Insertion-ordered mapping of change key to [`Change`].
///
/// Backed by a `Vec` so the order the mapper pushed entries in survives
/// serialization (a JSON object is emitted in insertion order). Duplicate
/// keys are not rejected; the last pushed entry wins on lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Details {
    entries: Vec<(String, Change)>,
}

impl Details {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry under `key`.
    pub fn push(&mut self, key: impl Into<String>, change: Change) {
        self.entries.push((key.into(), change));
    }

    /// Append a free-form text note under `key`.
    pub fn push_note(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.push((key.into(), Change::note(text)));
    }

    /// Look up the last entry pushed under `key`.
    pub fn get(&self, key: &str) -> Option<&Change> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, c)| c)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, Change)> {
        self.entries.iter()
    }
}

impl Serialize for Details {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, change) in &self.entries {
            map.serialize_entry(key, change)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Details {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DetailsVisitor;

        impl<'de> Visitor<'de> for DetailsVisitor {
            type Value = Details;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of change entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Details, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, change)) = access.next_entry::<String, Change>()? {
                    entries.push((key, change));
                }
                Ok(Details { entries })
            }
        }

        deserializer.deserialize_map(DetailsVisitor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

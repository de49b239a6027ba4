//! Resolution of entity ids to display names.
//!
//! Set deltas and reference fields store display names, not raw ids. The
//! host supplies the lookup through [`DisplayNameResolver`]; an id the
//! resolver cannot answer for degrades to the [`fallback_label`] instead of
//! failing the diff.

use std::collections::HashMap;

use crate::format::capitalize_raw;
use crate::types::DbId;

/// Host-supplied lookup from `(object_type, id)` to a display name.
pub trait DisplayNameResolver: Send + Sync {
    /// Return the display name for an entity, or `None` if unknown.
    fn display_name(&self, object_type: &str, id: DbId) -> Option<String>;
}

/// Fallback label for unresolvable ids: `"<Type> #<id>"`.
pub fn fallback_label(object_type: &str, id: DbId) -> String {
    format!("{} #{id}", capitalize_raw(object_type))
}

/// Resolve an id, substituting the fallback label when the resolver has no
/// answer.
pub fn resolve_or_fallback(
    resolver: &dyn DisplayNameResolver,
    object_type: &str,
    id: DbId,
) -> String {
    resolver
        .display_name(object_type, id)
        .unwrap_or_else(|| fallback_label(object_type, id))
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Resolver that knows nothing; every lookup falls back.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResolver;

impl DisplayNameResolver for NullResolver {
    fn display_name(&self, _object_type: &str, _id: DbId) -> Option<String> {
        None
    }
}

/// Fixed in-memory resolver, built from `(object_type, id) -> name` entries.
///
/// Useful for hosts with a small static vocabulary and for tests.
#[derive(Debug, Default)]
pub struct StaticResolver {
    names: HashMap<(String, DbId), String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object_type: &str, id: DbId, name: impl Into<String>) {
        self.names.insert((object_type.to_string(), id), name.into());
    }
}

impl DisplayNameResolver for StaticResolver {
    fn display_name(&self, object_type: &str, id: DbId) -> Option<String> {
        self.names.get(&(object_type.to_string(), id)).cloned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

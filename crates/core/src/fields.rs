//! Registry of tracked fields per entity kind.
//!
//! The diff engine only compares fields that are registered here; anything
//! else in a snapshot is ignored. Each field carries a [`FieldKind`] that
//! selects its formatting and comparison behaviour, replacing ad hoc
//! string-keyed formatter dispatch with a closed set of semantic kinds.

// ---------------------------------------------------------------------------
// Enumerated label tables
// ---------------------------------------------------------------------------

/// Human labels for content status values.
pub const STATUS_LABELS: &[(&str, &str)] = &[
    ("publish", "Published"),
    ("draft", "Draft"),
    ("pending", "Pending Review"),
    ("private", "Private"),
    ("future", "Scheduled"),
    ("trash", "Trashed"),
    ("inherit", "Inherited"),
];

/// Human labels for user role values.
pub const ROLE_LABELS: &[(&str, &str)] = &[
    ("administrator", "Administrator"),
    ("editor", "Editor"),
    ("author", "Author"),
    ("contributor", "Contributor"),
    ("subscriber", "Subscriber"),
];

/// Human labels for page template values.
pub const TEMPLATE_LABELS: &[(&str, &str)] = &[
    ("default", "Default Template"),
    ("full-width", "Full Width"),
    ("landing", "Landing Page"),
];

/// Status value that marks restricted visibility. An update transitioning a
/// content item to this status escalates the record to `warning`.
pub const RESTRICTED_STATUS: &str = "private";

// ---------------------------------------------------------------------------
// Field kinds
// ---------------------------------------------------------------------------

/// Semantic kind of a tracked field, selecting formatting and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Short free text, truncated to [`crate::format::SHORT_TEXT_PREFIX`].
    Text,
    /// Body-like free text, truncated to [`crate::format::LONG_TEXT_PREFIX`].
    LongText,
    /// Boolean-ish value, rendered `Yes`/`No`.
    Bool,
    /// Date or datetime, normalized to `YYYY-MM-DD HH:MM:SS`.
    Date,
    /// Closed vocabulary mapped through a label table, with
    /// capitalized-raw fallback for values the table does not know.
    Enumerated(&'static [(&'static str, &'static str)]),
    /// Foreign-key-like reference to a single entity of the given type,
    /// resolved to a display name.
    Reference(&'static str),
    /// Multi-valued relation to entities of the given type, diffed as a
    /// set delta of ids.
    Relation(&'static str),
    /// Serialized structured value (arrays, option payloads); compared
    /// structurally, never stringwise.
    Serialized,
}

// ---------------------------------------------------------------------------
// Tracked field descriptors
// ---------------------------------------------------------------------------

/// Describes one field of an entity kind that the engine diffs and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedField {
    /// Key in the snapshot/post-mutation field map, and the change key
    /// emitted into record details.
    pub name: &'static str,
    /// Human label (used by UI consumers of the data contract).
    pub label: &'static str,
    pub kind: FieldKind,
}

const POST_FIELDS: &[TrackedField] = &[
    TrackedField { name: "title", label: "Title", kind: FieldKind::Text },
    TrackedField { name: "content", label: "Content", kind: FieldKind::LongText },
    TrackedField { name: "excerpt", label: "Excerpt", kind: FieldKind::LongText },
    TrackedField { name: "status", label: "Status", kind: FieldKind::Enumerated(STATUS_LABELS) },
    TrackedField { name: "slug", label: "Slug", kind: FieldKind::Text },
    TrackedField { name: "author", label: "Author", kind: FieldKind::Reference("user") },
    TrackedField { name: "parent", label: "Parent", kind: FieldKind::Reference("post") },
    TrackedField { name: "template", label: "Template", kind: FieldKind::Enumerated(TEMPLATE_LABELS) },
    TrackedField { name: "comments_open", label: "Comments Open", kind: FieldKind::Bool },
    TrackedField { name: "published_at", label: "Published At", kind: FieldKind::Date },
    TrackedField { name: "categories", label: "Categories", kind: FieldKind::Relation("term") },
    TrackedField { name: "tags", label: "Tags", kind: FieldKind::Relation("term") },
];

const ATTACHMENT_FIELDS: &[TrackedField] = &[
    TrackedField { name: "title", label: "Title", kind: FieldKind::Text },
    TrackedField { name: "alt_text", label: "Alt Text", kind: FieldKind::Text },
    TrackedField { name: "caption", label: "Caption", kind: FieldKind::LongText },
    TrackedField { name: "file_path", label: "File Path", kind: FieldKind::Text },
];

const TERM_FIELDS: &[TrackedField] = &[
    TrackedField { name: "name", label: "Name", kind: FieldKind::Text },
    TrackedField { name: "slug", label: "Slug", kind: FieldKind::Text },
    TrackedField { name: "description", label: "Description", kind: FieldKind::LongText },
    TrackedField { name: "parent", label: "Parent", kind: FieldKind::Reference("term") },
];

const USER_FIELDS: &[TrackedField] = &[
    TrackedField { name: "display_name", label: "Display Name", kind: FieldKind::Text },
    TrackedField { name: "email", label: "Email", kind: FieldKind::Text },
    TrackedField { name: "url", label: "Website", kind: FieldKind::Text },
    TrackedField { name: "role", label: "Role", kind: FieldKind::Enumerated(ROLE_LABELS) },
    TrackedField { name: "roles", label: "Roles", kind: FieldKind::Relation("role") },
    TrackedField { name: "registered_at", label: "Registered At", kind: FieldKind::Date },
];

const OPTION_FIELDS: &[TrackedField] = &[
    TrackedField { name: "value", label: "Value", kind: FieldKind::Serialized },
    TrackedField { name: "autoload", label: "Autoload", kind: FieldKind::Bool },
];

const PLUGIN_FIELDS: &[TrackedField] = &[
    TrackedField { name: "name", label: "Name", kind: FieldKind::Text },
    TrackedField { name: "version", label: "Version", kind: FieldKind::Text },
    TrackedField { name: "active", label: "Active", kind: FieldKind::Bool },
];

const THEME_FIELDS: &[TrackedField] = &[
    TrackedField { name: "name", label: "Name", kind: FieldKind::Text },
    TrackedField { name: "version", label: "Version", kind: FieldKind::Text },
];

/// Return the tracked fields for an entity kind.
///
/// Unknown kinds return an empty slice; the mapper then falls back to a
/// generic nested diff of the raw field maps.
pub fn tracked_fields(entity_kind: &str) -> &'static [TrackedField] {
    match entity_kind {
        "post" => POST_FIELDS,
        "attachment" => ATTACHMENT_FIELDS,
        "term" => TERM_FIELDS,
        "user" => USER_FIELDS,
        "option" => OPTION_FIELDS,
        "plugin" => PLUGIN_FIELDS,
        "theme" => THEME_FIELDS,
        _ => &[],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

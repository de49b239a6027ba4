//! Typed taxonomy of auditable host events.
//!
//! The host's dynamic hook names are mapped onto this closed enum at the
//! ingestion boundary, so every downstream decision (object type, default
//! severity, whether a diff is required) is an exhaustive match instead of
//! string inspection.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::severity::Severity;

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// One auditable event kind, identified on the wire by its
/// [`as_str`](EventKind::as_str) action key (e.g. `post_updated`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    // Content lifecycle
    PostCreated,
    PostUpdated,
    PostTrashed,
    PostRestored,
    PostDeleted,
    AttachmentUploaded,
    AttachmentUpdated,
    AttachmentDeleted,

    // Taxonomy
    TermCreated,
    TermUpdated,
    TermDeleted,

    // Users and sessions
    UserRegistered,
    UserUpdated,
    UserDeleted,
    UserLoggedIn,
    UserLoggedOut,
    UserRoleChanged,
    UserPasswordChanged,

    // Settings
    OptionUpdated,

    // Plugin / theme lifecycle
    PluginActivated,
    PluginDeactivated,
    PluginDeleted,
    ThemeSwitched,
}

/// All event kinds, for iteration in registration tables and tests.
pub const ALL_EVENT_KINDS: &[EventKind] = &[
    EventKind::PostCreated,
    EventKind::PostUpdated,
    EventKind::PostTrashed,
    EventKind::PostRestored,
    EventKind::PostDeleted,
    EventKind::AttachmentUploaded,
    EventKind::AttachmentUpdated,
    EventKind::AttachmentDeleted,
    EventKind::TermCreated,
    EventKind::TermUpdated,
    EventKind::TermDeleted,
    EventKind::UserRegistered,
    EventKind::UserUpdated,
    EventKind::UserDeleted,
    EventKind::UserLoggedIn,
    EventKind::UserLoggedOut,
    EventKind::UserRoleChanged,
    EventKind::UserPasswordChanged,
    EventKind::OptionUpdated,
    EventKind::PluginActivated,
    EventKind::PluginDeactivated,
    EventKind::PluginDeleted,
    EventKind::ThemeSwitched,
];

impl EventKind {
    /// Action key stored in records and used for filtering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostCreated => "post_created",
            Self::PostUpdated => "post_updated",
            Self::PostTrashed => "post_trashed",
            Self::PostRestored => "post_restored",
            Self::PostDeleted => "post_deleted",
            Self::AttachmentUploaded => "attachment_uploaded",
            Self::AttachmentUpdated => "attachment_updated",
            Self::AttachmentDeleted => "attachment_deleted",
            Self::TermCreated => "term_created",
            Self::TermUpdated => "term_updated",
            Self::TermDeleted => "term_deleted",
            Self::UserRegistered => "user_registered",
            Self::UserUpdated => "user_updated",
            Self::UserDeleted => "user_deleted",
            Self::UserLoggedIn => "user_logged_in",
            Self::UserLoggedOut => "user_logged_out",
            Self::UserRoleChanged => "user_role_changed",
            Self::UserPasswordChanged => "user_password_changed",
            Self::OptionUpdated => "option_updated",
            Self::PluginActivated => "plugin_activated",
            Self::PluginDeactivated => "plugin_deactivated",
            Self::PluginDeleted => "plugin_deleted",
            Self::ThemeSwitched => "theme_switched",
        }
    }

    /// Parse an action key, returning an error for unknown kinds.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        ALL_EVENT_KINDS
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| CoreError::Validation(format!("Unknown event kind: '{s}'")))
    }

    /// Object type category of the event's target entity.
    pub fn object_type(&self) -> &'static str {
        match self {
            Self::PostCreated
            | Self::PostUpdated
            | Self::PostTrashed
            | Self::PostRestored
            | Self::PostDeleted => "post",
            Self::AttachmentUploaded | Self::AttachmentUpdated | Self::AttachmentDeleted => {
                "attachment"
            }
            Self::TermCreated | Self::TermUpdated | Self::TermDeleted => "term",
            Self::UserRegistered
            | Self::UserUpdated
            | Self::UserDeleted
            | Self::UserLoggedIn
            | Self::UserLoggedOut
            | Self::UserRoleChanged
            | Self::UserPasswordChanged => "user",
            Self::OptionUpdated => "option",
            Self::PluginActivated | Self::PluginDeactivated | Self::PluginDeleted => "plugin",
            Self::ThemeSwitched => "theme",
        }
    }

    /// Default severity, a pure function of the event kind.
    ///
    /// Destructive and security-relevant kinds start at `warning`; the
    /// only diff-dependent escalation (restricted-visibility updates) is
    /// applied by the mapper on top of this.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::PostTrashed
            | Self::PostDeleted
            | Self::AttachmentDeleted
            | Self::TermDeleted
            | Self::UserDeleted
            | Self::UserRoleChanged
            | Self::UserPasswordChanged
            | Self::PluginActivated
            | Self::PluginDeactivated
            | Self::PluginDeleted
            | Self::ThemeSwitched => Severity::Warning,
            _ => Severity::Info,
        }
    }

    /// Creation kinds diff their initial state against emptiness when no
    /// snapshot exists, so a fresh entity's values land in the record.
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            Self::PostCreated
                | Self::AttachmentUploaded
                | Self::TermCreated
                | Self::UserRegistered
        )
    }

    /// Update kinds only log when the diff found at least one change.
    /// Everything else (creation, deletion, sessions, lifecycle) logs
    /// unconditionally.
    pub fn requires_change(&self) -> bool {
        matches!(
            self,
            Self::PostUpdated
                | Self::AttachmentUpdated
                | Self::TermUpdated
                | Self::UserUpdated
                | Self::OptionUpdated
        )
    }

    /// Contextual note pushed into details for kinds that log without a
    /// before/after diff, so such records never carry an empty details map.
    pub fn summary_note(&self) -> Option<&'static str> {
        match self {
            Self::PostCreated => Some("Created"),
            Self::PostTrashed => Some("Moved to trash"),
            Self::PostRestored => Some("Restored from trash"),
            Self::PostDeleted => Some("Permanently deleted"),
            Self::AttachmentUploaded => Some("Uploaded"),
            Self::AttachmentDeleted => Some("Deleted"),
            Self::TermCreated => Some("Created"),
            Self::TermDeleted => Some("Deleted"),
            Self::UserRegistered => Some("Registered"),
            Self::UserDeleted => Some("Deleted"),
            Self::UserLoggedIn => Some("Logged in"),
            Self::UserLoggedOut => Some("Logged out"),
            Self::UserRoleChanged => Some("Role changed"),
            Self::UserPasswordChanged => Some("Password changed"),
            Self::PluginActivated => Some("Activated"),
            Self::PluginDeactivated => Some("Deactivated"),
            Self::PluginDeleted => Some("Deleted"),
            Self::ThemeSwitched => Some("Switched"),
            Self::PostUpdated
            | Self::AttachmentUpdated
            | Self::TermUpdated
            | Self::UserUpdated
            | Self::OptionUpdated => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_keys_round_trip() {
        for kind in ALL_EVENT_KINDS {
            assert_eq!(EventKind::from_str(kind.as_str()).unwrap(), *kind);
        }
    }

    #[test]
    fn action_keys_are_unique() {
        let mut keys: Vec<&str> = ALL_EVENT_KINDS.iter().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ALL_EVENT_KINDS.len());
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!(EventKind::from_str("post_vaporized").is_err());
        assert!(EventKind::from_str("").is_err());
    }

    #[test]
    fn destructive_kinds_default_to_warning() {
        assert_eq!(EventKind::PostDeleted.default_severity(), Severity::Warning);
        assert_eq!(EventKind::PostTrashed.default_severity(), Severity::Warning);
        assert_eq!(EventKind::UserRoleChanged.default_severity(), Severity::Warning);
        assert_eq!(
            EventKind::UserPasswordChanged.default_severity(),
            Severity::Warning
        );
        assert_eq!(EventKind::PluginActivated.default_severity(), Severity::Warning);
        assert_eq!(EventKind::ThemeSwitched.default_severity(), Severity::Warning);
    }

    #[test]
    fn routine_kinds_default_to_info() {
        assert_eq!(EventKind::PostCreated.default_severity(), Severity::Info);
        assert_eq!(EventKind::PostUpdated.default_severity(), Severity::Info);
        assert_eq!(EventKind::UserLoggedIn.default_severity(), Severity::Info);
        assert_eq!(EventKind::OptionUpdated.default_severity(), Severity::Info);
    }

    #[test]
    fn creation_kinds_are_disjoint_from_update_kinds() {
        assert!(EventKind::PostCreated.is_creation());
        assert!(EventKind::UserRegistered.is_creation());
        assert!(!EventKind::PostUpdated.is_creation());
        assert!(!EventKind::UserLoggedIn.is_creation());
        for kind in ALL_EVENT_KINDS {
            assert!(!(kind.is_creation() && kind.requires_change()), "{kind}");
        }
    }

    #[test]
    fn update_kinds_require_a_change() {
        assert!(EventKind::PostUpdated.requires_change());
        assert!(EventKind::OptionUpdated.requires_change());
        assert!(!EventKind::PostCreated.requires_change());
        assert!(!EventKind::UserLoggedIn.requires_change());
    }

    #[test]
    fn non_update_kinds_carry_a_summary_note() {
        for kind in ALL_EVENT_KINDS {
            if kind.requires_change() {
                assert!(kind.summary_note().is_none(), "{kind} should have no note");
            } else {
                assert!(kind.summary_note().is_some(), "{kind} should have a note");
            }
        }
    }

    #[test]
    fn object_types_match_their_family() {
        assert_eq!(EventKind::PostUpdated.object_type(), "post");
        assert_eq!(EventKind::TermDeleted.object_type(), "term");
        assert_eq!(EventKind::UserLoggedIn.object_type(), "user");
        assert_eq!(EventKind::OptionUpdated.object_type(), "option");
        assert_eq!(EventKind::PluginActivated.object_type(), "plugin");
        assert_eq!(EventKind::ThemeSwitched.object_type(), "theme");
    }
}

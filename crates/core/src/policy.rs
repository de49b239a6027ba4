//! Audit policy: severity gate, noisy-source suppression, retention math.

use chrono::Duration;
use serde::Serialize;

use crate::severity::Severity;
use crate::types::Timestamp;

/// Default retention period in days.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Default suppression patterns: the host's transient-cache option writes
/// are pure housekeeping noise.
pub const DEFAULT_SUPPRESSED_SOURCES: &[&str] = &["_transient_", "_site_transient_"];

// ---------------------------------------------------------------------------
// AuditPolicy
// ---------------------------------------------------------------------------

/// Write-time policy applied by the mapper before a record reaches the
/// store, plus the retention knobs used by the periodic sweep.
#[derive(Debug, Clone, Serialize)]
pub struct AuditPolicy {
    /// Minimum severity persisted; anything less severe is dropped.
    pub min_severity: Severity,
    /// Records older than this many days are deleted by the sweep.
    pub retention_days: i64,
    /// Whether the suppression list is applied at all.
    pub skip_suppressed_sources: bool,
    /// Substring patterns matched against a record's source key.
    pub suppressed_sources: Vec<String>,
    /// Whether the acting client IP is recorded.
    pub log_ip: bool,
    /// Whether the acting user id is recorded.
    pub log_actor_id: bool,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
            retention_days: DEFAULT_RETENTION_DAYS,
            skip_suppressed_sources: true,
            suppressed_sources: DEFAULT_SUPPRESSED_SOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            log_ip: true,
            log_actor_id: true,
        }
    }
}

impl AuditPolicy {
    /// Severity gate: true iff `severity` is at least as severe as the
    /// configured minimum.
    pub fn should_write(&self, severity: Severity) -> bool {
        severity.is_at_least(self.min_severity)
    }

    /// Noisy-source gate: true if the source key contains any suppression
    /// pattern as a substring (case-sensitive, first match wins). Always
    /// false when `skip_suppressed_sources` is off.
    pub fn should_suppress_source(&self, source_key: &str) -> bool {
        if !self.skip_suppressed_sources {
            return false;
        }
        self.suppressed_sources
            .iter()
            .any(|pattern| !pattern.is_empty() && source_key.contains(pattern.as_str()))
    }

    /// Deletion cutoff for a sweep running at `now`. Records strictly older
    /// than the cutoff are deleted; a record at exactly the cutoff is kept.
    pub fn retention_cutoff(&self, now: Timestamp) -> Timestamp {
        now - Duration::days(self.retention_days)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn default_policy_values() {
        let policy = AuditPolicy::default();
        assert_eq!(policy.min_severity, Severity::Info);
        assert_eq!(policy.retention_days, 30);
        assert!(policy.skip_suppressed_sources);
        assert!(policy.log_ip);
        assert!(policy.log_actor_id);
    }

    #[test]
    fn severity_gate_honors_threshold() {
        let policy = AuditPolicy::default();
        assert!(policy.should_write(Severity::Info));
        assert!(policy.should_write(Severity::Warning));
        assert!(policy.should_write(Severity::Emergency));
        assert!(!policy.should_write(Severity::Debug));
    }

    #[test]
    fn debug_records_persist_only_at_debug_threshold() {
        let mut policy = AuditPolicy::default();
        assert!(!policy.should_write(Severity::Debug));

        policy.min_severity = Severity::Debug;
        assert!(policy.should_write(Severity::Debug));
    }

    #[test]
    fn emergency_always_passes() {
        for min in crate::severity::ALL_SEVERITIES {
            let policy = AuditPolicy {
                min_severity: *min,
                ..AuditPolicy::default()
            };
            assert!(policy.should_write(Severity::Emergency));
        }
    }

    #[test]
    fn suppression_matches_substrings() {
        let policy = AuditPolicy::default();
        assert!(policy.should_suppress_source("_transient_feed_cache"));
        assert!(policy.should_suppress_source("_site_transient_update_check"));
        assert!(!policy.should_suppress_source("blogname"));
    }

    #[test]
    fn suppression_is_case_sensitive() {
        let policy = AuditPolicy::default();
        assert!(!policy.should_suppress_source("_TRANSIENT_feed"));
    }

    #[test]
    fn suppression_disabled_by_flag() {
        let policy = AuditPolicy {
            skip_suppressed_sources: false,
            ..AuditPolicy::default()
        };
        assert!(!policy.should_suppress_source("_transient_feed_cache"));
    }

    #[test]
    fn empty_pattern_never_matches() {
        let policy = AuditPolicy {
            suppressed_sources: vec![String::new()],
            ..AuditPolicy::default()
        };
        assert!(!policy.should_suppress_source("anything"));
    }

    #[test]
    fn retention_cutoff_subtracts_days() {
        let policy = AuditPolicy::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        let cutoff = policy.retention_cutoff(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
    }
}

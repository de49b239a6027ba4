//! Ordered severity taxonomy for audit records.
//!
//! Severities follow the syslog ordering, most severe first. The numeric
//! rank is what the write gate compares: rank 0 (`emergency`) is the most
//! severe, rank 7 (`debug`) the least.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Severity enum
// ---------------------------------------------------------------------------

/// Criticality classification of an audit record.
///
/// Declared most-severe-first; [`Severity::rank`] exposes the position for
/// gate comparisons ("at least as severe" means rank less than or equal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

/// All severities, most severe first. Rank equals the index in this slice.
pub const ALL_SEVERITIES: &[Severity] = &[
    Severity::Emergency,
    Severity::Alert,
    Severity::Critical,
    Severity::Error,
    Severity::Warning,
    Severity::Notice,
    Severity::Info,
    Severity::Debug,
];

impl Severity {
    /// Numeric rank: 0 = most severe (`emergency`), 7 = least (`debug`).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Emergency => 0,
            Self::Alert => 1,
            Self::Critical => 2,
            Self::Error => 3,
            Self::Warning => 4,
            Self::Notice => 5,
            Self::Info => 6,
            Self::Debug => 7,
        }
    }

    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Parse from a string, returning an error for unknown names.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "emergency" => Ok(Self::Emergency),
            "alert" => Ok(Self::Alert),
            "critical" => Ok(Self::Critical),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "notice" => Ok(Self::Notice),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            other => Err(CoreError::Validation(format!(
                "Unknown severity: '{other}'. Valid severities: {}",
                ALL_SEVERITIES
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// Whether `self` is at least as severe as `min`.
    ///
    /// This is the write gate of the severity policy: a record is persisted
    /// iff its severity passes this check against the configured minimum.
    pub fn is_at_least(&self, min: Severity) -> bool {
        self.rank() <= min.rank()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

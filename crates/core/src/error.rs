//! Domain error type shared across the workspace.

/// Domain-level errors produced by the core crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed validation (bad severity name, unknown event kind, ...).
    #[error("{0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

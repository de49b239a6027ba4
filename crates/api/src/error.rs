//! HTTP error mapping for the query/export surface.
//!
//! Only the interactive side of the engine surfaces errors to callers:
//! malformed filters, an unreachable store. Ingestion failures never pass
//! through here — the observer swallows them and reports via tracing.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use papertrail_core::error::CoreError;
use serde_json::json;

/// Error type returned by API handlers, rendered as `{error, code}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Domain-level failure from `papertrail_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The record store rejected or failed a query.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request carried unusable filter parameters.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Anything else that should read as a server-side fault.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// HTTP status, stable error code, and client-facing message.
    ///
    /// Server-side faults are logged here and answered with a sanitized
    /// message; the raw error goes to the log, never to the client.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            Self::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            Self::Core(CoreError::Internal(msg)) => {
                tracing::error!(error = %msg, "Internal core error");
                sanitized_internal()
            }
            Self::Database(sqlx::Error::RowNotFound) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            ),
            Self::Database(err) => {
                tracing::error!(error = %err, "Record store error");
                sanitized_internal()
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                sanitized_internal()
            }
        }
    }
}

fn sanitized_internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

//! Liveness / readiness handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// GET /health
///
/// Returns `200 {"status": "ok"}` when the database answers, `503`
/// otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match papertrail_db::health_check(&state.pool).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable"})),
            )
        }
    }
}

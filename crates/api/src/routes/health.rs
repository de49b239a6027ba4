//! Route definitions for the health check.

use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// Routes mounted at the application root.
///
/// ```text
/// GET /health -> health
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health::health))
}

//! Route definitions for the `/records` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::records;
use crate::state::AppState;

/// Routes mounted at `/records`.
///
/// Authentication/authorization is the embedding host's concern; these
/// routes expose the data contract only.
///
/// ```text
/// GET    /              -> list_records
/// DELETE /              -> clear_records
/// GET    /export.csv    -> export_csv
/// GET    /export.pdf    -> export_pdf
/// GET    /stats/actions -> action_stats
/// GET    /stats/actors  -> actor_stats
/// GET    /policy        -> get_policy
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(records::list_records).delete(records::clear_records),
        )
        .route("/export.csv", get(records::export_csv))
        .route("/export.pdf", get(records::export_pdf))
        .route("/stats/actions", get(records::action_stats))
        .route("/stats/actors", get(records::actor_stats))
        .route("/policy", get(records::get_policy))
}

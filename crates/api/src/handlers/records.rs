//! Handlers for audit record query, export, stats, and admin endpoints.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use papertrail_core::severity::Severity;
use papertrail_core::types::Timestamp;
use papertrail_db::models::record::{RecordPage, RecordQuery};
use papertrail_db::repositories::RecordRepo;

use crate::error::{AppError, AppResult};
use crate::export::pdf::ExportError;
use crate::export::{csv, html};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query parameter types
// ---------------------------------------------------------------------------

/// Query parameters for record queries and exports. All optional and
/// AND-combined; `search` fans out across object name, details, and action.
#[derive(Debug, Default, Deserialize)]
pub struct RecordQueryParams {
    pub severity: Option<String>,
    pub actor_id: Option<i64>,
    pub action: Option<String>,
    pub object_type: Option<String>,
    pub object_id: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the stats endpoints.
#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an optional ISO 8601 timestamp query parameter.
fn parse_timestamp(s: &Option<String>) -> AppResult<Option<Timestamp>> {
    match s {
        Some(v) => v
            .parse::<Timestamp>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid date: '{v}'"))),
        None => Ok(None),
    }
}

/// Validate raw query parameters into a typed store filter.
fn to_record_query(params: RecordQueryParams) -> AppResult<RecordQuery> {
    let severity = params
        .severity
        .as_deref()
        .map(Severity::from_str)
        .transpose()
        .map_err(AppError::Core)?;

    Ok(RecordQuery {
        severity,
        actor_id: params.actor_id,
        action: params.action,
        object_type: params.object_type,
        object_id: params.object_id,
        from: parse_timestamp(&params.from)?,
        to: parse_timestamp(&params.to)?,
        search: params.search,
        limit: params.limit,
        offset: params.offset,
    })
}

/// Build a file-download response.
fn attachment(content_type: &str, filename: &str, body: Vec<u8>) -> axum::response::Response {
    axum::response::Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(body))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Query records
// ---------------------------------------------------------------------------

/// GET /records
///
/// Query audit records with filters and pagination, newest first.
pub async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<RecordQueryParams>,
) -> AppResult<impl IntoResponse> {
    let query = to_record_query(params)?;

    let items = RecordRepo::query(&state.pool, &query).await?;
    let total = RecordRepo::count(&state.pool, &query).await?;

    Ok(Json(DataResponse {
        data: RecordPage { items, total },
    }))
}

// ---------------------------------------------------------------------------
// Export records
// ---------------------------------------------------------------------------

/// GET /records/export.csv
///
/// Export the full filtered record set as CSV (UTF-8 with BOM).
pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<RecordQueryParams>,
) -> AppResult<impl IntoResponse> {
    let query = to_record_query(params)?;
    let records = RecordRepo::export(&state.pool, &query).await?;

    let body = csv::render_csv(&records, state.resolver.as_ref());

    Ok(attachment(
        "text/csv; charset=utf-8",
        "audit-records.csv",
        body.into_bytes(),
    ))
}

/// GET /records/export.pdf
///
/// Export the full filtered record set as PDF. When no PDF renderer is
/// available the response degrades to an HTML attachment with identical
/// content; export never hard-fails on the renderer.
pub async fn export_pdf(
    State(state): State<AppState>,
    Query(params): Query<RecordQueryParams>,
) -> AppResult<impl IntoResponse> {
    let query = to_record_query(params)?;
    let records = RecordRepo::export(&state.pool, &query).await?;

    let document = html::render_html(&records, state.resolver.as_ref());

    match state.pdf_renderer.render(&document) {
        Ok(bytes) => Ok(attachment("application/pdf", "audit-records.pdf", bytes)),
        Err(ExportError::RendererUnavailable) => {
            tracing::warn!("PDF renderer unavailable, serving HTML fallback");
            Ok(attachment(
                "text/html; charset=utf-8",
                "audit-records.html",
                document.into_bytes(),
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "PDF rendering failed, serving HTML fallback");
            Ok(attachment(
                "text/html; charset=utf-8",
                "audit-records.html",
                document.into_bytes(),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// GET /records/stats/actions
///
/// Action frequency table, most frequent first.
pub async fn action_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> AppResult<impl IntoResponse> {
    let counts = RecordRepo::group_by_action(&state.pool, params.limit.unwrap_or(10)).await?;
    Ok(Json(DataResponse { data: counts }))
}

/// GET /records/stats/actors
///
/// Actor frequency table, most frequent first.
pub async fn actor_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> AppResult<impl IntoResponse> {
    let counts = RecordRepo::group_by_actor(&state.pool, params.limit.unwrap_or(10)).await?;
    Ok(Json(DataResponse { data: counts }))
}

// ---------------------------------------------------------------------------
// Policy & admin
// ---------------------------------------------------------------------------

/// GET /records/policy
///
/// The effective audit policy (severity threshold, retention, suppression).
pub async fn get_policy(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.config.audit.clone(),
    }))
}

/// DELETE /records
///
/// Irreversibly delete every audit record. Returns the deleted count.
pub async fn clear_records(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let deleted = RecordRepo::clear_all(&state.pool).await?;

    tracing::info!(deleted, "Audit records cleared");

    Ok(Json(DataResponse {
        data: serde_json::json!({ "deleted": deleted }),
    }))
}

use std::sync::Arc;

use papertrail_core::resolve::DisplayNameResolver;
use papertrail_events::RecordBus;

use crate::config::ServerConfig;
use crate::export::pdf::PdfRenderer;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: papertrail_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Record bus the ingestion side publishes to.
    pub bus: Arc<RecordBus>,
    /// Resolver for actor display names in exports.
    pub resolver: Arc<dyn DisplayNameResolver>,
    /// PDF renderer seam; the default implementation reports unavailable
    /// and exports degrade to the HTML fallback.
    pub pdf_renderer: Arc<dyn PdfRenderer>,
}

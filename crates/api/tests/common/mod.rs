//! Shared helpers for API integration tests.
//!
//! [`build_test_app`] constructs the router through the same
//! `build_app_router` the binary uses, so every test exercises the full
//! middleware stack (CORS, request id, tracing, timeout, panic recovery).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;

use papertrail_api::config::ServerConfig;
use papertrail_api::export::pdf::NoPdfRenderer;
use papertrail_api::router::build_app_router;
use papertrail_api::state::AppState;
use papertrail_core::policy::AuditPolicy;
use papertrail_core::resolve::NullResolver;
use papertrail_events::RecordBus;

/// Test `ServerConfig` mirroring the local-development defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        sweep_interval_secs: 3600,
        audit: AuditPolicy::default(),
    }
}

/// Build the application router over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        bus: Arc::new(RecordBus::default()),
        resolver: Arc::new(NullResolver),
        pdf_renderer: Arc::new(NoPdfRenderer),
    };

    build_app_router(state, &config)
}

/// Send a GET request directly to the router.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a DELETE request directly to the router.
pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as parsed JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not valid JSON")
}

/// Collect a response body as a UTF-8 string.
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body is not valid UTF-8")
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use papertrail_api::background;
use papertrail_api::config::ServerConfig;
use papertrail_api::export::pdf::NoPdfRenderer;
use papertrail_api::router::build_app_router;
use papertrail_api::state::AppState;
use papertrail_core::resolve::NullResolver;
use papertrail_events::{RecordBus, RecordWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "papertrail_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = papertrail_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database pool ready");

    papertrail_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    papertrail_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied");

    // --- Record bus ---
    let bus = Arc::new(RecordBus::default());
    tracing::info!("Record bus created");

    // Spawn the record writer (appends all published drafts to the store).
    let writer_handle = tokio::spawn(RecordWriter::run(pool.clone(), bus.subscribe()));

    // Spawn the retention sweep.
    let sweep_cancel = tokio_util::sync::CancellationToken::new();
    let sweep_handle = tokio::spawn(background::retention::run(
        pool.clone(),
        config.audit.clone(),
        Duration::from_secs(config.sweep_interval_secs),
        sweep_cancel.clone(),
    ));

    tracing::info!("Background services started (record writer, retention sweep)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        bus: Arc::clone(&bus),
        resolver: Arc::new(NullResolver),
        pdf_renderer: Arc::new(NoPdfRenderer),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Listener closed, draining background services");

    // Stop the retention sweep.
    sweep_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    tracing::info!("Retention sweep stopped");

    // Drop the bus sender to close the broadcast channel; this signals the
    // record writer to drain and shut down.
    drop(bus);
    let _ = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        writer_handle,
    )
    .await;
    tracing::info!("Record writer shut down");

    tracing::info!("Shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server shuts
/// down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

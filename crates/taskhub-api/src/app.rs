//! Application builder: wires state, router and middleware into an Axum app
//! and runs the server.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use taskhub_core::config::AppConfig;
use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_database::seed::{SeedReport, seed_defaults};
use taskhub_database::store::Stores;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Connect the configured stores, seed them if enabled, and build the
/// state.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    let stores = Stores::connect(&config.database).await?;
    let state = AppState::new(config, stores);
    if state.config.bootstrap.seed_on_startup {
        seed(&state).await?;
    }
    Ok(state)
}

/// Apply the bootstrap seed data, hashing the admin password with the
/// primary scheme.
pub async fn seed(state: &AppState) -> AppResult<SeedReport> {
    let hasher = state.password_hasher.clone();
    seed_defaults(&state.stores, &state.config.bootstrap, |password: &str| {
        hasher.hash_password(password)
    })
    .await
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the server until Ctrl-C.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    let address = config.server.bind_address();
    let state = build_state(config).await?;
    let realtime = state.realtime.clone();
    let app = build_app(state);

    let listener = TcpListener::bind(&address).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {address}"), e)
    })?;
    info!(address = %address, "TaskHub server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
            realtime.shutdown();
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    info!("TaskHub server stopped");
    Ok(())
}

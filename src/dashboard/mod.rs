//! Dashboard — Axum web server for the bot state API.
//!
//! Serves the resolved-state, trade-history, and upload endpoints.
//! CORS enabled so a separately hosted presentation layer can poll it.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

/// Run the dashboard web server until shutdown (Ctrl+C).
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Dashboard server starting on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind dashboard port")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await
        .context("Dashboard server error")?;

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
        ]);

    Router::new()
        .route("/api/state", get(routes::get_state))
        .route("/api/history", get(routes::get_history))
        .route("/api/upload", post(routes::upload_state))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

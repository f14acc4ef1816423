//! HTTP front end: the single-page UI plus a JSON endpoint.

pub mod handlers;
pub mod page;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::agent::Crew;

#[derive(Clone)]
pub struct AppState {
    pub crew: Arc<Crew>,
}

pub fn router(crew: Arc<Crew>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/run", post(handlers::run))
        .route("/health", get(handlers::health))
        .route("/api/research", post(handlers::research))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { crew })
}

pub async fn serve(crew: Arc<Crew>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", addr))?;

    tracing::info!("Serving research crew UI on http://{}", addr);

    axum::serve(listener, router(crew))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

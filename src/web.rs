use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use crate::ItineraryCoordinator;
use crate::api;
use crate::config::ServerConfig;

/// Largest accepted request body
const BODY_LIMIT_BYTES: usize = 64 * 1024;

pub fn app(coordinator: Arc<ItineraryCoordinator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(coordinator))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors)
}

/// Serve until `shutdown` resolves
pub async fn run(
    config: &ServerConfig,
    coordinator: Arc<ItineraryCoordinator>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app(coordinator))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Web server failed")
}

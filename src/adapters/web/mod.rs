//! Web server adapter.
//!
//! Axum router serving the human-facing stock pages, the JSON endpoint and
//! the rendered chart images.

mod error;
mod handlers;
mod metrics;
mod templates;

pub use error::{status_from_error, WebError};
pub use handlers::*;
pub use metrics::RequestMetrics;
pub use templates::*;

use axum::{middleware, routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::domain::error::StockviewError;
use crate::domain::series_service::SeriesService;

pub struct AppState {
    pub service: Arc<SeriesService>,
    pub images_dir: PathBuf,
    pub requests: RequestMetrics,
}

impl AppState {
    pub fn new(service: Arc<SeriesService>, images_dir: PathBuf) -> Self {
        Self {
            service,
            images_dir,
            requests: RequestMetrics::default(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let images = ServeDir::new(&state.images_dir);
    let state = Arc::new(state);
    Router::new()
        .route("/", get(handlers::index).post(handlers::search))
        .route("/stock/{symbol}", get(handlers::stock_page))
        .route("/api/stock/{symbol}", get(handlers::api_stock))
        .route("/health", get(handlers::health))
        .route("/metrics", get(metrics::prometheus))
        .nest_service("/static/images", images)
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            metrics::track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve(state: AppState, addr: &str) -> Result<(), StockviewError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("stockview listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("shutdown signal received, stopping");
}

//! moodscan-api library interface
//!
//! Exposes the router and state for integration testing

pub mod api;
pub mod config;
pub mod error;

pub use crate::config::ApiConfig;
pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved service configuration
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .merge(api::health_routes())
        .merge(api::buildinfo_routes())
        .merge(api::analyze_routes())
        .with_state(state)
        // Uploads are bounded by configuration, not axum's 2 MB default
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

//! Service root and health check endpoints

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Welcome response for the service root
#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    /// Service name ("moodscan-api")
    pub service: String,
    /// Where to look next
    pub docs: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("healthy")
    pub status: String,
    /// Service name ("moodscan-api")
    pub service: String,
}

/// GET /
///
/// Welcome endpoint so a bare request confirms the right service answered.
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        service: "moodscan-api".to_string(),
        docs: "/health".to_string(),
    })
}

/// GET /health
///
/// Health check endpoint for monitoring.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "moodscan-api".to_string(),
    })
}

/// Build welcome and health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
}

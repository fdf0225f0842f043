//! Build information endpoint
//!
//! Reports version and build metadata captured by build.rs

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Build information response
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
}

/// GET /version
///
/// Returns build identification information
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
    })
}

/// Build version routes
pub fn buildinfo_routes() -> Router<AppState> {
    Router::new().route("/version", get(get_build_info))
}

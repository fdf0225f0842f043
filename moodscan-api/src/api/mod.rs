//! HTTP API handlers for moodscan-api

pub mod analyze;
pub mod buildinfo;
pub mod health;

pub use analyze::analyze_routes;
pub use buildinfo::buildinfo_routes;
pub use health::health_routes;

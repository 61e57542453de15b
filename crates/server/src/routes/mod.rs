// crates/server/src/routes/mod.rs
//! API route handlers for the chat-analytics server.

pub mod export;
pub mod health;
pub mod metrics;
pub mod stats;
pub mod upload;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router with all routes under /api prefix.
///
/// Routes:
/// - GET    /api/health  - Health check
/// - POST   /api/upload  - Upload and analyze a conversations.json export
/// - GET    /api/stats   - Aggregates for the current upload
/// - DELETE /api/stats   - Forget the current upload
/// - GET    /api/charts  - Chart-ready views of the current upload
/// - GET    /api/export  - Daily or monthly activity as CSV or JSON
/// - GET    /api/metrics - Prometheus metrics
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", upload::router())
        .nest("/api", stats::router())
        .nest("/api", export::router())
        .nest("/api", metrics::router())
        .with_state(state)
}

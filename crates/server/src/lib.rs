// crates/server/src/lib.rs
//! chat-analytics server library.
//!
//! Axum HTTP server for uploading a ChatGPT export and reading back its
//! usage statistics, plus the offline `report` and `demo` commands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod metrics;
pub mod report;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::*;
pub use metrics::{init_metrics, render_metrics};
pub use routes::api_routes;
pub use state::{AppState, UploadedReport};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes under `/api`
/// - the built frontend for every other path, when `static_dir` is set
/// - the upload body limit from config
/// - CORS (allows any origin) and request tracing
pub fn create_app(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let body_limit = state.config.max_upload_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new().merge(api_routes(state));

    if let Some(dir) = static_dir {
        tracing::info!(static_dir = %dir.display(), "Serving frontend");
        // Client-side routes resolve to index.html.
        let index = ServeFile::new(dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(dir).fallback(index));
    }

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================

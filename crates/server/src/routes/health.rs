// crates/server/src/routes/health.rs
//! Liveness plus a short description of the loaded export.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::{AppState, UploadedReport};

/// The export currently held in memory.
#[derive(Debug, Serialize)]
pub struct LoadedExport {
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub conversations: i64,
    pub messages: i64,
}

impl From<&UploadedReport> for LoadedExport {
    fn from(report: &UploadedReport) -> Self {
        Self {
            filename: report.filename.clone(),
            uploaded_at: report.uploaded_at,
            conversations: report.data.total_conversations,
            messages: report.data.total_messages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub report_loaded: bool,
    pub report: Option<LoadedExport>,
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let report = state.current_report().await;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime_secs(),
        report_loaded: report.is_some(),
        report: report.as_deref().map(LoadedExport::from),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

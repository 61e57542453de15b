// crates/server/src/routes/stats.rs
//! Read and clear the current analysis.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chat_analytics_core::{ConversationData, DashboardCharts};

use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_loaded, RequestTimer};
use crate::state::AppState;

/// GET /api/stats - Aggregates for the current upload.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<ConversationData>> {
    let timer = RequestTimer::new("stats");
    let result = state
        .current_report()
        .await
        .map(|r| r.data.clone())
        .ok_or(ApiError::NoReport);
    timer.finish_result(&result);
    result.map(Json)
}

/// GET /api/charts - Chart-ready views of the current upload.
pub async fn get_charts(State(state): State<Arc<AppState>>) -> ApiResult<Json<DashboardCharts>> {
    let timer = RequestTimer::new("charts");
    let result = state
        .current_report()
        .await
        .map(|r| r.charts.clone())
        .ok_or(ApiError::NoReport);
    timer.finish_result(&result);
    result.map(Json)
}

/// DELETE /api/stats - Forget the current upload. Idempotent.
pub async fn clear_stats(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.clear_report().await {
        record_loaded(0, 0);
        tracing::info!("Report cleared");
    }
    StatusCode::NO_CONTENT
}

/// Create the stats routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(get_stats).delete(clear_stats))
        .route("/charts", get(get_charts))
}

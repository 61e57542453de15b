// crates/server/src/routes/metrics.rs
//! `GET /api/metrics`: the Prometheus scrape target.

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::metrics::render_metrics;
use crate::state::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// 503 until the recorder is installed (tests that skip `init_metrics`).
pub async fn scrape() -> Response {
    let Some(body) = render_metrics() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Metrics recorder not installed").into_response();
    };
    ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response()
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/metrics", get(scrape))
}

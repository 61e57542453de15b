// crates/server/src/routes/export.rs
//! Export endpoint for activity tables (CSV and JSON).

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chat_analytics_core::csv::{daily_stats_csv, monthly_stats_csv, EXPORT_FILENAME};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::metrics::RequestTimer;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ExportQuery {
    /// "csv" (default) or "json"
    pub format: Option<String>,
    /// "daily" (default) or "monthly"
    pub period: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Daily,
    Monthly,
}

impl ExportQuery {
    fn validate(&self) -> ApiResult<(ExportFormat, Period)> {
        let format = match self.format.as_deref().unwrap_or("csv") {
            "csv" => ExportFormat::Csv,
            "json" => ExportFormat::Json,
            other => {
                return Err(ApiError::BadRequest(format!(
                    "Invalid format '{}'. Valid options: csv, json",
                    other
                )))
            }
        };
        let period = match self.period.as_deref().unwrap_or("daily") {
            "daily" => Period::Daily,
            "monthly" => Period::Monthly,
            other => {
                return Err(ApiError::BadRequest(format!(
                    "Invalid period '{}'. Valid options: daily, monthly",
                    other
                )))
            }
        };
        Ok((format, period))
    }
}

/// GET /api/export - Export the current upload's activity table.
///
/// CSV responses are sent as a download named `chatgpt-analytics.csv`.
pub async fn export_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let timer = RequestTimer::new("export");
    let result = build_export(&state, &query).await;
    timer.finish_result(&result);
    result
}

async fn build_export(state: &AppState, query: &ExportQuery) -> ApiResult<Response> {
    let (format, period) = query.validate()?;
    let report = state.current_report().await.ok_or(ApiError::NoReport)?;
    let data = &report.data;

    let response = match (format, period) {
        (ExportFormat::Json, Period::Daily) => Json(&data.daily_stats).into_response(),
        (ExportFormat::Json, Period::Monthly) => Json(&data.monthly_stats).into_response(),
        (ExportFormat::Csv, period) => {
            let csv = match period {
                Period::Daily => daily_stats_csv(&data.daily_stats),
                Period::Monthly => monthly_stats_csv(&data.monthly_stats),
            };
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
                    ),
                ],
                csv,
            )
                .into_response()
        }
    };
    Ok(response)
}

/// Create the export routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/export", get(export_stats))
}

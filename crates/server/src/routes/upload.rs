// crates/server/src/routes/upload.rs
//! Upload endpoint: validate an export, analyze it, keep the result.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use chat_analytics_core::{ensure_json_filename, parse_export, ConversationData};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_loaded, record_upload_size, RequestTimer};
use crate::state::{AppState, UploadedReport};

/// Name assumed when the client does not send one.
const DEFAULT_FILENAME: &str = "conversations.json";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UploadQuery {
    /// Original file name; must end in `.json`.
    pub filename: Option<String>,
}

/// POST /api/upload?filename=conversations.json
///
/// The request body is the raw export. On success the analysis replaces any
/// previous upload and is returned.
pub async fn upload_export(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<Json<ConversationData>> {
    let timer = RequestTimer::new("upload");
    let result = process_upload(&state, query, body).await;
    timer.finish_result(&result);
    result.map(Json)
}

async fn process_upload(
    state: &AppState,
    query: UploadQuery,
    body: Bytes,
) -> ApiResult<ConversationData> {
    let filename = query
        .filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    ensure_json_filename(&filename)?;

    let size = body.len();
    record_upload_size(size);
    tracing::info!(filename = %filename, bytes = size, "Export received");

    // JSON decoding of a large export is CPU-bound.
    let conversations = tokio::task::spawn_blocking(move || parse_export(&body))
        .await
        .map_err(|e| ApiError::Internal(format!("parse task failed: {e}")))??;

    let data = chat_analytics_db::analyze(&conversations).await?;
    record_loaded(data.total_conversations, data.total_messages);

    let report = state.set_report(UploadedReport::new(filename, data)).await;
    tracing::info!(
        conversations = report.data.total_conversations,
        messages = report.data.total_messages,
        "Export loaded"
    );
    Ok(report.data.clone())
}

/// Create the upload routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/upload", post(upload_export))
}

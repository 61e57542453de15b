// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chat_analytics_core::ParseError;
use chat_analytics_db::DbError;
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No export has been uploaded")]
    NoReport,

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoReport => StatusCode::NOT_FOUND,
            ApiError::Parse(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Parse(ParseError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Parse(ParseError::PermissionDenied { .. }) => StatusCode::FORBIDDEN,
            ApiError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match &self {
            ApiError::NoReport => {
                tracing::warn!("Report requested before any upload");
                ErrorResponse::with_details(
                    "No data available",
                    "Upload a conversations.json export first",
                )
            }
            ApiError::Parse(parse_err) => {
                let error_msg = match parse_err {
                    ParseError::NotJsonFile { name } => {
                        tracing::warn!(filename = %name, "Rejected non-JSON upload");
                        "Please upload a JSON file"
                    }
                    ParseError::EmptyInput => {
                        tracing::warn!("Empty upload");
                        "Uploaded file is empty"
                    }
                    ParseError::InvalidJson { message } => {
                        tracing::warn!(message = %message, "Malformed JSON upload");
                        "Invalid JSON format"
                    }
                    ParseError::NotAnArray => {
                        tracing::warn!("Upload is not a conversations array");
                        "Invalid export format"
                    }
                    ParseError::InvalidConversation { index, message } => {
                        tracing::warn!(index = *index, message = %message, "Conversation failed validation");
                        "Invalid export format"
                    }
                    ParseError::NotFound { path } => {
                        tracing::error!(path = %path.display(), "File not found");
                        "File not found"
                    }
                    ParseError::PermissionDenied { path } => {
                        tracing::error!(path = %path.display(), "Permission denied");
                        "Permission denied"
                    }
                    ParseError::Io { path, source } => {
                        tracing::error!(path = %path.display(), error = %source, "IO error");
                        "IO error reading file"
                    }
                };
                ErrorResponse::with_details(error_msg, parse_err.to_string())
            }
            ApiError::Database(db_err) => {
                tracing::error!(error = %db_err, "Database error");
                ErrorResponse::with_details("Database error", db_err.to_string())
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                ErrorResponse::with_details("Bad request", msg.clone())
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "Internal server error");
                ErrorResponse::new("Internal server error")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

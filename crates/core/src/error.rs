// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or validating a chat export.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Export file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied reading file: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Please upload a JSON file (got {name})")]
    NotJsonFile { name: String },

    #[error("Export is empty")]
    EmptyInput,

    #[error("Invalid JSON format. Please ensure you uploaded a valid conversations.json file: {message}")]
    InvalidJson { message: String },

    #[error("File does not contain a valid conversations array")]
    NotAnArray,

    #[error("Conversation at index {index} does not match the export schema: {message}")]
    InvalidConversation { index: usize, message: String },
}

impl ParseError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// True when the error is caused by the content of the upload rather
    /// than by the environment (missing file, I/O failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotJsonFile { .. }
                | Self::EmptyInput
                | Self::InvalidJson { .. }
                | Self::NotAnArray
                | Self::InvalidConversation { .. }
        )
    }
}

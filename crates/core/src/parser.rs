// crates/core/src/parser.rs
//! Validation of an uploaded `conversations.json` export.
//!
//! The export is a single JSON array of conversation objects. Validation runs
//! in three steps, each with its own error: the payload must be JSON, the top
//! level must be an array, and every element must match the conversation
//! schema in [`crate::types`].

use crate::error::ParseError;
use crate::types::Conversation;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reject file names that do not end in `.json` (case-insensitive).
pub fn ensure_json_filename(name: &str) -> Result<(), ParseError> {
    if name.to_ascii_lowercase().ends_with(".json") {
        Ok(())
    } else {
        Err(ParseError::NotJsonFile {
            name: name.to_string(),
        })
    }
}

/// Validate the outer shape of an export and return its elements untouched.
///
/// Used where unknown export fields must survive (demo fixtures).
pub fn parse_export_values(bytes: &[u8]) -> Result<Vec<Value>, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseError::EmptyInput);
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| ParseError::InvalidJson {
        message: e.to_string(),
    })?;

    match value {
        Value::Array(items) => Ok(items),
        _ => Err(ParseError::NotAnArray),
    }
}

/// Parse and validate an export into typed conversations.
///
/// # Errors
/// - `ParseError::EmptyInput` for an empty or whitespace-only payload
/// - `ParseError::InvalidJson` if the payload is not JSON
/// - `ParseError::NotAnArray` if the top level is not an array
/// - `ParseError::InvalidConversation` for the first element that does not
///   match the conversation schema, including one without a `mapping` or
///   without any id
pub fn parse_export(bytes: &[u8]) -> Result<Vec<Conversation>, ParseError> {
    let items = parse_export_values(bytes)?;
    let conversations = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let conv = serde_json::from_value::<Conversation>(item).map_err(|e| {
                ParseError::InvalidConversation {
                    index,
                    message: e.to_string(),
                }
            })?;
            if conv.key().is_empty() {
                return Err(ParseError::InvalidConversation {
                    index,
                    message: "missing conversation id".to_string(),
                });
            }
            Ok(conv)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(conversations = conversations.len(), "Export validated");
    Ok(conversations)
}

/// Read raw export bytes from disk after checking the file extension.
pub async fn read_export_file(path: &Path) -> Result<Vec<u8>, ParseError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    ensure_json_filename(&name)?;

    tokio::fs::read(path)
        .await
        .map_err(|e| ParseError::io(path, e))
}

/// Read and validate an export file.
///
/// # Example
/// ```ignore
/// use std::path::Path;
/// use chat_analytics_core::parse_export_file;
///
/// let conversations = parse_export_file(Path::new("conversations.json")).await?;
/// println!("Parsed {} conversations", conversations.len());
/// ```
pub async fn parse_export_file(path: &Path) -> Result<Vec<Conversation>, ParseError> {
    let bytes = read_export_file(path).await?;
    parse_export(&bytes)
}

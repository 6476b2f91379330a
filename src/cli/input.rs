//! CLI input: transcript and note files.

use crate::error::ApiError;
use crate::workflow::{Message, Note};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

pub fn load_transcript(path: &Path) -> Result<Vec<Message>, ApiError> {
    load_array(path, "Invalid messages format")
}

/// Missing `path` means an empty note collection.
pub fn load_notes(path: Option<&Path>) -> Result<Vec<Note>, ApiError> {
    match path {
        Some(path) => load_array(path, "Invalid memos format"),
        None => Ok(Vec::new()),
    }
}

fn load_array<T: DeserializeOwned>(path: &Path, invalid: &str) -> Result<Vec<T>, ApiError> {
    let raw = std::fs::read_to_string(path)?;
    parse_array(&raw, invalid)
}

fn parse_array<T: DeserializeOwned>(raw: &str, invalid: &str) -> Result<Vec<T>, ApiError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ApiError::InvalidInput(format!("{}: {}", invalid, e)))?;
    if !value.is_array() {
        return Err(ApiError::InvalidInput(invalid.to_string()));
    }
    serde_json::from_value(value).map_err(|e| ApiError::InvalidInput(format!("{}: {}", invalid, e)))
}

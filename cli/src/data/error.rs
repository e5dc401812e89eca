//! Unified error type for data layer
//!
//! Covers reading and writing tables, column projection and loading the
//! status whitelist file.

use arrow::error::ArrowError;
use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding/encoding or record batch error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested output columns are absent from the table
    #[error("Missing columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// Create a missing columns error
    pub fn missing_columns(missing: Vec<String>) -> Self {
        Self::MissingColumns { missing }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

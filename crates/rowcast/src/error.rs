//! Error types for the rowcast library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rowcast operations.
///
/// Only structural input errors live here. Header validation failures and
/// per-row persistence failures are not errors; they are recorded on the
/// [`Report`](crate::Report).
#[derive(Debug, Error)]
pub enum ImportError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reading from an input stream.
    #[error("failed to read input: {0}")]
    Read(#[source] std::io::Error),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty input or no header row to resolve.
    #[error("empty data: {0}")]
    EmptyData(String),

    /// The configured source encoding label is not a known encoding.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for rowcast operations.
pub type Result<T> = std::result::Result<T, ImportError>;

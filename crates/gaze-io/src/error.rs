//! Error types for recording ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for recording ingestion.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while loading recording files.
#[derive(Debug, Error)]
pub enum IoError {
    /// A recording file was absent on disk.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The path the loader tried.
        path: PathBuf,
    },

    /// A required column is absent from a CSV header.
    #[error("missing column '{column}' in {file}")]
    MissingColumn {
        /// File whose header was searched.
        file: String,
        /// The column that was not found.
        column: String,
    },

    /// A file parsed but its content was not usable.
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Loader description of the problem.
        message: String,
    },

    /// Sample timestamps violate stream ordering.
    #[error(transparent)]
    Stream(#[from] gaze_types::StreamError),

    /// Read failure below the parsing layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cell failed to parse as `f64`.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// A cell failed to parse as an integer.
    #[error("integer parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// JSON metadata error.
    #[error("JSON metadata error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IoError {
    /// Build an [`IoError::InvalidContent`] from any message type.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Build an [`IoError::MissingColumn`] naming the file and column.
    #[must_use]
    pub fn missing_column(file: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            file: file.into(),
            column: column.into(),
        }
    }
}

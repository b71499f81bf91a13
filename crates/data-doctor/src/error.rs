//! Custom error types for the data quality pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Errors fall in
//! three groups:
//!
//! - input errors (unsupported format, unreadable source, malformed range),
//!   which fail fast and name the offending path or range;
//! - per-chunk errors, which the chunk orchestrator records inside the chunk's
//!   result instead of propagating;
//! - systemic errors (worker pool failures, cancellation), which abort the run.
//!
//! Errors are serializable so they can be handed to a frontend or written into
//! a JSON report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the data quality pipeline.
#[derive(Error, Debug)]
pub enum QualityError {
    /// The run was cancelled through a cancellation token.
    #[error("Processing cancelled")]
    Cancelled,

    /// The source file has an extension no reader handles.
    #[error("Unsupported file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// The source exists but could not be parsed.
    #[error("Failed to read '{}': {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },

    /// A row range with `start > end` was requested.
    #[error("Invalid row range [{start}, {end}) for '{}'", path.display())]
    InvalidRange {
        path: PathBuf,
        start: usize,
        end: usize,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool could not be created or stopped accepting work.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// A chunk processing function failed.
    #[error("Chunk {index} failed: {reason}")]
    ChunkFailed { index: usize, reason: String },

    /// Internal error (e.g., thread join failure).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<QualityError>,
    },
}

impl QualityError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        QualityError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::ReadFailed { .. } => "READ_FAILED",
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::WorkerPool(_) => "WORKER_POOL_ERROR",
            Self::ChunkFailed { .. } => "CHUNK_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::WithContext { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for QualityError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("QualityError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for data quality operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| QualityError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(QualityError::Cancelled.error_code(), "CANCELLED");
        assert_eq!(
            QualityError::InvalidConfig("chunk_size".to_string()).error_code(),
            "INVALID_CONFIG"
        );
        assert_eq!(
            QualityError::UnsupportedFormat {
                path: PathBuf::from("data.xlsx")
            }
            .error_code(),
            "UNSUPPORTED_FORMAT"
        );
    }

    #[test]
    fn test_messages_name_the_offending_source() {
        let err = QualityError::InvalidRange {
            path: PathBuf::from("big.csv"),
            start: 20,
            end: 10,
        };
        let message = err.to_string();
        assert!(message.contains("big.csv"));
        assert!(message.contains("[20, 10)"));
    }

    #[test]
    fn test_is_cancelled_through_context() {
        assert!(QualityError::Cancelled.is_cancelled());
        assert!(
            QualityError::Cancelled
                .with_context("while draining chunks")
                .is_cancelled()
        );
        assert!(!QualityError::Internal("x".to_string()).is_cancelled());
    }

    #[test]
    fn test_error_serialization() {
        let error = QualityError::ReadFailed {
            path: PathBuf::from("ages.csv"),
            reason: "bad quote".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("READ_FAILED"));
        assert!(json.contains("ages.csv"));
    }

    #[test]
    fn test_with_context() {
        let error = QualityError::Internal("boom".to_string()).with_context("During fixing");
        assert!(error.to_string().contains("During fixing"));
        assert_eq!(error.error_code(), "INTERNAL_ERROR");
    }
}

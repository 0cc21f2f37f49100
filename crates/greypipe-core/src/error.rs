//! Error types for the greypipe image processing pipeline.
//!
//! Per-image failures are [`PipelineError`]s. They ride along on the job that
//! hit them and only surface at the end of the pipeline, so every variant
//! carries the path of the image it belongs to.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for greypipe operations.
#[derive(Error, Debug)]
pub enum GreypipeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A single image failed (sequential runs stop at the first one)
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Summary of a concurrent run in which one or more images failed.
    /// Individual failures have already been reported per item.
    #[error("{failed} of {total} images failed to process")]
    AggregateFailure { failed: usize, total: usize },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-image processing errors. All of them are terminal for the image.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Open/create/read/write failure
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed or unreadable image payload
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Image format not supported for reading, or output extension not
    /// supported for writing
    #[error("Unsupported format for {path}: {format} (only .jpg/.jpeg/.png can be written)")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Encoder rejected the image
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Input path cannot be mapped to an output path
    #[error("Cannot derive output path for {path}: missing '{segment}' segment")]
    OutputPath { path: PathBuf, segment: String },

    /// Input path is not valid UTF-8, so no output path can be derived
    #[error("Cannot derive output path for {}: path is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),

    /// Blocking worker panicked or was cancelled while handling the image
    #[error("Worker for {stage} stage failed on {path}: {message}")]
    Worker {
        path: PathBuf,
        stage: &'static str,
        message: String,
    },
}

impl PipelineError {
    /// Wrap an I/O error, promoting `NotFound` to [`PipelineError::FileNotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            PipelineError::FileNotFound(path)
        } else {
            PipelineError::Io { path, source }
        }
    }
}

/// Convenience type alias for greypipe results.
pub type Result<T> = std::result::Result<T, GreypipeError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_becomes_file_not_found() {
        let err = PipelineError::io(
            "images/missing.jpg",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_io_other_kind_is_kept() {
        let err = PipelineError::io(
            "images/locked.jpg",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_aggregate_failure_message() {
        let err = GreypipeError::AggregateFailure {
            failed: 1,
            total: 3,
        };
        assert_eq!(err.to_string(), "1 of 3 images failed to process");
    }
}

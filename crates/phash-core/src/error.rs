//! Error types for the phash pipeline.
//!
//! Errors are organized by concern so callers can tell a corrupt input
//! (permanent, never retried) from a configuration mistake or an internal
//! invariant violation.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for phash operations.
#[derive(Error, Debug)]
pub enum PhashError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// A hash string could not be parsed
    #[error("Hash error: {0}")]
    Hash(#[from] ParseHashError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input bytes are not a recognized image encoding
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Frequency matrix is smaller than the low-frequency block
    #[error("Matrix of {rows}x{cols} is smaller than the required {required}x{required} block")]
    Dimension {
        rows: usize,
        cols: usize,
        required: usize,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

/// Errors from parsing the hexadecimal form of a perceptual hash.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseHashError {
    /// The string is not exactly 16 hex digits long
    #[error("expected 16 hex digits, got {0}")]
    InvalidLength(usize),

    /// The string contains a non-hex character
    #[error("invalid hex digit {digit:?} at position {position}")]
    InvalidDigit { digit: char, position: usize },
}

/// Convenience type alias for phash results.
pub type Result<T> = std::result::Result<T, PhashError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

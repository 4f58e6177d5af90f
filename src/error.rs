//! Error types for battery-monitor
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Main error type for a status submission
///
/// Both variants are recoverable: the submission is rejected and no
/// gauge is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    /// Request body could not be read from the connection
    #[error("{0}")]
    Read(String),

    /// Body is not a valid status record
    #[error("{0}")]
    Decode(#[from] DecodeError),
}

/// Errors while decoding a status record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Malformed JSON or a field of the wrong type
    #[error("{0}")]
    Json(String),

    /// `hostname` is present but empty
    #[error("hostname must not be empty")]
    EmptyHostname,

    /// `level` outside 0..=100
    #[error("level {0} out of range (0-100)")]
    LevelOutOfRange(i8),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

/// Errors while delivering to a pushgateway
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PushError {
    /// Delivery rejected by the client or the gateway
    #[error("push to {target} failed: {message}")]
    Delivery { target: String, message: String },

    /// Address does not form a valid push URL
    #[error("invalid pushgateway address {address:?}: {message}")]
    InvalidAddress { address: String, message: String },
}

/// Errors from the metric registry
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Registration or gathering failed
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// Exposition output was not valid UTF-8
    #[error("Invalid exposition output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

//! Error types for the rcpt-core library.
//!
//! Field extraction never fails: a field that cannot be located or parsed is
//! reported as absent. Errors only arise around the extraction path, when
//! configuration is loaded, validated or saved.

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration (de)serialization error.
    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;

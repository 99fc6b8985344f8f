//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
///
/// Dispatch itself never fails; these cover registration and loading.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Malformed path pattern.
    #[error("invalid path pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Method name that is not routable.
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// Route manifest or config could not be decoded.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Manifest or config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

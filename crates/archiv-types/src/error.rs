//! Error types for archiv-types

use thiserror::Error;

/// Errors that can occur in archiv-types
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed hex string
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// OID or name that does not denote a supported digest algorithm
    #[error("Unknown digest algorithm: {0}")]
    UnknownDigestAlgorithm(String),
}

/// Result type for archiv-types operations
pub type Result<T> = std::result::Result<T, Error>;

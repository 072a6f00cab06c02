//! Error types for archiv-crypto

use thiserror::Error;

/// Errors that can occur in cryptographic operations
#[derive(Error, Debug)]
pub enum Error {
    /// Signature algorithm OID (or key/curve combination) with no verifier
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Digest algorithm OID or name not in the digest table
    #[error("Unknown digest algorithm: {0}")]
    UnknownDigestAlgorithm(String),

    /// SubjectPublicKeyInfo that cannot be used for verification
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Reading the data to hash failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<archiv_types::Error> for Error {
    fn from(e: archiv_types::Error) -> Self {
        match e {
            archiv_types::Error::UnknownDigestAlgorithm(oid) => Error::UnknownDigestAlgorithm(oid),
            other => Error::InvalidKey(other.to_string()),
        }
    }
}

impl From<archiv_der::Error> for Error {
    fn from(e: archiv_der::Error) -> Self {
        Error::InvalidKey(format!("malformed SubjectPublicKeyInfo: {}", e))
    }
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for archiv-trust

use thiserror::Error;

/// Errors that can occur while loading trust material
///
/// Validating a chain never fails; it yields a [`archiv_types::TrustStatus`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PEM armour that does not decode
    #[error("PEM error: {0}")]
    Pem(String),

    /// Certificate that cannot serve as a trust anchor
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Certificate revocation list that does not parse
    #[error("Invalid CRL: {0}")]
    InvalidCrl(String),
}

/// Result type for trust operations
pub type Result<T> = std::result::Result<T, Error>;

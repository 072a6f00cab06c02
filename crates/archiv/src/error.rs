//! Error types for archiv

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in archiv operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest of an unpacked archive is not there
    #[error("Manifest not found: {}", .0.display())]
    MissingManifest(PathBuf),

    /// The content of an unpacked archive is not there
    #[error("Archive content not found: {}", .0.display())]
    MissingContent(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Types error: {0}")]
    Types(#[from] archiv_types::Error),

    #[error("DER error: {0}")]
    Der(#[from] archiv_der::Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] archiv_crypto::Error),

    #[error("Timestamp error: {0}")]
    Timestamp(#[from] archiv_tsp::Error),

    #[error("Trust store error: {0}")]
    Trust(#[from] archiv_trust::Error),

    #[error("Verification error: {0}")]
    Verification(#[from] archiv_verify::Error),
}

/// Result type for archiv operations
pub type Result<T> = std::result::Result<T, Error>;

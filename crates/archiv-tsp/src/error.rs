//! Error types for archiv-tsp

use thiserror::Error;

/// Errors that can occur in time-stamp operations
#[derive(Error, Debug)]
pub enum Error {
    /// Network failure or non-success HTTP status
    #[error("Transport error: {0}")]
    Transport(String),

    /// A field is missing or has the wrong type at its position
    #[error("Malformed timestamp response: {0}")]
    MalformedResponse(String),

    /// The response does not answer the request that was sent
    #[error("Timestamp response does not match request: {reason}")]
    ResponseMismatch { reason: String },

    /// No certificate matches the signer's serial number
    #[error("Signer certificate not found in timestamp response")]
    SignerNotFound,

    /// The token signature does not verify
    #[error("Timestamp signature is invalid")]
    InvalidSignature,

    /// DER decoding or encoding error
    #[error("DER error: {0}")]
    Der(#[from] archiv_der::Error),

    /// Algorithm or key error from the crypto provider
    #[error(transparent)]
    Crypto(#[from] archiv_crypto::Error),

    /// Hex field that does not decode
    #[error(transparent)]
    Types(#[from] archiv_types::Error),
}

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedResponse(msg.into())
    }

    pub(crate) fn mismatch(reason: impl Into<String>) -> Self {
        Error::ResponseMismatch {
            reason: reason.into(),
        }
    }
}

/// Result type for time-stamp operations
pub type Result<T> = std::result::Result<T, Error>;

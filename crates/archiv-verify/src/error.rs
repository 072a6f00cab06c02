//! Error types for archiv-verify

use thiserror::Error;

/// Errors that abort verification
///
/// An untrusted certificate chain is not among them; it is reported in
/// [`archiv_types::VerificationResult::certificate_trusted`].
#[derive(Error, Debug)]
pub enum Error {
    /// No certificate in the token matches the signer's serial number
    #[error("Signer certificate not found in manifest signature")]
    SignerNotFound,

    /// Unsupported or unknown algorithm, or an unusable key
    #[error(transparent)]
    Crypto(#[from] archiv_crypto::Error),

    /// Manifest JSON or hex field that does not decode
    #[error(transparent)]
    Types(#[from] archiv_types::Error),

    /// Any other failure while checking the token
    #[error("Timestamp token error: {0}")]
    Token(archiv_tsp::Error),

    /// `genTime` that is not a GeneralizedTime
    #[error("Invalid time: {0}")]
    InvalidTime(String),
}

impl From<archiv_tsp::Error> for Error {
    fn from(e: archiv_tsp::Error) -> Self {
        match e {
            archiv_tsp::Error::SignerNotFound => Error::SignerNotFound,
            archiv_tsp::Error::Crypto(e) => Error::Crypto(e),
            archiv_tsp::Error::Types(e) => Error::Types(e),
            other => Error::Token(other),
        }
    }
}

/// Result type for verification
pub type Result<T> = std::result::Result<T, Error>;

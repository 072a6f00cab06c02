//! Cryptographic collaborators for archiv
//!
//! - [`hash_stream`], [`hash_bytes`] and [`hash_file`] for SHA-1/256/384/512
//! - [`SignatureVerifier`] and its aws-lc-rs implementation [`AwsLcVerifier`]
//! - [`generate_nonce`] for time-stamp requests

pub mod error;
pub mod hash;
pub mod nonce;
pub mod verification;

pub use error::{Error, Result};
pub use hash::{hash_bytes, hash_file, hash_stream, Hasher};
pub use nonce::{generate_nonce, random_bytes, DEFAULT_NONCE_LEN};
pub use verification::{
    parse_subject_public_key_info, AwsLcVerifier, PublicKeyInfo, SignatureFamily,
    SignatureVerifier, VerificationRequest,
};

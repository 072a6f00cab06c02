//! Core types for timestamped web archives
//!
//! This crate holds the data model shared by the rest of the workspace: the
//! projected RFC 3161 response, the persisted archive manifest, the
//! verification result, and the digest-algorithm table.

pub mod encoding;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod timestamp;

pub use encoding::Hex;
pub use error::{Error, Result};
pub use hash::DigestAlgorithm;
pub use manifest::{FileEntry, Manifest, TrustStatus, VerificationResult};
pub use timestamp::{
    Accuracy, Certificate, MessageImprint, Name, SignerInfo, Status, TimeStampResponse, TstInfo,
    Validity, STATUS_GRANTED, STATUS_GRANTED_WITH_MODS,
};

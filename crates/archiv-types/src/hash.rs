//! Digest algorithms and their object identifiers

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Digest algorithms usable in a message imprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-1, accepted for verifying old archives
    Sha1,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub const SHA1_OID: &'static str = "1.3.14.3.2.26";
    pub const SHA256_OID: &'static str = "2.16.840.1.101.3.4.2.1";
    pub const SHA384_OID: &'static str = "2.16.840.1.101.3.4.2.2";
    pub const SHA512_OID: &'static str = "2.16.840.1.101.3.4.2.3";

    /// Every supported algorithm
    pub const ALL: [DigestAlgorithm; 4] = [
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
    ];

    pub fn oid(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => Self::SHA1_OID,
            DigestAlgorithm::Sha256 => Self::SHA256_OID,
            DigestAlgorithm::Sha384 => Self::SHA384_OID,
            DigestAlgorithm::Sha512 => Self::SHA512_OID,
        }
    }

    /// Look up an algorithm by its dotted OID
    pub fn from_oid(oid: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.oid() == oid)
            .ok_or_else(|| Error::UnknownDigestAlgorithm(oid.to_string()))
    }

    /// Display name, e.g. `SHA-256`
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Digest size in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    /// Accepts `sha256`, `SHA-256`, `sha-256` and friends
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_ascii_lowercase().replace('-', "");
        match normalized.as_str() {
            "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha384" => Ok(DigestAlgorithm::Sha384),
            "sha512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(Error::UnknownDigestAlgorithm(s.to_string())),
        }
    }
}

//! Archive manifest and verification result

use crate::encoding::Hex;
use crate::error::Result;
use crate::timestamp::TimeStampResponse;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// One archived resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path of the resource inside `content.zip`
    pub file: String,
    /// URL the resource was fetched from
    pub url: String,
    pub hash: Hex,
    /// TLS server certificate the resource was fetched under, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
}

/// The persisted description of an archive
///
/// Written once when the archive is created and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// URL of the archived page
    pub url: String,
    pub files: Vec<FileEntry>,
    /// Time-stamp over the hash of `content.zip`
    pub signature: TimeStampResponse,
}

impl Manifest {
    pub fn new(url: impl Into<String>, files: Vec<FileEntry>, signature: TimeStampResponse) -> Self {
        Self {
            url: url.into(),
            files,
            signature,
        }
    }

    /// Pretty-printed JSON, two-space indent
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Outcome of validating the signer certificate chain
///
/// Serialized as `true`, `false`, `"revoked"` or `"expired"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustStatus {
    Trusted,
    Revoked,
    Expired,
    Untrusted,
}

impl TrustStatus {
    pub fn is_trusted(&self) -> bool {
        matches!(self, TrustStatus::Trusted)
    }
}

impl std::fmt::Display for TrustStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrustStatus::Trusted => "trusted",
            TrustStatus::Revoked => "revoked",
            TrustStatus::Expired => "expired",
            TrustStatus::Untrusted => "untrusted",
        };
        f.write_str(s)
    }
}

impl Serialize for TrustStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TrustStatus::Trusted => serializer.serialize_bool(true),
            TrustStatus::Untrusted => serializer.serialize_bool(false),
            TrustStatus::Revoked => serializer.serialize_str("revoked"),
            TrustStatus::Expired => serializer.serialize_str("expired"),
        }
    }
}

impl<'de> Deserialize<'de> for TrustStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TrustStatusVisitor;

        impl Visitor<'_> for TrustStatusVisitor {
            type Value = TrustStatus;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a boolean, \"revoked\" or \"expired\"")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<TrustStatus, E> {
                Ok(if v {
                    TrustStatus::Trusted
                } else {
                    TrustStatus::Untrusted
                })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<TrustStatus, E> {
                match v {
                    "revoked" => Ok(TrustStatus::Revoked),
                    "expired" => Ok(TrustStatus::Expired),
                    other => Err(E::unknown_variant(other, &["revoked", "expired"])),
                }
            }
        }

        deserializer.deserialize_any(TrustStatusVisitor)
    }
}

/// Result of verifying a manifest against archived content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub hashes_match: bool,
    pub certificate_trusted: TrustStatus,
    pub signature_valid: bool,
    /// `genTime` of the token, verbatim
    pub time: String,
}

impl VerificationResult {
    /// All three checks passed
    pub fn is_valid(&self) -> bool {
        self.hashes_match && self.certificate_trusted.is_trusted() && self.signature_valid
    }
}

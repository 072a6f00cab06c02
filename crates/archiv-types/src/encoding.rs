//! Hex-encoded byte strings
//!
//! Hashes, serial numbers, signatures and raw DER blobs are carried as
//! lowercase hex in the persisted manifest.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Hex-encoded data
///
/// Wraps a lowercase hex string. Construction from a string does not validate;
/// use [`Hex::decode`] to get the bytes back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Hex(String);

impl Hex {
    /// Wrap an existing hex string, normalizing it to lowercase
    pub fn new(s: impl Into<String>) -> Self {
        Hex(s.into().to_ascii_lowercase())
    }

    /// Hex-encode raw bytes
    pub fn encode(bytes: &[u8]) -> Self {
        Hex(hex::encode(bytes))
    }

    /// Decode the hex string to bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        hex::decode(&self.0).map_err(|e| Error::InvalidEncoding(format!("invalid hex: {}", e)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare as unsigned big-endian integers, ignoring leading zero octets.
    ///
    /// INTEGER fields such as the nonce may carry a 0x00 sign octet on one side
    /// of the exchange and not on the other.
    pub fn eq_unsigned(&self, other: &Hex) -> bool {
        fn significant(s: &str) -> &str {
            let mut rest = s;
            while rest.len() >= 2 && rest.starts_with("00") {
                rest = &rest[2..];
            }
            rest
        }
        significant(&self.0).eq_ignore_ascii_case(significant(&other.0))
    }
}

impl From<String> for Hex {
    fn from(s: String) -> Self {
        Hex::new(s)
    }
}

impl From<Hex> for String {
    fn from(hex: Hex) -> Self {
        hex.0
    }
}

impl From<&[u8]> for Hex {
    fn from(bytes: &[u8]) -> Self {
        Hex::encode(bytes)
    }
}

impl AsRef<str> for Hex {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Hex {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for Hex {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

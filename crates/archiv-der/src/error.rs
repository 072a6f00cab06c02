//! Error types for archiv-der

use thiserror::Error;

/// Errors raised while decoding or encoding DER
///
/// Decoding errors are fatal: no partial tree is ever returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The buffer ended before the element did
    #[error("truncated DER input at offset {offset}")]
    Truncated { offset: usize },

    /// The identifier octet is not part of the supported DER subset
    #[error("unsupported DER tag 0x{0:02x}")]
    UnsupportedTag(u8),

    /// Indefinite-length form (BER only)
    #[error("indefinite length at offset {offset} is not valid DER")]
    IndefiniteLength { offset: usize },

    /// Long-form length wider than a u32
    #[error("length at offset {offset} uses {bytes} octets")]
    LengthOverflow { offset: usize, bytes: usize },

    /// BOOLEAN whose content is not exactly one octet
    #[error("BOOLEAN at offset {offset} has length {length}")]
    InvalidBoolean { offset: usize, length: usize },

    /// NULL with content
    #[error("NULL at offset {offset} has length {length}")]
    InvalidNull { offset: usize, length: usize },

    /// BIT STRING without the unused-bits octet
    #[error("BIT STRING at offset {offset} is empty")]
    EmptyBitString { offset: usize },

    /// Malformed object identifier (empty, truncated arc, or arc overflow)
    #[error("invalid object identifier: {0}")]
    InvalidOid(String),

    /// A character outside the one-octet range of a PrintableString,
    /// IA5String or time type
    #[error("cannot encode {0:?} in a single-octet string type")]
    UnencodableString(String),

    /// Nesting deeper than the decoder accepts
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    /// Bytes left over after the top-level element
    #[error("{remaining} trailing bytes after top-level element")]
    TrailingData { remaining: usize },
}

/// Result type for DER operations
pub type Result<T> = std::result::Result<T, Error>;

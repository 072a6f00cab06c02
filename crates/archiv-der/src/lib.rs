//! DER codec for the Time-Stamp Protocol
//!
//! This crate decodes the subset of ASN.1 DER that RFC 3161 responses and the
//! CMS `SignedData` inside them use, and encodes the handful of types needed to
//! build a `TimeStampReq`.
//!
//! Decoding produces an immutable tree of [`Node`]s that borrows from the
//! input buffer. Every node keeps its original encoded bytes (header included),
//! because CMS signatures are computed over the original encoding of
//! substructures such as `signedAttrs`, never over a re-encoding.
//!
//! BER constructs (indefinite lengths, high tag numbers) are rejected.
//!
//! # Example
//!
//! ```
//! use archiv_der::{decode, Tag, Value};
//!
//! let node = decode(&[0x30, 0x06, 0x02, 0x01, 0x05, 0x02, 0x01, 0x08], 0).unwrap();
//! assert_eq!(node.tag, Tag::Sequence);
//! assert_eq!(node.size, 8);
//! assert_eq!(node.child(1).and_then(|n| n.as_integer()), Some(8));
//! ```

pub mod decode;
pub mod encode;
pub mod error;
pub mod node;

pub use decode::{
    decode, decode_exact, decode_integer, decode_length, decode_oid, decode_string, Length,
};
pub use encode::{encode, encode_oid, Element};
pub use error::{Error, Result};
pub use node::{Node, Tag, Value};

//! Recursive-descent DER decoder

use crate::error::{Error, Result};
use crate::node::{Node, Tag, Value};

/// Maximum nesting the decoder follows. TSP responses nest about a dozen levels.
pub const MAX_DEPTH: usize = 64;

/// A decoded length field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    /// Number of content octets
    pub value: usize,
    /// Length octets following the first length octet (0 for short form)
    pub additional_bytes: usize,
}

/// Decode the length field of the element whose tag octet is at `position`.
///
/// Short form: bit 7 clear, the octet is the length. Long form: the low seven
/// bits count the big-endian length octets that follow.
pub fn decode_length(data: &[u8], position: usize) -> Result<Length> {
    let first = *data
        .get(position + 1)
        .ok_or(Error::Truncated { offset: position + 1 })?;

    if first & 0x80 == 0 {
        return Ok(Length {
            value: first as usize,
            additional_bytes: 0,
        });
    }

    let additional_bytes = (first & 0x7f) as usize;
    if additional_bytes == 0 {
        return Err(Error::IndefiniteLength { offset: position });
    }
    if additional_bytes > 4 {
        return Err(Error::LengthOverflow {
            offset: position,
            bytes: additional_bytes,
        });
    }

    let mut value = 0usize;
    for i in 0..additional_bytes {
        let offset = position + 2 + i;
        let byte = *data.get(offset).ok_or(Error::Truncated { offset })? as usize;

        if i == additional_bytes - 1 {
            // OR the last octet in unshifted; some generators emit lengths
            // that only decode this way.
            value |= byte;
        } else {
            value |= byte << ((additional_bytes - 1 - i) * 8);
        }
    }

    Ok(Length {
        value,
        additional_bytes,
    })
}

/// Decode one element starting at `offset`.
///
/// Bytes after the element are ignored; use [`decode_exact`] when the buffer
/// must hold exactly one element.
pub fn decode(data: &[u8], offset: usize) -> Result<Node<'_>> {
    decode_at(data, offset, 0)
}

/// Decode a buffer that holds exactly one element
pub fn decode_exact(data: &[u8]) -> Result<Node<'_>> {
    let node = decode_at(data, 0, 0)?;
    if node.size != data.len() {
        return Err(Error::TrailingData {
            remaining: data.len() - node.size,
        });
    }
    Ok(node)
}

fn decode_at(data: &[u8], offset: usize, depth: usize) -> Result<Node<'_>> {
    let tag_byte = *data.get(offset).ok_or(Error::Truncated { offset })?;
    let tag = Tag::from_byte(tag_byte).ok_or(Error::UnsupportedTag(tag_byte))?;

    let length = decode_length(data, offset)?;
    let header_len = 2 + length.additional_bytes;
    let size = header_len + length.value;
    let end = offset + size;
    if end > data.len() {
        return Err(Error::Truncated { offset: data.len() });
    }

    let raw = &data[offset..end];
    let content = &raw[header_len..];

    let value = match tag {
        Tag::Sequence | Tag::Set | Tag::ContextSpecific(_) => {
            if depth >= MAX_DEPTH {
                return Err(Error::TooDeep(MAX_DEPTH));
            }

            // Children are decoded against the parent's extent so that none
            // can run past it.
            let bounded = &data[..end];
            let mut children = Vec::new();
            let mut consumed = 0;
            while consumed < length.value {
                let child = decode_at(bounded, offset + header_len + consumed, depth + 1)?;
                consumed += child.size;
                children.push(child);
            }
            Value::Children(children)
        }
        Tag::Integer => Value::Integer(decode_integer(content)),
        Tag::BitString => {
            if content.is_empty() {
                return Err(Error::EmptyBitString { offset });
            }
            Value::Bytes(&content[1..])
        }
        Tag::OctetString | Tag::Implicit(_) => Value::Bytes(content),
        Tag::ObjectIdentifier => Value::Oid(decode_oid(content)?),
        Tag::Utf8String
        | Tag::PrintableString
        | Tag::Ia5String
        | Tag::UtcTime
        | Tag::GeneralizedTime => Value::String(decode_string(content)),
        Tag::Null => {
            if length.value != 0 {
                return Err(Error::InvalidNull {
                    offset,
                    length: length.value,
                });
            }
            Value::Null
        }
        Tag::Boolean => {
            if length.value != 1 {
                return Err(Error::InvalidBoolean {
                    offset,
                    length: length.value,
                });
            }
            Value::Boolean(content[0] != 0)
        }
    };

    Ok(Node {
        tag,
        size,
        header_len,
        value,
        raw,
    })
}

/// Decode the content octets of an OBJECT IDENTIFIER into dotted form.
///
/// The first subidentifier packs the first two arcs as `40 * a + b`; every
/// subidentifier is base-128 with bit 7 marking continuation.
pub fn decode_oid(content: &[u8]) -> Result<String> {
    if content.is_empty() {
        return Err(Error::InvalidOid("empty".to_string()));
    }

    let mut arcs: Vec<u64> = Vec::new();
    let mut value: u64 = 0;
    let mut in_progress = false;

    for &byte in content {
        if value > (u64::MAX >> 7) {
            return Err(Error::InvalidOid("arc exceeds 64 bits".to_string()));
        }
        value = (value << 7) | u64::from(byte & 0x7f);
        in_progress = byte & 0x80 != 0;

        if !in_progress {
            if arcs.is_empty() {
                let (first, second) = if value < 80 {
                    (value / 40, value % 40)
                } else {
                    (2, value - 80)
                };
                arcs.push(first);
                arcs.push(second);
            } else {
                arcs.push(value);
            }
            value = 0;
        }
    }

    if in_progress {
        return Err(Error::InvalidOid("truncated subidentifier".to_string()));
    }

    Ok(arcs
        .iter()
        .map(|arc| arc.to_string())
        .collect::<Vec<_>>()
        .join("."))
}

/// Big-endian accumulation of INTEGER content octets.
///
/// No sign extension is performed; values wider than 64 bits keep their low
/// 64 bits.
pub fn decode_integer(content: &[u8]) -> u64 {
    content
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

/// Decode string content octets, one character per octet (Latin-1)
pub fn decode_string(content: &[u8]) -> String {
    content.iter().map(|&byte| byte as char).collect()
}

//! DER encoder for building requests
//!
//! Only definite, minimal-length encodings are produced.

use crate::error::{Error, Result};
use crate::node::{Node, Tag, Value};

/// An element to be encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    /// Two's-complement content octets, as they should appear on the wire
    Integer(Vec<u8>),
    /// Bit string content without the unused-bits octet (always 0 unused bits)
    BitString(Vec<u8>),
    OctetString(Vec<u8>),
    Null,
    /// Dotted object identifier
    ObjectIdentifier(String),
    Utf8String(String),
    PrintableString(String),
    Ia5String(String),
    UtcTime(String),
    GeneralizedTime(String),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    /// `[n]` constructed
    ContextSpecific(u8, Vec<Element>),
    /// `[n] IMPLICIT` primitive with the given content octets
    Implicit(u8, Vec<u8>),
}

impl Element {
    /// INTEGER from an unsigned value, minimally encoded
    pub fn unsigned(value: u64) -> Self {
        Self::positive_integer(&value.to_be_bytes())
    }

    /// INTEGER from unsigned big-endian magnitude bytes.
    ///
    /// Redundant leading zeros are stripped and a single 0x00 is prepended when
    /// the high bit would otherwise mark the value negative.
    pub fn positive_integer(magnitude: &[u8]) -> Self {
        let start = magnitude
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(magnitude.len());
        let trimmed = &magnitude[start..];

        let mut content = Vec::with_capacity(trimmed.len() + 1);
        match trimmed.first() {
            None => content.push(0),
            Some(&b) if b & 0x80 != 0 => {
                content.push(0);
                content.extend_from_slice(trimmed);
            }
            Some(_) => content.extend_from_slice(trimmed),
        }
        Element::Integer(content)
    }

    pub fn oid(dotted: impl Into<String>) -> Self {
        Element::ObjectIdentifier(dotted.into())
    }

    pub fn tag(&self) -> Tag {
        match self {
            Element::Boolean(_) => Tag::Boolean,
            Element::Integer(_) => Tag::Integer,
            Element::BitString(_) => Tag::BitString,
            Element::OctetString(_) => Tag::OctetString,
            Element::Null => Tag::Null,
            Element::ObjectIdentifier(_) => Tag::ObjectIdentifier,
            Element::Utf8String(_) => Tag::Utf8String,
            Element::PrintableString(_) => Tag::PrintableString,
            Element::Ia5String(_) => Tag::Ia5String,
            Element::UtcTime(_) => Tag::UtcTime,
            Element::GeneralizedTime(_) => Tag::GeneralizedTime,
            Element::Sequence(_) => Tag::Sequence,
            Element::Set(_) => Tag::Set,
            Element::ContextSpecific(n, _) => Tag::ContextSpecific(*n),
            Element::Implicit(n, _) => Tag::Implicit(*n),
        }
    }

    /// Encode this element
    pub fn to_der(&self) -> Result<Vec<u8>> {
        encode(self)
    }
}

/// Encode an element tree to DER
pub fn encode(element: &Element) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_element(element, &mut out)?;
    Ok(out)
}

fn write_element(element: &Element, out: &mut Vec<u8>) -> Result<()> {
    let content = match element {
        Element::Boolean(v) => vec![if *v { 0xff } else { 0x00 }],
        Element::Integer(bytes) => {
            if bytes.is_empty() {
                vec![0]
            } else {
                bytes.clone()
            }
        }
        Element::BitString(bytes) => {
            let mut content = Vec::with_capacity(bytes.len() + 1);
            content.push(0);
            content.extend_from_slice(bytes);
            content
        }
        Element::OctetString(bytes) | Element::Implicit(_, bytes) => bytes.clone(),
        Element::Null => Vec::new(),
        Element::ObjectIdentifier(dotted) => encode_oid(dotted)?,
        Element::Utf8String(s) => s.as_bytes().to_vec(),
        Element::PrintableString(s)
        | Element::Ia5String(s)
        | Element::UtcTime(s)
        | Element::GeneralizedTime(s) => latin1(s)?,
        Element::Sequence(children)
        | Element::Set(children)
        | Element::ContextSpecific(_, children) => {
            let mut content = Vec::new();
            for child in children {
                write_element(child, &mut content)?;
            }
            content
        }
    };

    out.push(element.tag().to_byte());
    write_length(content.len(), out);
    out.extend_from_slice(&content);
    Ok(())
}

fn write_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = (len as u64).to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    out.push(0x80 | (8 - start) as u8);
    out.extend_from_slice(&bytes[start..]);
}

fn latin1(s: &str) -> Result<Vec<u8>> {
    s.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| Error::UnencodableString(s.to_string()))
        })
        .collect()
}

/// Encode a dotted object identifier into its content octets
pub fn encode_oid(dotted: &str) -> Result<Vec<u8>> {
    let arcs = dotted
        .split('.')
        .map(|arc| arc.parse::<u64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| Error::InvalidOid(dotted.to_string()))?;

    if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
        return Err(Error::InvalidOid(dotted.to_string()));
    }

    let first = arcs[0]
        .checked_mul(40)
        .and_then(|v| v.checked_add(arcs[1]))
        .ok_or_else(|| Error::InvalidOid(dotted.to_string()))?;

    let mut out = Vec::new();
    write_base128(first, &mut out);
    for &arc in &arcs[2..] {
        write_base128(arc, &mut out);
    }
    Ok(out)
}

fn write_base128(mut value: u64, out: &mut Vec<u8>) {
    let mut groups = [0u8; 10];
    let mut n = 0;
    loop {
        groups[n] = (value & 0x7f) as u8;
        n += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(groups[i] | continuation);
    }
}

impl From<&Node<'_>> for Element {
    fn from(node: &Node<'_>) -> Self {
        let content = node.content();
        let children = || {
            node.children()
                .map(|c| c.iter().map(Element::from).collect())
                .unwrap_or_default()
        };
        match (&node.tag, &node.value) {
            (Tag::Boolean, Value::Boolean(v)) => Element::Boolean(*v),
            (Tag::Integer, _) => Element::Integer(content.to_vec()),
            (Tag::BitString, Value::Bytes(b)) => Element::BitString(b.to_vec()),
            (Tag::OctetString, _) => Element::OctetString(content.to_vec()),
            (Tag::Null, _) => Element::Null,
            (Tag::ObjectIdentifier, Value::Oid(oid)) => Element::ObjectIdentifier(oid.clone()),
            (Tag::Utf8String, _) => {
                Element::Utf8String(String::from_utf8_lossy(content).into_owned())
            }
            (Tag::PrintableString, Value::String(s)) => Element::PrintableString(s.clone()),
            (Tag::Ia5String, Value::String(s)) => Element::Ia5String(s.clone()),
            (Tag::UtcTime, Value::String(s)) => Element::UtcTime(s.clone()),
            (Tag::GeneralizedTime, Value::String(s)) => Element::GeneralizedTime(s.clone()),
            (Tag::Sequence, _) => Element::Sequence(children()),
            (Tag::Set, _) => Element::Set(children()),
            (Tag::ContextSpecific(n), _) => Element::ContextSpecific(*n, children()),
            (Tag::Implicit(n), _) => Element::Implicit(*n, content.to_vec()),
            // Decoder invariants tie each tag to one value shape.
            _ => Element::OctetString(content.to_vec()),
        }
    }
}

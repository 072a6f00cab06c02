//! Decoded DER tree

use std::fmt;

/// Tag of a decoded element
///
/// Only the universal types that occur in RFC 3161 / CMS / X.509 structures
/// are listed. Context-specific tags keep their tag number so that `[0]` and
/// `[1]` remain distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Utf8String,
    PrintableString,
    Ia5String,
    UtcTime,
    GeneralizedTime,
    Sequence,
    Set,
    /// `[n]` constructed, context-specific (0xA0..=0xA5)
    ContextSpecific(u8),
    /// `[n] IMPLICIT` primitive, context-specific (0x80..=0x85).
    /// The content octets are kept as they are; the schema knows the type.
    Implicit(u8),
}

impl Tag {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const UTF8_STRING: u8 = 0x0c;
    pub const PRINTABLE_STRING: u8 = 0x13;
    pub const IA5_STRING: u8 = 0x16;
    pub const UTC_TIME: u8 = 0x17;
    pub const GENERALIZED_TIME: u8 = 0x18;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;
    pub const CONTEXT_PRIMITIVE: u8 = 0x80;
    pub const CONTEXT_CONSTRUCTED: u8 = 0xa0;

    /// Map an identifier octet to a tag
    pub fn from_byte(byte: u8) -> Option<Self> {
        let tag = match byte {
            Self::BOOLEAN => Tag::Boolean,
            Self::INTEGER => Tag::Integer,
            Self::BIT_STRING => Tag::BitString,
            Self::OCTET_STRING => Tag::OctetString,
            Self::NULL => Tag::Null,
            Self::OBJECT_IDENTIFIER => Tag::ObjectIdentifier,
            Self::UTF8_STRING => Tag::Utf8String,
            Self::PRINTABLE_STRING => Tag::PrintableString,
            Self::IA5_STRING => Tag::Ia5String,
            Self::UTC_TIME => Tag::UtcTime,
            Self::GENERALIZED_TIME => Tag::GeneralizedTime,
            Self::SEQUENCE => Tag::Sequence,
            Self::SET => Tag::Set,
            0x80..=0x85 => Tag::Implicit(byte & 0x1f),
            0xa0..=0xa5 => Tag::ContextSpecific(byte & 0x1f),
            _ => return None,
        };
        Some(tag)
    }

    /// The identifier octet for this tag
    pub fn to_byte(self) -> u8 {
        match self {
            Tag::Boolean => Self::BOOLEAN,
            Tag::Integer => Self::INTEGER,
            Tag::BitString => Self::BIT_STRING,
            Tag::OctetString => Self::OCTET_STRING,
            Tag::Null => Self::NULL,
            Tag::ObjectIdentifier => Self::OBJECT_IDENTIFIER,
            Tag::Utf8String => Self::UTF8_STRING,
            Tag::PrintableString => Self::PRINTABLE_STRING,
            Tag::Ia5String => Self::IA5_STRING,
            Tag::UtcTime => Self::UTC_TIME,
            Tag::GeneralizedTime => Self::GENERALIZED_TIME,
            Tag::Sequence => Self::SEQUENCE,
            Tag::Set => Self::SET,
            Tag::ContextSpecific(n) => Self::CONTEXT_CONSTRUCTED | (n & 0x1f),
            Tag::Implicit(n) => Self::CONTEXT_PRIMITIVE | (n & 0x1f),
        }
    }

    /// Whether elements with this tag contain other elements
    pub fn is_constructed(self) -> bool {
        matches!(self, Tag::Sequence | Tag::Set | Tag::ContextSpecific(_))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Boolean => write!(f, "BOOLEAN"),
            Tag::Integer => write!(f, "INTEGER"),
            Tag::BitString => write!(f, "BIT STRING"),
            Tag::OctetString => write!(f, "OCTET STRING"),
            Tag::Null => write!(f, "NULL"),
            Tag::ObjectIdentifier => write!(f, "OBJECT IDENTIFIER"),
            Tag::Utf8String => write!(f, "UTF8String"),
            Tag::PrintableString => write!(f, "PrintableString"),
            Tag::Ia5String => write!(f, "IA5String"),
            Tag::UtcTime => write!(f, "UTCTime"),
            Tag::GeneralizedTime => write!(f, "GeneralizedTime"),
            Tag::Sequence => write!(f, "SEQUENCE"),
            Tag::Set => write!(f, "SET"),
            Tag::ContextSpecific(n) => write!(f, "[{}]", n),
            Tag::Implicit(n) => write!(f, "[{}] IMPLICIT", n),
        }
    }
}

/// Decoded content of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<'a> {
    /// SEQUENCE, SET and context-specific children, in encoding order
    Children(Vec<Node<'a>>),
    /// Big-endian, unsigned accumulation of the content octets (low 64 bits).
    /// The exact encoding is always available from [`Node::content`].
    Integer(u64),
    Boolean(bool),
    /// OCTET STRING content, BIT STRING content without the unused-bits octet,
    /// or the content of a primitive `[n] IMPLICIT` element
    Bytes(&'a [u8]),
    /// Dotted object identifier, e.g. `2.5.4.6`
    Oid(String),
    /// Text and time types, one character per content octet
    String(String),
    Null,
}

/// A decoded DER element
///
/// `size` is the number of bytes the element occupies in the input, header
/// included. For constructed nodes it equals the header length plus the sum of
/// the children's sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<'a> {
    pub tag: Tag,
    pub size: usize,
    /// Tag and length octets
    pub header_len: usize,
    pub value: Value<'a>,
    /// The original encoding of the element, header included
    pub raw: &'a [u8],
}

impl<'a> Node<'a> {
    /// Content octets, without tag and length
    pub fn content(&self) -> &'a [u8] {
        &self.raw[self.header_len..]
    }

    /// Original encoding as lowercase hex
    pub fn raw_hex(&self) -> String {
        hex::encode(self.raw)
    }

    pub fn children(&self) -> Option<&[Node<'a>]> {
        match &self.value {
            Value::Children(children) => Some(children),
            _ => None,
        }
    }

    /// Child at `index`, if this node is constructed and has one
    pub fn child(&self, index: usize) -> Option<&Node<'a>> {
        self.children().and_then(|c| c.get(index))
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self.value {
            Value::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            Value::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self.value {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&str> {
        match &self.value {
            Value::Oid(oid) => Some(oid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

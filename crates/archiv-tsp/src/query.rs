//! TimeStampReq encoding
//!
//! ```text
//! TimeStampReq ::= SEQUENCE {
//!   version        INTEGER { v1(1) },
//!   messageImprint MessageImprint,
//!   reqPolicy      TSAPolicyId OPTIONAL,
//!   nonce          INTEGER OPTIONAL,
//!   certReq        BOOLEAN DEFAULT FALSE,
//!   extensions     [0] IMPLICIT Extensions OPTIONAL }
//!
//! MessageImprint ::= SEQUENCE {
//!   hashAlgorithm  AlgorithmIdentifier,
//!   hashedMessage  OCTET STRING }
//! ```

use crate::error::{Error, Result};
use archiv_der::{decode_exact, Element, Tag};
use archiv_types::Hex;

/// Media type of an encoded TimeStampReq
pub const TIMESTAMP_QUERY_CONTENT_TYPE: &str = "application/timestamp-query";
/// Media type of an encoded TimeStampResp
pub const TIMESTAMP_REPLY_CONTENT_TYPE: &str = "application/timestamp-reply";

/// A time-stamp request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeStampReq {
    pub algorithm_oid: String,
    pub hash: Vec<u8>,
    /// Nonce INTEGER content octets
    pub nonce: Option<Vec<u8>>,
    pub cert_req: bool,
}

impl TimeStampReq {
    /// A request that asks for the TSA certificate to be included
    pub fn new(algorithm_oid: impl Into<String>, hash: Vec<u8>, nonce: Vec<u8>) -> Self {
        Self {
            algorithm_oid: algorithm_oid.into(),
            hash,
            nonce: Some(nonce),
            cert_req: true,
        }
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        let mut fields = vec![
            Element::unsigned(1),
            Element::Sequence(vec![
                Element::Sequence(vec![Element::oid(self.algorithm_oid.clone()), Element::Null]),
                Element::OctetString(self.hash.clone()),
            ]),
        ];
        if let Some(nonce) = &self.nonce {
            fields.push(Element::positive_integer(nonce));
        }
        if self.cert_req {
            fields.push(Element::Boolean(true));
        }
        Ok(Element::Sequence(fields).to_der()?)
    }

    /// Decode a DER TimeStampReq
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let root = decode_exact(der)?;
        let malformed = |what: &str| Error::malformed(format!("TimeStampReq: {}", what));
        let children = root
            .children()
            .filter(|_| root.tag == Tag::Sequence)
            .ok_or_else(|| malformed("not a SEQUENCE"))?;

        let imprint = children
            .get(1)
            .filter(|n| n.tag == Tag::Sequence)
            .ok_or_else(|| malformed("missing messageImprint"))?;
        let algorithm_oid = imprint
            .child(0)
            .and_then(|alg| alg.child(0))
            .and_then(|oid| oid.as_oid())
            .ok_or_else(|| malformed("missing hashAlgorithm"))?
            .to_string();
        let hash = imprint
            .child(1)
            .filter(|n| n.tag == Tag::OctetString)
            .and_then(|n| n.as_bytes())
            .ok_or_else(|| malformed("missing hashedMessage"))?
            .to_vec();

        let mut nonce = None;
        let mut cert_req = false;
        for field in &children[2..] {
            match field.tag {
                Tag::Integer => nonce = Some(field.content().to_vec()),
                Tag::Boolean => cert_req = field.as_bool().unwrap_or(false),
                _ => {}
            }
        }

        Ok(Self {
            algorithm_oid,
            hash,
            nonce,
            cert_req,
        })
    }
}

/// Build a DER TimeStampReq with `certReq` set, returned as hex
pub fn create_query(hash: &Hex, nonce: &Hex, algorithm_oid: &str) -> Result<Hex> {
    let request = TimeStampReq::new(algorithm_oid, hash.decode()?, nonce.decode()?);
    Ok(Hex::encode(&request.to_der()?))
}

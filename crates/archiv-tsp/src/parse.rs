//! Projection of a decoded TimeStampResp onto the domain model
//!
//! ```text
//! TimeStampResp ::= SEQUENCE {
//!   status         PKIStatusInfo,
//!   timeStampToken ContentInfo OPTIONAL }
//!
//! ContentInfo ::= SEQUENCE {
//!   contentType    OBJECT IDENTIFIER (id-signedData),
//!   content        [0] EXPLICIT SignedData }
//!
//! SignedData ::= SEQUENCE {
//!   version          INTEGER,
//!   digestAlgorithms SET OF AlgorithmIdentifier,
//!   encapContentInfo SEQUENCE { eContentType, [0] EXPLICIT OCTET STRING },
//!   certificates     [0] IMPLICIT CertificateSet OPTIONAL,
//!   crls             [1] IMPLICIT RevocationInfoChoices OPTIONAL,
//!   signerInfos      SET OF SignerInfo }
//! ```
//!
//! Each structure has its own extractor that walks the children in declared
//! order. A missing field or a field of the wrong type is a
//! [`Error::MalformedResponse`].

use crate::error::{Error, Result};
use archiv_der::{decode, decode_exact, decode_integer, Node, Tag};
use archiv_types::{
    Accuracy, Certificate, Hex, MessageImprint, Name, SignerInfo, Status, TimeStampResponse,
    TstInfo, Validity,
};

/// id-signedData
pub const SIGNED_DATA_OID: &str = "1.2.840.113549.1.7.2";
/// id-ct-TSTInfo
pub const TST_INFO_OID: &str = "1.2.840.113549.1.9.16.1.4";

const COUNTRY_OID: &str = "2.5.4.6";
const ORGANIZATION_OID: &str = "2.5.4.10";
const ORGANIZATIONAL_UNIT_OID: &str = "2.5.4.11";
const COMMON_NAME_OID: &str = "2.5.4.3";

/// Cursor over the children of a constructed node
struct Fields<'n, 'a> {
    structure: &'static str,
    children: &'n [Node<'a>],
    pos: usize,
}

impl<'n, 'a> Fields<'n, 'a> {
    fn new(node: &'n Node<'a>, tag: Tag, structure: &'static str) -> Result<Self> {
        if node.tag != tag {
            return Err(Error::malformed(format!(
                "{}: expected {}, found {}",
                structure, tag, node.tag
            )));
        }
        Ok(Self {
            structure,
            children: node.children().unwrap_or_default(),
            pos: 0,
        })
    }

    /// Next field, which must carry `tag`
    fn required(&mut self, tag: Tag, field: &str) -> Result<&'n Node<'a>> {
        match self.children.get(self.pos) {
            Some(node) if node.tag == tag => {
                self.pos += 1;
                Ok(node)
            }
            Some(node) => Err(Error::malformed(format!(
                "{}.{}: expected {} at index {}, found {}",
                self.structure, field, tag, self.pos, node.tag
            ))),
            None => Err(Error::malformed(format!(
                "{}.{}: missing at index {}",
                self.structure, field, self.pos
            ))),
        }
    }

    /// Next field if it carries `tag`
    fn optional(&mut self, tag: Tag) -> Option<&'n Node<'a>> {
        let node = self.children.get(self.pos).filter(|n| n.tag == tag)?;
        self.pos += 1;
        Some(node)
    }

    /// Next field if it is one of the text or time types
    fn required_string(&mut self, field: &str) -> Result<&'n str> {
        match self.children.get(self.pos).and_then(|n| n.as_str()) {
            Some(s) => {
                self.pos += 1;
                Ok(s)
            }
            None => Err(Error::malformed(format!(
                "{}.{}: expected a string at index {}",
                self.structure, field, self.pos
            ))),
        }
    }
}

fn oid_of(node: &Node<'_>, structure: &'static str, field: &str) -> Result<String> {
    node.as_oid().map(str::to_string).ok_or_else(|| {
        Error::malformed(format!("{}.{}: expected OBJECT IDENTIFIER", structure, field))
    })
}

/// `AlgorithmIdentifier ::= SEQUENCE { algorithm OID, parameters ANY OPTIONAL }`
fn parse_algorithm_identifier(node: &Node<'_>, field: &str) -> Result<String> {
    let mut fields = Fields::new(node, Tag::Sequence, "AlgorithmIdentifier")?;
    let oid = fields.required(Tag::ObjectIdentifier, field)?;
    oid_of(oid, "AlgorithmIdentifier", field)
}

/// Parse PKIStatusInfo
pub fn parse_status(node: &Node<'_>) -> Result<Status> {
    let mut fields = Fields::new(node, Tag::Sequence, "PKIStatusInfo")?;
    let code = fields
        .required(Tag::Integer, "status")?
        .as_integer()
        .unwrap_or_default();

    let description = match fields.optional(Tag::Sequence) {
        Some(texts) => texts
            .children()
            .and_then(|c| c.first())
            .and_then(|n| n.as_str())
            .map(str::to_string),
        None => None,
    };
    let fail_info = fields
        .optional(Tag::BitString)
        .and_then(|n| n.as_bytes())
        .map(Hex::encode);

    Ok(Status {
        code,
        description,
        fail_info,
    })
}

/// Parse MessageImprint
pub fn parse_message_imprint(node: &Node<'_>) -> Result<MessageImprint> {
    let mut fields = Fields::new(node, Tag::Sequence, "MessageImprint")?;
    let algorithm_oid =
        parse_algorithm_identifier(fields.required(Tag::Sequence, "hashAlgorithm")?, "hashAlgorithm")?;
    let hash = fields.required(Tag::OctetString, "hashedMessage")?;
    Ok(MessageImprint {
        algorithm_oid,
        hash: Hex::encode(hash.content()),
    })
}

/// Accuracy ::= SEQUENCE {
///   seconds INTEGER OPTIONAL,
///   millis  [0] IMPLICIT INTEGER (1..999) OPTIONAL,
///   micros  [1] IMPLICIT INTEGER (1..999) OPTIONAL }
fn parse_accuracy(node: &Node<'_>) -> Accuracy {
    let mut accuracy = Accuracy::default();
    for field in node.children().unwrap_or_default() {
        match field.tag {
            Tag::Integer => accuracy.seconds = field.as_integer(),
            Tag::Implicit(0) => accuracy.millis = Some(decode_integer(field.content())),
            Tag::Implicit(1) => accuracy.micros = Some(decode_integer(field.content())),
            _ => {}
        }
    }
    accuracy
}

/// Parse TSTInfo
///
/// ```text
/// TSTInfo ::= SEQUENCE {
///   version        INTEGER { v1(1) },
///   policy         TSAPolicyId,
///   messageImprint MessageImprint,
///   serialNumber   INTEGER,
///   genTime        GeneralizedTime,
///   accuracy       Accuracy OPTIONAL,
///   ordering       BOOLEAN DEFAULT FALSE,
///   nonce          INTEGER OPTIONAL,
///   tsa            [0] GeneralName OPTIONAL,
///   extensions     [1] IMPLICIT Extensions OPTIONAL }
/// ```
pub fn parse_tst_info(node: &Node<'_>) -> Result<TstInfo> {
    let mut fields = Fields::new(node, Tag::Sequence, "TSTInfo")?;

    let version = fields
        .required(Tag::Integer, "version")?
        .as_integer()
        .unwrap_or_default();
    let policy_oid = oid_of(
        fields.required(Tag::ObjectIdentifier, "policy")?,
        "TSTInfo",
        "policy",
    )?;
    let message_imprint =
        parse_message_imprint(fields.required(Tag::Sequence, "messageImprint")?)?;
    let serial_number = Hex::encode(fields.required(Tag::Integer, "serialNumber")?.content());
    let gen_time = fields
        .required(Tag::GeneralizedTime, "genTime")?
        .as_str()
        .unwrap_or_default()
        .to_string();

    let accuracy = fields.optional(Tag::Sequence).map(parse_accuracy);
    let ordering = fields.optional(Tag::Boolean).and_then(|n| n.as_bool());
    let nonce = fields
        .optional(Tag::Integer)
        .map(|n| Hex::encode(n.content()));
    let tsa = fields
        .optional(Tag::ContextSpecific(0))
        .map(|n| Hex::encode(n.raw));

    Ok(TstInfo {
        version,
        policy_oid,
        message_imprint,
        serial_number,
        gen_time,
        accuracy,
        ordering,
        nonce,
        tsa,
    })
}

/// Parse an X.501 Name, keeping the attributes the report shows
fn parse_name(node: &Node<'_>) -> Result<Name> {
    let fields = Fields::new(node, Tag::Sequence, "Name")?;
    let mut name = Name::default();

    for rdn in fields.children {
        for attribute in rdn.children().unwrap_or_default() {
            let oid = attribute.child(0).and_then(|n| n.as_oid());
            let value = attribute
                .child(1)
                .and_then(|n| n.as_str())
                .map(str::to_string);
            let slot = match oid {
                Some(COUNTRY_OID) => &mut name.country,
                Some(ORGANIZATION_OID) => &mut name.org_name,
                Some(ORGANIZATIONAL_UNIT_OID) => &mut name.org_unit_name,
                Some(COMMON_NAME_OID) => &mut name.common_name,
                _ => continue,
            };
            if slot.is_none() {
                *slot = value;
            }
        }
    }

    Ok(name)
}

/// Parse an X.509 Certificate
///
/// ```text
/// Certificate ::= SEQUENCE { tbsCertificate, signatureAlgorithm, signatureValue }
/// TBSCertificate ::= SEQUENCE {
///   version [0] EXPLICIT Version DEFAULT v1,
///   serialNumber, signature, issuer, validity, subject,
///   subjectPublicKeyInfo, ... }
/// ```
pub fn parse_certificate(node: &Node<'_>) -> Result<Certificate> {
    let mut outer = Fields::new(node, Tag::Sequence, "Certificate")?;
    let tbs = outer.required(Tag::Sequence, "tbsCertificate")?;
    let signature_algorithm_oid = parse_algorithm_identifier(
        outer.required(Tag::Sequence, "signatureAlgorithm")?,
        "signatureAlgorithm",
    )?;

    let mut fields = Fields::new(tbs, Tag::Sequence, "TBSCertificate")?;
    let version = fields
        .optional(Tag::ContextSpecific(0))
        .and_then(|n| n.child(0))
        .and_then(|n| n.as_integer())
        .unwrap_or(0);
    let serial_number = Hex::encode(fields.required(Tag::Integer, "serialNumber")?.content());
    fields.required(Tag::Sequence, "signature")?;
    let issuer = parse_name(fields.required(Tag::Sequence, "issuer")?)?;

    let mut validity_fields = Fields::new(
        fields.required(Tag::Sequence, "validity")?,
        Tag::Sequence,
        "Validity",
    )?;
    let validity = Validity {
        not_before: validity_fields.required_string("notBefore")?.to_string(),
        not_after: validity_fields.required_string("notAfter")?.to_string(),
    };

    let subject = parse_name(fields.required(Tag::Sequence, "subject")?)?;
    let spki = fields.required(Tag::Sequence, "subjectPublicKeyInfo")?;

    Ok(Certificate {
        version,
        serial_number,
        signature_algorithm_oid,
        issuer,
        validity,
        subject,
        subject_public_key_info: Hex::encode(spki.raw),
        raw_bytes: Hex::encode(node.raw),
    })
}

/// Parse a CMS SignerInfo
///
/// ```text
/// SignerInfo ::= SEQUENCE {
///   version            INTEGER,
///   sid                IssuerAndSerialNumber,
///   digestAlgorithm    AlgorithmIdentifier,
///   signedAttrs        [0] IMPLICIT SET OF Attribute,
///   signatureAlgorithm AlgorithmIdentifier,
///   signature          OCTET STRING,
///   unsignedAttrs      [1] IMPLICIT SET OF Attribute OPTIONAL }
/// ```
pub fn parse_signer_info(node: &Node<'_>) -> Result<SignerInfo> {
    let mut fields = Fields::new(node, Tag::Sequence, "SignerInfo")?;

    let version = fields
        .required(Tag::Integer, "version")?
        .as_integer()
        .unwrap_or_default();

    let mut sid = Fields::new(fields.required(Tag::Sequence, "sid")?, Tag::Sequence, "IssuerAndSerialNumber")?;
    sid.required(Tag::Sequence, "issuer")?;
    let signer_serial = Hex::encode(sid.required(Tag::Integer, "serialNumber")?.content());

    let digest_algorithm_oid = parse_algorithm_identifier(
        fields.required(Tag::Sequence, "digestAlgorithm")?,
        "digestAlgorithm",
    )?;
    let signed_attrs = fields.required(Tag::ContextSpecific(0), "signedAttrs")?;
    let signature_algorithm_oid = parse_algorithm_identifier(
        fields.required(Tag::Sequence, "signatureAlgorithm")?,
        "signatureAlgorithm",
    )?;
    let signature = fields.required(Tag::OctetString, "signature")?;

    Ok(SignerInfo {
        version,
        signer_serial,
        digest_algorithm_oid,
        signed_attrs_raw: Hex::encode(signed_attrs.raw),
        signature_algorithm_oid,
        signature: Hex::encode(signature.content()),
    })
}

/// Contents of a SignedData that the response model keeps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedData {
    pub tst_info: TstInfo,
    pub certificates: Vec<Certificate>,
    pub signer_infos: Vec<SignerInfo>,
}

/// Parse a CMS SignedData carrying a TSTInfo
pub fn parse_signed_data(node: &Node<'_>) -> Result<SignedData> {
    let mut fields = Fields::new(node, Tag::Sequence, "SignedData")?;
    fields.required(Tag::Integer, "version")?;
    fields.required(Tag::Set, "digestAlgorithms")?;

    let mut encap = Fields::new(
        fields.required(Tag::Sequence, "encapContentInfo")?,
        Tag::Sequence,
        "EncapsulatedContentInfo",
    )?;
    let content_type = oid_of(
        encap.required(Tag::ObjectIdentifier, "eContentType")?,
        "EncapsulatedContentInfo",
        "eContentType",
    )?;
    if content_type != TST_INFO_OID {
        return Err(Error::malformed(format!(
            "EncapsulatedContentInfo.eContentType: expected {}, found {}",
            TST_INFO_OID, content_type
        )));
    }
    let mut explicit = Fields::new(
        encap.required(Tag::ContextSpecific(0), "eContent")?,
        Tag::ContextSpecific(0),
        "eContent",
    )?;
    let tst_der = explicit.required(Tag::OctetString, "OCTET STRING")?.content();
    let tst_info = parse_tst_info(&decode_exact(tst_der)?)?;

    let certificates = match fields.optional(Tag::ContextSpecific(0)) {
        Some(set) => set
            .children()
            .unwrap_or_default()
            .iter()
            .map(parse_certificate)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    fields.optional(Tag::ContextSpecific(1));

    let signer_infos = fields
        .required(Tag::Set, "signerInfos")?
        .children()
        .unwrap_or_default()
        .iter()
        .map(parse_signer_info)
        .collect::<Result<Vec<_>>>()?;

    Ok(SignedData {
        tst_info,
        certificates,
        signer_infos,
    })
}

/// Parse the `timeStampToken` ContentInfo
fn parse_token(node: &Node<'_>) -> Result<SignedData> {
    let mut fields = Fields::new(node, Tag::Sequence, "ContentInfo")?;
    let content_type = oid_of(
        fields.required(Tag::ObjectIdentifier, "contentType")?,
        "ContentInfo",
        "contentType",
    )?;
    if content_type != SIGNED_DATA_OID {
        return Err(Error::malformed(format!(
            "ContentInfo.contentType: expected {}, found {}",
            SIGNED_DATA_OID, content_type
        )));
    }
    let mut explicit = Fields::new(
        fields.required(Tag::ContextSpecific(0), "content")?,
        Tag::ContextSpecific(0),
        "content",
    )?;
    parse_signed_data(explicit.required(Tag::Sequence, "SignedData")?)
}

/// Parse only the status of a decoded TimeStampResp
///
/// Rejections carry no token, so callers check the status before asking for
/// the full projection.
pub fn parse_response_status(node: &Node<'_>) -> Result<Status> {
    let mut fields = Fields::new(node, Tag::Sequence, "TimeStampResp")?;
    parse_status(fields.required(Tag::Sequence, "status")?)
}

/// Project a decoded TimeStampResp onto [`TimeStampResponse`]
pub fn parse_timestamp_response(node: &Node<'_>) -> Result<TimeStampResponse> {
    let mut fields = Fields::new(node, Tag::Sequence, "TimeStampResp")?;
    let status = parse_status(fields.required(Tag::Sequence, "status")?)?;
    let signed_data = parse_token(fields.required(Tag::Sequence, "timeStampToken")?)?;

    tracing::debug!(
        "Parsed timestamp response: status {}, {} certificates, {} signers",
        status.code,
        signed_data.certificates.len(),
        signed_data.signer_infos.len()
    );

    Ok(TimeStampResponse {
        status,
        tst_info: signed_data.tst_info,
        certificates: signed_data.certificates,
        signer_infos: signed_data.signer_infos,
    })
}

/// Decode DER bytes and project them onto [`TimeStampResponse`]
pub fn parse_timestamp_response_der(der: &[u8]) -> Result<TimeStampResponse> {
    parse_timestamp_response(&decode(der, 0)?)
}

/// The signed-attributes blob as it was signed
///
/// signedAttrs is carried as `[0] IMPLICIT SET OF Attribute`; the signature
/// covers the same octets with the SET tag (0x31) in place of 0xA0.
pub fn signed_attrs_for_verification(signed_attrs_raw: &[u8]) -> Vec<u8> {
    let mut message = signed_attrs_raw.to_vec();
    if let Some(first) = message.first_mut() {
        *first = Tag::SET;
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use archiv_der::Element;
    use rstest::rstest;

    fn status(code: u64, text: Option<&str>) -> Element {
        let mut fields = vec![Element::unsigned(code)];
        if let Some(text) = text {
            fields.push(Element::Sequence(vec![Element::Utf8String(text.into())]));
        }
        Element::Sequence(fields)
    }

    #[test]
    fn test_parse_status_with_text() {
        let der = status(2, Some("bad request")).to_der().unwrap();
        let parsed = parse_status(&decode_exact(&der).unwrap()).unwrap();
        assert_eq!(parsed.code, 2);
        assert_eq!(parsed.description.as_deref(), Some("bad request"));
        assert_eq!(parsed.fail_info, None);
    }

    #[test]
    fn test_parse_status_fail_info() {
        let der = Element::Sequence(vec![
            Element::unsigned(2),
            Element::BitString(vec![0x80]),
        ])
        .to_der()
        .unwrap();
        let parsed = parse_status(&decode_exact(&der).unwrap()).unwrap();
        assert_eq!(parsed.description, None);
        assert_eq!(parsed.fail_info, Some(Hex::new("80")));
    }

    #[test]
    fn test_status_wrong_type() {
        let der = Element::Sequence(vec![Element::Boolean(true)]).to_der().unwrap();
        let err = parse_status(&decode_exact(&der).unwrap()).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(msg) if msg.contains("PKIStatusInfo.status")));
    }

    #[test]
    fn test_tst_info_optional_fields() {
        let der = Element::Sequence(vec![
            Element::unsigned(1),
            Element::oid("1.2.3.4"),
            Element::Sequence(vec![
                Element::Sequence(vec![Element::oid("1.3.14.3.2.26"), Element::Null]),
                Element::OctetString(vec![0x43; 20]),
            ]),
            Element::unsigned(0x1234),
            Element::GeneralizedTime("20160414080107Z".into()),
            Element::Sequence(vec![
                Element::unsigned(1),
                Element::Implicit(1, vec![0x01, 0xf4]),
            ]),
            Element::Boolean(false),
            Element::positive_integer(&[0x9a, 0xbc]),
        ])
        .to_der()
        .unwrap();

        let tst = parse_tst_info(&decode_exact(&der).unwrap()).unwrap();
        assert_eq!(tst.policy_oid, "1.2.3.4");
        assert_eq!(tst.message_imprint.algorithm_oid, "1.3.14.3.2.26");
        assert_eq!(tst.serial_number, "1234");
        assert_eq!(tst.gen_time, "20160414080107Z");
        assert_eq!(
            tst.accuracy,
            Some(Accuracy {
                seconds: Some(1),
                millis: None,
                micros: Some(500)
            })
        );
        assert_eq!(tst.ordering, Some(false));
        assert_eq!(tst.nonce, Some(Hex::new("009abc")));
        assert_eq!(tst.tsa, None);
    }

    #[rstest]
    #[case::seconds_and_millis(
        &[0x30, 0x07, 0x02, 0x01, 0x01, 0x80, 0x02, 0x01, 0xf4],
        Some(1),
        Some(500),
        None
    )]
    #[case::millis_only(&[0x30, 0x03, 0x80, 0x01, 0x64], None, Some(100), None)]
    #[case::all_three(
        &[0x30, 0x0a, 0x02, 0x01, 0x02, 0x80, 0x02, 0x03, 0x84, 0x81, 0x01, 0x32],
        Some(2),
        Some(900),
        Some(50)
    )]
    #[case::empty(&[0x30, 0x00], None, None, None)]
    fn test_accuracy_implicit_integers(
        #[case] der: &[u8],
        #[case] seconds: Option<u64>,
        #[case] millis: Option<u64>,
        #[case] micros: Option<u64>,
    ) {
        let accuracy = parse_accuracy(&decode_exact(der).unwrap());
        assert_eq!(
            accuracy,
            Accuracy {
                seconds,
                millis,
                micros
            }
        );
    }

    #[test]
    fn test_tst_info_missing_gen_time() {
        let der = Element::Sequence(vec![
            Element::unsigned(1),
            Element::oid("1.2.3.4"),
            Element::Sequence(vec![
                Element::Sequence(vec![Element::oid("1.3.14.3.2.26")]),
                Element::OctetString(vec![0x43; 20]),
            ]),
            Element::unsigned(7),
        ])
        .to_der()
        .unwrap();
        let err = parse_tst_info(&decode_exact(&der).unwrap()).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(msg) if msg.contains("genTime")));
    }

    #[test]
    fn test_signed_attrs_retag() {
        assert_eq!(
            signed_attrs_for_verification(&[0xa0, 0x03, 0x02, 0x01, 0x00]),
            vec![0x31, 0x03, 0x02, 0x01, 0x00]
        );
        assert!(signed_attrs_for_verification(&[]).is_empty());
    }

    #[test]
    fn test_response_without_token() {
        let der = Element::Sequence(vec![status(2, Some("rejected"))]).to_der().unwrap();
        let root = decode_exact(&der).unwrap();
        assert_eq!(parse_response_status(&root).unwrap().code, 2);
        assert!(matches!(
            parse_timestamp_response(&root),
            Err(Error::MalformedResponse(msg)) if msg.contains("timeStampToken")
        ));
    }
}

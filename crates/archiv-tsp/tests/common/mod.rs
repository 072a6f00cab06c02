//! Signed TimeStampResp fixtures built with the DER encoder
#![allow(dead_code)]

use archiv_crypto::{hash_bytes, AwsLcVerifier, SignatureVerifier, VerificationRequest};
use archiv_der::Element;
use archiv_tsp::{Error, Result, TimeStampReq, Transport};
use archiv_types::DigestAlgorithm;
use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const SIGNER_SERIAL: &[u8] = &[0x01, 0x23, 0x45];
pub const INTERMEDIATE_SERIAL: &[u8] = &[0x42];
pub const GEN_TIME: &str = "20240102030405Z";
pub const POLICY_OID: &str = "1.3.6.1.4.1.22177.300.22.1";

const ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";

/// A generated P-256 signing key
pub struct SigningKey {
    pair: EcdsaKeyPair,
    rng: SystemRandom,
}

impl SigningKey {
    pub fn generate() -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        let pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref()).unwrap();
        Self { pair, rng }
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.pair.sign(&self.rng, message).unwrap().as_ref().to_vec()
    }

    pub fn spki(&self) -> Element {
        Element::Sequence(vec![
            Element::Sequence(vec![
                Element::oid("1.2.840.10045.2.1"),
                Element::oid("1.2.840.10045.3.1.7"),
            ]),
            Element::BitString(self.pair.public_key().as_ref().to_vec()),
        ])
    }
}

/// Ways a fixture deviates from a correct answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tamper {
    None,
    Rejected,
    Hash,
    Algorithm,
    Nonce,
    MissingNonce,
    Signature,
    MissingSignerCert,
}

/// What the fixture response answers
#[derive(Debug, Clone)]
pub struct Answer {
    pub algorithm_oid: String,
    pub hash: Vec<u8>,
    pub nonce: Option<Vec<u8>>,
}

impl Answer {
    pub fn for_request(request: &TimeStampReq) -> Self {
        Self {
            algorithm_oid: request.algorithm_oid.clone(),
            hash: request.hash.clone(),
            nonce: request.nonce.clone(),
        }
    }
}

fn name(common_name: &str) -> Element {
    let rdn = |oid: &str, value: Element| {
        Element::Set(vec![Element::Sequence(vec![Element::oid(oid), value])])
    };
    Element::Sequence(vec![
        rdn("2.5.4.6", Element::PrintableString("DE".into())),
        rdn("2.5.4.10", Element::Utf8String("Archiv Test".into())),
        rdn("2.5.4.11", Element::Utf8String("TSA".into())),
        rdn("2.5.4.3", Element::Utf8String(common_name.into())),
    ])
}

fn algorithm(oid: &str) -> Element {
    Element::Sequence(vec![Element::oid(oid), Element::Null])
}

pub fn certificate(serial: &[u8], subject: &str, issuer: &str, spki: Element) -> Element {
    Element::Sequence(vec![
        Element::Sequence(vec![
            Element::ContextSpecific(0, vec![Element::unsigned(2)]),
            Element::positive_integer(serial),
            Element::Sequence(vec![Element::oid(ECDSA_WITH_SHA256)]),
            name(issuer),
            Element::Sequence(vec![
                Element::UtcTime("240101000000Z".into()),
                Element::UtcTime("340101000000Z".into()),
            ]),
            name(subject),
            spki,
        ]),
        Element::Sequence(vec![Element::oid(ECDSA_WITH_SHA256)]),
        Element::BitString(vec![0x30, 0x00]),
    ])
}

fn rejection() -> Vec<u8> {
    Element::Sequence(vec![Element::Sequence(vec![
        Element::unsigned(2),
        Element::Sequence(vec![Element::Utf8String("request rejected".into())]),
        Element::BitString(vec![0x80]),
    ])])
    .to_der()
    .unwrap()
}

/// Build a DER TimeStampResp signed by `key`
pub fn build_response(key: &SigningKey, answer: &Answer, tamper: Tamper) -> Vec<u8> {
    if tamper == Tamper::Rejected {
        return rejection();
    }

    let mut hash = answer.hash.clone();
    if tamper == Tamper::Hash {
        hash[0] ^= 0xff;
    }
    let algorithm_oid = match tamper {
        Tamper::Algorithm if answer.algorithm_oid == DigestAlgorithm::Sha512.oid() => {
            DigestAlgorithm::Sha256.oid().to_string()
        }
        Tamper::Algorithm => DigestAlgorithm::Sha512.oid().to_string(),
        _ => answer.algorithm_oid.clone(),
    };

    let mut tst_fields = vec![
        Element::unsigned(1),
        Element::oid(POLICY_OID),
        Element::Sequence(vec![algorithm(&algorithm_oid), Element::OctetString(hash)]),
        Element::unsigned(0x5eed),
        Element::GeneralizedTime(GEN_TIME.into()),
        Element::Sequence(vec![Element::unsigned(1)]),
    ];
    match (tamper, &answer.nonce) {
        (Tamper::MissingNonce, _) | (_, None) => {}
        (Tamper::Nonce, Some(nonce)) => {
            let mut other = nonce.clone();
            let last = other.len() - 1;
            other[last] ^= 0x01;
            tst_fields.push(Element::positive_integer(&other));
        }
        (_, Some(nonce)) => tst_fields.push(Element::positive_integer(nonce)),
    }
    tst_fields.push(Element::ContextSpecific(
        0,
        vec![Element::ContextSpecific(4, vec![name("Archiv Test TSA")])],
    ));
    let tst_der = Element::Sequence(tst_fields).to_der().unwrap();

    let attributes = vec![
        Element::Sequence(vec![
            Element::oid("1.2.840.113549.1.9.3"),
            Element::Set(vec![Element::oid("1.2.840.113549.1.9.16.1.4")]),
        ]),
        Element::Sequence(vec![
            Element::oid("1.2.840.113549.1.9.4"),
            Element::Set(vec![Element::OctetString(hash_bytes(
                DigestAlgorithm::Sha256,
                &tst_der,
            ))]),
        ]),
    ];
    let signed_set = Element::Set(attributes.clone()).to_der().unwrap();
    let mut signature = key.sign(&signed_set);
    if tamper == Tamper::Signature {
        signature = key.sign(b"some other message");
    }

    let signer_cert = certificate(SIGNER_SERIAL, "Archiv Test TSA", "Archiv Test CA", key.spki());
    let intermediate = certificate(
        INTERMEDIATE_SERIAL,
        "Archiv Test CA",
        "Archiv Test Root",
        SigningKey::generate().spki(),
    );
    let certificates = if tamper == Tamper::MissingSignerCert {
        vec![intermediate]
    } else {
        vec![intermediate, signer_cert]
    };

    let signer_info = Element::Sequence(vec![
        Element::unsigned(1),
        Element::Sequence(vec![name("Archiv Test CA"), Element::positive_integer(SIGNER_SERIAL)]),
        algorithm(DigestAlgorithm::Sha256.oid()),
        Element::ContextSpecific(0, attributes),
        Element::Sequence(vec![Element::oid(ECDSA_WITH_SHA256)]),
        Element::OctetString(signature),
    ]);

    let signed_data = Element::Sequence(vec![
        Element::unsigned(3),
        Element::Set(vec![algorithm(DigestAlgorithm::Sha256.oid())]),
        Element::Sequence(vec![
            Element::oid("1.2.840.113549.1.9.16.1.4"),
            Element::ContextSpecific(0, vec![Element::OctetString(tst_der)]),
        ]),
        Element::ContextSpecific(0, certificates),
        Element::Set(vec![signer_info]),
    ]);

    Element::Sequence(vec![
        Element::Sequence(vec![Element::unsigned(0)]),
        Element::Sequence(vec![
            Element::oid("1.2.840.113549.1.7.2"),
            Element::ContextSpecific(0, vec![signed_data]),
        ]),
    ])
    .to_der()
    .unwrap()
}

/// Transport that answers each query with a fixture built from it
pub struct FixtureTransport {
    key: SigningKey,
    tamper: Tamper,
    pub posts: AtomicUsize,
    pub last_content_type: Mutex<Option<String>>,
}

impl FixtureTransport {
    pub fn new(tamper: Tamper) -> Self {
        Self {
            key: SigningKey::generate(),
            tamper,
            posts: AtomicUsize::new(0),
            last_content_type: Mutex::new(None),
        }
    }
}

impl Transport for FixtureTransport {
    fn post<'a>(
        &'a self,
        _url: &'a str,
        body: Vec<u8>,
        content_type: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            self.posts.fetch_add(1, Ordering::SeqCst);
            *self.last_content_type.lock().unwrap() = Some(content_type.to_string());
            let request = TimeStampReq::from_der(&body)?;
            Ok(build_response(
                &self.key,
                &Answer::for_request(&request),
                self.tamper,
            ))
        })
    }
}

/// Transport that always fails
pub struct FailingTransport;

impl Transport for FailingTransport {
    fn post<'a>(
        &'a self,
        url: &'a str,
        _body: Vec<u8>,
        _content_type: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move { Err(Error::Transport(format!("connection refused: {}", url))) })
    }
}

/// Verifier that counts calls and delegates to aws-lc-rs
#[derive(Default)]
pub struct CountingVerifier {
    pub calls: AtomicUsize,
    inner: AwsLcVerifier,
}

impl CountingVerifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SignatureVerifier for CountingVerifier {
    fn verify_signature<'a>(
        &'a self,
        request: VerificationRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = archiv_crypto::Result<bool>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify_signature(request)
    }
}

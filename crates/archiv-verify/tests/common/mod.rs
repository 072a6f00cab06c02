//! Manifest fixtures and a scripted trust store
#![allow(dead_code)]

use archiv_crypto::hash_bytes;
use archiv_der::Element;
use archiv_trust::{TrustStatus, TrustStore};
use archiv_types::{
    Certificate, DigestAlgorithm, Hex, Manifest, MessageImprint, Name, SignerInfo, Status,
    TimeStampResponse, TstInfo, Validity,
};
use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::SystemTime;

pub const CONTENT: &[u8] = b"PK\x03\x04 pretend this is content.zip";
pub const GEN_TIME: &str = "20240102030405Z";
pub const ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";

fn name(common_name: &str) -> Name {
    Name {
        country: Some("DE".into()),
        org_name: Some("Archiv Test".into()),
        org_unit_name: None,
        common_name: Some(common_name.into()),
    }
}

fn certificate(serial: &str, subject: &str, spki: Vec<u8>, raw: &[u8]) -> Certificate {
    Certificate {
        version: 2,
        serial_number: Hex::new(serial),
        signature_algorithm_oid: ECDSA_WITH_SHA256.into(),
        issuer: name("Archiv Test CA"),
        validity: Validity {
            not_before: "240101000000Z".into(),
            not_after: "340101000000Z".into(),
        },
        subject: name(subject),
        subject_public_key_info: Hex::encode(&spki),
        raw_bytes: Hex::encode(raw),
    }
}

/// A manifest over [`CONTENT`] whose token is signed by a fresh P-256 key
pub fn manifest() -> Manifest {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
    let key = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref()).unwrap();

    let spki = Element::Sequence(vec![
        Element::Sequence(vec![
            Element::oid("1.2.840.10045.2.1"),
            Element::oid("1.2.840.10045.3.1.7"),
        ]),
        Element::BitString(key.public_key().as_ref().to_vec()),
    ])
    .to_der()
    .unwrap();

    let attributes = vec![
        Element::Sequence(vec![
            Element::oid("1.2.840.113549.1.9.3"),
            Element::Set(vec![Element::oid("1.2.840.113549.1.9.16.1.4")]),
        ]),
        Element::Sequence(vec![
            Element::oid("1.2.840.113549.1.9.4"),
            Element::Set(vec![Element::OctetString(vec![0x11; 32])]),
        ]),
    ];
    let message = Element::Set(attributes.clone()).to_der().unwrap();
    let signed_attrs = Element::ContextSpecific(0, attributes).to_der().unwrap();
    let signature = key.sign(&rng, &message).unwrap();

    let response = TimeStampResponse {
        status: Status::granted(),
        tst_info: TstInfo {
            version: 1,
            policy_oid: "1.3.6.1.4.1.22177.300.22.1".into(),
            message_imprint: MessageImprint {
                algorithm_oid: DigestAlgorithm::Sha256.oid().into(),
                hash: Hex::encode(&hash_bytes(DigestAlgorithm::Sha256, CONTENT)),
            },
            serial_number: Hex::new("5eed"),
            gen_time: GEN_TIME.into(),
            accuracy: None,
            ordering: None,
            nonce: Some(Hex::new("0102030405060708")),
            tsa: None,
        },
        certificates: vec![
            certificate("42", "Archiv Test CA", vec![0x30, 0x00], b"intermediate der"),
            certificate("012345", "Archiv Test TSA", spki, b"signer der"),
        ],
        signer_infos: vec![SignerInfo {
            version: 1,
            signer_serial: Hex::new("012345"),
            digest_algorithm_oid: DigestAlgorithm::Sha256.oid().into(),
            signed_attrs_raw: Hex::encode(&signed_attrs),
            signature_algorithm_oid: ECDSA_WITH_SHA256.into(),
            signature: Hex::encode(signature.as_ref()),
        }],
    };

    Manifest::new("http://example.org/", vec![], response)
}

/// Trust store that answers with a fixed status and records its calls
pub struct ScriptedTrustStore {
    status: TrustStatus,
    pub imported: Mutex<Vec<Vec<u8>>>,
    /// Signer certificate, chain material and validation time of each call
    pub validated: Mutex<Vec<(Vec<u8>, Vec<Vec<u8>>, SystemTime)>>,
}

impl ScriptedTrustStore {
    pub fn new(status: TrustStatus) -> Self {
        Self {
            status,
            imported: Mutex::new(Vec::new()),
            validated: Mutex::new(Vec::new()),
        }
    }
}

impl TrustStore for ScriptedTrustStore {
    fn import_intermediate<'a>(
        &'a self,
        cert_der: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = archiv_trust::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.imported.lock().unwrap().push(cert_der.to_vec());
            Ok(())
        })
    }

    fn validate_chain<'a>(
        &'a self,
        cert_der: &'a [u8],
        chain: &'a [Vec<u8>],
        time: SystemTime,
    ) -> Pin<Box<dyn Future<Output = TrustStatus> + Send + 'a>> {
        Box::pin(async move {
            self.validated
                .lock()
                .unwrap()
                .push((cert_der.to_vec(), chain.to_vec(), time));
            self.status
        })
    }
}

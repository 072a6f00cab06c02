//! Signature verification using aws-lc-rs
//!
//! Signatures in time-stamp tokens are RSA PKCS#1 v1.5 or ECDSA. The verifier
//! picks the scheme from the SignerInfo's signature algorithm OID, the digest
//! from its digest algorithm OID, and for ECDSA the curve from the
//! certificate's SubjectPublicKeyInfo.

use crate::error::{Error, Result};
use archiv_der::{decode_exact, Tag};
use archiv_types::DigestAlgorithm;
use aws_lc_rs::signature::{
    UnparsedPublicKey, VerificationAlgorithm, ECDSA_P256_SHA256_ASN1, ECDSA_P256_SHA384_ASN1,
    ECDSA_P256_SHA512_ASN1, ECDSA_P384_SHA256_ASN1, ECDSA_P384_SHA384_ASN1,
    ECDSA_P384_SHA512_ASN1, ECDSA_P521_SHA256_ASN1, ECDSA_P521_SHA384_ASN1,
    ECDSA_P521_SHA512_ASN1, RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY,
    RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY, RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY,
    RSA_PKCS1_2048_8192_SHA384,
};
use std::future::Future;
use std::pin::Pin;

/// rsaEncryption
pub const RSA_ENCRYPTION_OID: &str = "1.2.840.113549.1.1.1";
pub const SHA1_WITH_RSA_OID: &str = "1.2.840.113549.1.1.5";
pub const SHA256_WITH_RSA_OID: &str = "1.2.840.113549.1.1.11";
pub const SHA384_WITH_RSA_OID: &str = "1.2.840.113549.1.1.12";
pub const SHA512_WITH_RSA_OID: &str = "1.2.840.113549.1.1.13";
/// id-ecPublicKey
pub const EC_PUBLIC_KEY_OID: &str = "1.2.840.10045.2.1";
pub const ECDSA_WITH_SHA256_OID: &str = "1.2.840.10045.4.3.2";
pub const ECDSA_WITH_SHA384_OID: &str = "1.2.840.10045.4.3.3";
pub const ECDSA_WITH_SHA512_OID: &str = "1.2.840.10045.4.3.4";
/// secp256r1
pub const P256_OID: &str = "1.2.840.10045.3.1.7";
/// secp384r1
pub const P384_OID: &str = "1.3.132.0.34";
/// secp521r1
pub const P521_OID: &str = "1.3.132.0.35";

/// Smallest modulus accepted for RSA with SHA-384
const RSA_SHA384_MIN_BITS: usize = 2048;

/// Signature scheme family selected by the signature algorithm OID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFamily {
    RsaPkcs1,
    Ecdsa,
}

impl SignatureFamily {
    pub fn from_oid(oid: &str) -> Result<Self> {
        match oid {
            RSA_ENCRYPTION_OID | SHA1_WITH_RSA_OID | SHA256_WITH_RSA_OID | SHA384_WITH_RSA_OID
            | SHA512_WITH_RSA_OID => Ok(SignatureFamily::RsaPkcs1),
            EC_PUBLIC_KEY_OID | ECDSA_WITH_SHA256_OID | ECDSA_WITH_SHA384_OID
            | ECDSA_WITH_SHA512_OID => Ok(SignatureFamily::Ecdsa),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// The parts of a SubjectPublicKeyInfo needed for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyInfo<'a> {
    pub algorithm_oid: String,
    /// Named curve for EC keys
    pub curve_oid: Option<String>,
    /// BIT STRING payload: PKCS#1 RSAPublicKey or an uncompressed EC point
    pub key: &'a [u8],
}

/// Split a DER SubjectPublicKeyInfo into algorithm, curve and key bytes
pub fn parse_subject_public_key_info(spki: &[u8]) -> Result<PublicKeyInfo<'_>> {
    let node = decode_exact(spki)?;
    let invalid = |what: &str| Error::InvalidKey(format!("SubjectPublicKeyInfo: {}", what));

    if node.tag != Tag::Sequence {
        return Err(invalid("not a SEQUENCE"));
    }
    let algorithm = node
        .child(0)
        .filter(|n| n.tag == Tag::Sequence)
        .ok_or_else(|| invalid("missing AlgorithmIdentifier"))?;
    let algorithm_oid = algorithm
        .child(0)
        .and_then(|n| n.as_oid())
        .ok_or_else(|| invalid("missing algorithm OID"))?
        .to_string();
    let curve_oid = algorithm
        .child(1)
        .and_then(|n| n.as_oid())
        .map(str::to_string);
    let key = node
        .child(1)
        .filter(|n| n.tag == Tag::BitString)
        .and_then(|n| n.as_bytes())
        .ok_or_else(|| invalid("missing subjectPublicKey"))?;

    Ok(PublicKeyInfo {
        algorithm_oid,
        curve_oid,
        key,
    })
}

/// Inputs for one signature check
#[derive(Debug, Clone, Copy)]
pub struct VerificationRequest<'a> {
    pub signature_algorithm_oid: &'a str,
    pub digest_algorithm_oid: &'a str,
    pub signature: &'a [u8],
    /// Signed bytes, i.e. the re-tagged signedAttrs
    pub message: &'a [u8],
    /// DER SubjectPublicKeyInfo of the signer certificate
    pub subject_public_key_info: &'a [u8],
}

/// Crypto-primitive collaborator for the sign and verify pipelines
///
/// Returns `Ok(false)` for a well-formed signature that does not verify and an
/// error when the algorithm or key cannot be used at all.
pub trait SignatureVerifier: Send + Sync {
    fn verify_signature<'a>(
        &'a self,
        request: VerificationRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;
}

/// [`SignatureVerifier`] backed by aws-lc-rs
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsLcVerifier;

impl AwsLcVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify synchronously
    pub fn verify(&self, request: &VerificationRequest<'_>) -> Result<bool> {
        let family = SignatureFamily::from_oid(request.signature_algorithm_oid)?;
        let digest = DigestAlgorithm::from_oid(request.digest_algorithm_oid)?;
        let public_key = parse_subject_public_key_info(request.subject_public_key_info)?;

        let algorithm: &'static dyn VerificationAlgorithm = match family {
            SignatureFamily::RsaPkcs1 => {
                if public_key.algorithm_oid != RSA_ENCRYPTION_OID {
                    return Err(Error::InvalidKey(format!(
                        "RSA signature with {} key",
                        public_key.algorithm_oid
                    )));
                }
                // Older TSAs still sign with 1024-bit keys. aws-lc-rs has no
                // 1024-bit SHA-384 variant, so short keys are refused there.
                match digest {
                    DigestAlgorithm::Sha1 => &RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY,
                    DigestAlgorithm::Sha256 => &RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY,
                    DigestAlgorithm::Sha384 => {
                        let bits = rsa_modulus_bits(public_key.key)?;
                        if bits < RSA_SHA384_MIN_BITS {
                            return Err(Error::InvalidKey(format!(
                                "{}-bit RSA key with {} (minimum {} bits)",
                                bits, digest, RSA_SHA384_MIN_BITS
                            )));
                        }
                        &RSA_PKCS1_2048_8192_SHA384
                    }
                    DigestAlgorithm::Sha512 => &RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY,
                }
            }
            SignatureFamily::Ecdsa => {
                if public_key.algorithm_oid != EC_PUBLIC_KEY_OID {
                    return Err(Error::InvalidKey(format!(
                        "ECDSA signature with {} key",
                        public_key.algorithm_oid
                    )));
                }
                let curve = public_key.curve_oid.as_deref().unwrap_or_default();
                match (curve, digest) {
                    (P256_OID, DigestAlgorithm::Sha256) => &ECDSA_P256_SHA256_ASN1,
                    (P256_OID, DigestAlgorithm::Sha384) => &ECDSA_P256_SHA384_ASN1,
                    (P256_OID, DigestAlgorithm::Sha512) => &ECDSA_P256_SHA512_ASN1,
                    (P384_OID, DigestAlgorithm::Sha256) => &ECDSA_P384_SHA256_ASN1,
                    (P384_OID, DigestAlgorithm::Sha384) => &ECDSA_P384_SHA384_ASN1,
                    (P384_OID, DigestAlgorithm::Sha512) => &ECDSA_P384_SHA512_ASN1,
                    (P521_OID, DigestAlgorithm::Sha256) => &ECDSA_P521_SHA256_ASN1,
                    (P521_OID, DigestAlgorithm::Sha384) => &ECDSA_P521_SHA384_ASN1,
                    (P521_OID, DigestAlgorithm::Sha512) => &ECDSA_P521_SHA512_ASN1,
                    _ => {
                        return Err(Error::UnsupportedAlgorithm(format!(
                            "ECDSA on curve {} with {}",
                            if curve.is_empty() { "<none>" } else { curve },
                            digest
                        )))
                    }
                }
            }
        };

        tracing::debug!(
            "Verifying {:?} signature with {} ({} byte message)",
            family,
            digest,
            request.message.len()
        );

        let key = UnparsedPublicKey::new(algorithm, public_key.key);
        Ok(key.verify(request.message, request.signature).is_ok())
    }
}

/// Bit length of the modulus in a PKCS#1 RSAPublicKey
fn rsa_modulus_bits(key: &[u8]) -> Result<usize> {
    let node = decode_exact(key)?;
    let modulus = node
        .child(0)
        .filter(|n| n.tag == Tag::Integer)
        .ok_or_else(|| Error::InvalidKey("RSAPublicKey: missing modulus".to_string()))?;
    let content = modulus.content();
    let start = content.iter().position(|&b| b != 0).unwrap_or(content.len());
    Ok(content[start..]
        .first()
        .map_or(0, |&b| (content.len() - start) * 8 - b.leading_zeros() as usize))
}

impl SignatureVerifier for AwsLcVerifier {
    fn verify_signature<'a>(
        &'a self,
        request: VerificationRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move { self.verify(&request) })
    }
}

//! Manifest verification tests

mod common;

use archiv_crypto::hash_bytes;
use archiv_types::{DigestAlgorithm, Hex};
use archiv_verify::{Error, TrustStatus, ValidationTime, Verifier, VerifyOptions};
use common::{manifest, ScriptedTrustStore, CONTENT, GEN_TIME};
use rstest::rstest;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

fn content_hash() -> Hex {
    Hex::encode(&hash_bytes(DigestAlgorithm::Sha256, CONTENT))
}

#[rstest]
#[case::trusted(TrustStatus::Trusted)]
#[case::revoked(TrustStatus::Revoked)]
#[case::expired(TrustStatus::Expired)]
#[case::untrusted(TrustStatus::Untrusted)]
#[tokio::test]
async fn test_trust_outcome_is_reported(#[case] status: TrustStatus) {
    let verifier = Verifier::new(Arc::new(ScriptedTrustStore::new(status)));

    let result = verifier.verify(&manifest(), &content_hash()).await.unwrap();

    assert!(result.hashes_match);
    assert_eq!(result.certificate_trusted, status);
    assert!(result.signature_valid);
    assert_eq!(result.time, GEN_TIME);
    assert_eq!(result.is_valid(), status == TrustStatus::Trusted);
}

#[tokio::test]
async fn test_chain_material_goes_with_each_validation() {
    let trust = Arc::new(ScriptedTrustStore::new(TrustStatus::Trusted));
    let verifier = Verifier::new(trust.clone());

    verifier.verify(&manifest(), &content_hash()).await.unwrap();
    verifier.verify(&manifest(), &content_hash()).await.unwrap();

    assert!(trust.imported.lock().unwrap().is_empty());
    let validated = trust.validated.lock().unwrap();
    assert_eq!(validated.len(), 2);
    for (signer, chain, _) in validated.iter() {
        assert_eq!(signer, &b"signer der".to_vec());
        assert_eq!(chain, &vec![b"intermediate der".to_vec()]);
    }
}

#[tokio::test]
async fn test_token_time_validation() {
    let trust = Arc::new(ScriptedTrustStore::new(TrustStatus::Trusted));
    let verifier = Verifier::new(trust.clone())
        .with_options(VerifyOptions::default().with_validation_time(ValidationTime::TokenTime));

    verifier.verify(&manifest(), &content_hash()).await.unwrap();

    let validated = trust.validated.lock().unwrap();
    assert_eq!(
        validated[0].2,
        UNIX_EPOCH + Duration::from_secs(1_704_164_645)
    );
}

#[tokio::test]
async fn test_other_content_does_not_match() {
    let verifier = Verifier::new(Arc::new(ScriptedTrustStore::new(TrustStatus::Trusted)));
    let other = Hex::encode(&hash_bytes(DigestAlgorithm::Sha256, b"something else"));

    let result = verifier.verify(&manifest(), &other).await.unwrap();

    assert!(!result.hashes_match);
    assert!(result.signature_valid);
    assert!(!result.is_valid());
}

#[tokio::test]
async fn test_uppercase_hash_matches() {
    let verifier = Verifier::new(Arc::new(ScriptedTrustStore::new(TrustStatus::Trusted)));
    let upper = Hex::new(content_hash().as_str().to_uppercase());

    let result = verifier.verify(&manifest(), &upper).await.unwrap();
    assert!(result.hashes_match);
}

#[tokio::test]
async fn test_tampered_signature() {
    let verifier = Verifier::new(Arc::new(ScriptedTrustStore::new(TrustStatus::Trusted)));
    let mut manifest = manifest();
    manifest.signature.signer_infos[0].signed_attrs_raw = Hex::new("a000");

    let result = verifier.verify(&manifest, &content_hash()).await.unwrap();

    assert!(result.hashes_match);
    assert!(!result.signature_valid);
}

#[tokio::test]
async fn test_unsupported_signature_algorithm() {
    let verifier = Verifier::new(Arc::new(ScriptedTrustStore::new(TrustStatus::Trusted)));
    let mut manifest = manifest();
    manifest.signature.signer_infos[0].signature_algorithm_oid = "1.3.101.112".into();

    let err = verifier
        .verify(&manifest, &content_hash())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Crypto(archiv_crypto::Error::UnsupportedAlgorithm(_))
    ));
}

#[tokio::test]
async fn test_unknown_digest_algorithm() {
    let verifier = Verifier::new(Arc::new(ScriptedTrustStore::new(TrustStatus::Trusted)));
    let mut manifest = manifest();
    manifest.signature.tst_info.message_imprint.algorithm_oid = "1.2.3.4".into();

    let err = verifier
        .verify(&manifest, &content_hash())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Crypto(archiv_crypto::Error::UnknownDigestAlgorithm(_))
    ));
}

#[tokio::test]
async fn test_missing_signer_certificate() {
    let trust = Arc::new(ScriptedTrustStore::new(TrustStatus::Trusted));
    let verifier = Verifier::new(trust.clone());
    let mut manifest = manifest();
    manifest.signature.certificates.pop();

    let err = verifier
        .verify(&manifest, &content_hash())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SignerNotFound));
    assert!(trust.validated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_verify_archive_hashes_content() {
    let verifier = Verifier::new(Arc::new(ScriptedTrustStore::new(TrustStatus::Trusted)));
    let json = manifest().to_json_pretty().unwrap();

    let result = verifier
        .verify_archive(json.as_bytes(), CONTENT)
        .await
        .unwrap();
    assert!(result.is_valid());

    let result = verifier
        .verify_archive(json.as_bytes(), &b"tampered"[..])
        .await
        .unwrap();
    assert!(!result.hashes_match);
}

#[tokio::test]
async fn test_verify_archive_rejects_bad_json() {
    let verifier = Verifier::new(Arc::new(ScriptedTrustStore::new(TrustStatus::Trusted)));
    let err = verifier
        .verify_archive(b"{\"url\": 1}", CONTENT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Types(_)));
}

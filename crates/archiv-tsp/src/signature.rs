//! Token signature check shared by signing and verification

use crate::error::{Error, Result};
use crate::parse::signed_attrs_for_verification;
use archiv_crypto::{SignatureVerifier, VerificationRequest};
use archiv_types::TimeStampResponse;

/// Verify the first SignerInfo's signature with the matching certificate's key
///
/// Returns `Ok(false)` when the signature does not verify. Fails with
/// [`Error::SignerNotFound`] when there is no signer or no certificate with
/// the signer's serial number, and with a crypto error when the algorithm is
/// not supported.
pub async fn check_token_signature(
    response: &TimeStampResponse,
    verifier: &dyn SignatureVerifier,
) -> Result<bool> {
    let signer = response.signer().ok_or(Error::SignerNotFound)?;
    let certificate = response.signer_certificate().ok_or(Error::SignerNotFound)?;

    tracing::debug!(
        "Signer certificate: serial {}, subject {}",
        certificate.serial_number,
        certificate.subject
    );

    let message = signed_attrs_for_verification(&signer.signed_attrs_raw.decode()?);
    let signature = signer.signature.decode()?;
    let spki = certificate.subject_public_key_info.decode()?;

    let valid = verifier
        .verify_signature(VerificationRequest {
            signature_algorithm_oid: &signer.signature_algorithm_oid,
            digest_algorithm_oid: &signer.digest_algorithm_oid,
            signature: &signature,
            message: &message,
            subject_public_key_info: &spki,
        })
        .await?;

    Ok(valid)
}

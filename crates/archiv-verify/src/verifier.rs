//! Manifest verification engine

use crate::error::{Error, Result};
use crate::time::parse_generalized_time;
use archiv_crypto::{hash_stream, AwsLcVerifier, SignatureVerifier};
use archiv_trust::TrustStore;
use archiv_tsp::check_token_signature;
use archiv_types::{DigestAlgorithm, Hex, Manifest, TrustStatus, VerificationResult};
use std::io::Read;
use std::sync::Arc;
use std::time::SystemTime;

/// Instant at which the signer certificate chain is validated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationTime {
    /// The time of verification
    #[default]
    Now,
    /// The `genTime` of the token
    TokenTime,
}

/// Options for [`Verifier`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    pub validation_time: ValidationTime,
}

impl VerifyOptions {
    pub fn with_validation_time(mut self, validation_time: ValidationTime) -> Self {
        self.validation_time = validation_time;
        self
    }
}

/// Verifies manifests against recomputed content hashes
///
/// Hash, trust and signature are checked independently and all three are
/// reported. Only structural problems (no signer certificate, unsupported
/// algorithms, undecodable fields) abort verification.
pub struct Verifier {
    trust: Arc<dyn TrustStore>,
    signature: Arc<dyn SignatureVerifier>,
    options: VerifyOptions,
}

impl Verifier {
    /// Verifier using `trust` and the aws-lc-rs signature verifier
    pub fn new(trust: Arc<dyn TrustStore>) -> Self {
        Self {
            trust,
            signature: Arc::new(AwsLcVerifier::new()),
            options: VerifyOptions::default(),
        }
    }

    pub fn with_signature_verifier(mut self, signature: Arc<dyn SignatureVerifier>) -> Self {
        self.signature = signature;
        self
    }

    pub fn with_options(mut self, options: VerifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verify `manifest` against the hash of the archived content
    ///
    /// `recomputed_hash` must have been computed with the algorithm named by
    /// the token's message imprint.
    pub async fn verify(
        &self,
        manifest: &Manifest,
        recomputed_hash: &Hex,
    ) -> Result<VerificationResult> {
        let response = &manifest.signature;
        let tst_info = &response.tst_info;

        let algorithm = DigestAlgorithm::from_oid(&tst_info.message_imprint.algorithm_oid)
            .map_err(archiv_crypto::Error::from)?;
        let hashes_match = *recomputed_hash == tst_info.message_imprint.hash;
        tracing::debug!(
            "{} content hash {}",
            algorithm,
            if hashes_match { "matches" } else { "differs" }
        );

        let signer_cert = response.signer_certificate().ok_or(Error::SignerNotFound)?;
        let certificate_trusted = self.check_trust(manifest).await?;
        if !certificate_trusted.is_trusted() {
            tracing::warn!(
                "Signer certificate {} ({}) is not trusted: {}",
                signer_cert.serial_number,
                signer_cert.subject,
                certificate_trusted
            );
        }

        let signature_valid = check_token_signature(response, self.signature.as_ref()).await?;
        tracing::debug!("Token signature valid: {}", signature_valid);

        Ok(VerificationResult {
            hashes_match,
            certificate_trusted,
            signature_valid,
            time: tst_info.gen_time.clone(),
        })
    }

    /// Parse a manifest, hash `content` with the algorithm it names, verify
    pub async fn verify_archive<R: Read>(
        &self,
        manifest_json: &[u8],
        content: R,
    ) -> Result<VerificationResult> {
        let manifest = Manifest::from_slice(manifest_json)?;
        let algorithm = DigestAlgorithm::from_oid(
            &manifest.signature.tst_info.message_imprint.algorithm_oid,
        )
        .map_err(archiv_crypto::Error::from)?;

        let recomputed = hash_stream(content, algorithm)?;
        self.verify(&manifest, &recomputed).await
    }

    async fn check_trust(&self, manifest: &Manifest) -> Result<TrustStatus> {
        let response = &manifest.signature;
        let signer_cert = response.signer_certificate().ok_or(Error::SignerNotFound)?;

        let chain = response
            .chain_certificates()
            .map(|cert| cert.raw_bytes.decode())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::debug!("Token carries {} chain certificate(s)", chain.len());

        let time = match self.options.validation_time {
            ValidationTime::Now => SystemTime::now(),
            ValidationTime::TokenTime => {
                SystemTime::from(parse_generalized_time(&response.tst_info.gen_time)?)
            }
        };

        let signer_der = signer_cert.raw_bytes.decode()?;
        Ok(self.trust.validate_chain(&signer_der, &chain, time).await)
    }
}

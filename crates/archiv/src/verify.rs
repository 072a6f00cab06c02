//! Verifying unpacked archives

use crate::config::ArchivConfig;
use crate::error::{Error, Result};
use archiv_trust::WebPkiTrustStore;
use archiv_types::VerificationResult;
use archiv_verify::Verifier;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Build the trust store named by `config`
pub async fn load_trust_store(config: &ArchivConfig) -> Result<WebPkiTrustStore> {
    let mut store = WebPkiTrustStore::load(&config.trust_roots).await?;
    for crl in &config.crls {
        store = store.with_crl_file(crl).await?;
    }
    for path in &config.intermediates {
        let count = store.import_intermediate_file(path).await?;
        tracing::debug!("Imported {} intermediate(s) from {}", count, path.display());
    }
    if store.root_count() == 0 {
        tracing::warn!("No trust roots configured; every certificate will be untrusted");
    }
    Ok(store)
}

/// Verify an unpacked archive: its manifest file and its `content.zip`
pub async fn verify_manifest_file(
    config: &ArchivConfig,
    manifest: impl AsRef<Path>,
    content: impl AsRef<Path>,
) -> Result<VerificationResult> {
    let manifest = manifest.as_ref();
    let content = content.as_ref();
    if !manifest.is_file() {
        return Err(Error::MissingManifest(manifest.to_path_buf()));
    }
    if !content.is_file() {
        return Err(Error::MissingContent(content.to_path_buf()));
    }

    let manifest_json = std::fs::read(manifest)?;
    let store = load_trust_store(config).await?;
    let verifier = Verifier::new(Arc::new(store)).with_options(config.verify);

    let result = verifier
        .verify_archive(&manifest_json, File::open(content)?)
        .await?;
    tracing::info!(
        "Verified {}: hashes match {}, certificate trusted {}, signature valid {}",
        manifest.display(),
        result.hashes_match,
        result.certificate_trusted,
        result.signature_valid
    );
    Ok(result)
}

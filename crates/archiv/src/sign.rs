//! Time-stamping archives

use crate::error::Result;
use archiv_crypto::hash_file;
use archiv_tsp::{TimestampClient, TimestampConfig};
use archiv_types::{DigestAlgorithm, FileEntry, Manifest, TimeStampResponse};
use std::path::Path;

/// Obtain a verified time-stamp for `hash` from the configured TSA
pub async fn sign_hash(config: &TimestampConfig, hash: &[u8]) -> Result<TimeStampResponse> {
    let client = TimestampClient::new(config.clone())?;
    Ok(client.sign(hash).await?)
}

/// Describe one archived resource, hashing it with `algorithm`
pub fn file_entry(
    file: impl Into<String>,
    url: impl Into<String>,
    path: impl AsRef<Path>,
    algorithm: DigestAlgorithm,
) -> Result<FileEntry> {
    Ok(FileEntry {
        file: file.into(),
        url: url.into(),
        hash: hash_file(path, algorithm)?,
        certificate: None,
    })
}

/// Time-stamp the content of an archive and describe it in a manifest
///
/// `content` is the packed `content.zip`; it is hashed with the client's
/// digest algorithm and the hash is sent to the TSA.
pub async fn timestamp_archive(
    client: &TimestampClient,
    page_url: &str,
    content: impl AsRef<Path>,
    files: Vec<FileEntry>,
) -> Result<Manifest> {
    let algorithm = client.config().digest_algorithm;
    let content_hash = hash_file(content.as_ref(), algorithm)?;
    tracing::info!(
        "Time-stamping {} ({} {})",
        content.as_ref().display(),
        algorithm,
        content_hash
    );

    let response = client.sign(&content_hash.decode()?).await?;
    tracing::info!("Time-stamped at {}", response.tst_info.gen_time);

    Ok(Manifest::new(page_url, files, response))
}

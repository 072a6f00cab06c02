//! Hashing using aws-lc-rs

use crate::error::Result;
use archiv_types::{DigestAlgorithm, Hex};
use aws_lc_rs::digest::{self, Context, SHA1_FOR_LEGACY_USE_ONLY, SHA256, SHA384, SHA512};
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

pub(crate) fn algorithm(alg: DigestAlgorithm) -> &'static digest::Algorithm {
    match alg {
        DigestAlgorithm::Sha1 => &SHA1_FOR_LEGACY_USE_ONLY,
        DigestAlgorithm::Sha256 => &SHA256,
        DigestAlgorithm::Sha384 => &SHA384,
        DigestAlgorithm::Sha512 => &SHA512,
    }
}

/// Hash a byte slice
pub fn hash_bytes(alg: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
    digest::digest(algorithm(alg), data).as_ref().to_vec()
}

/// Incremental hasher for any supported digest algorithm
pub struct Hasher {
    alg: DigestAlgorithm,
    context: Context,
}

impl Hasher {
    pub fn new(alg: DigestAlgorithm) -> Self {
        Self {
            alg,
            context: Context::new(algorithm(alg)),
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.alg
    }

    pub fn update(&mut self, data: &[u8]) {
        self.context.update(data);
    }

    /// Finalize and get the digest
    pub fn finalize(self) -> Vec<u8> {
        self.context.finish().as_ref().to_vec()
    }
}

/// Hash everything a reader yields, returning lowercase hex
pub fn hash_stream<R: Read>(mut reader: R, alg: DigestAlgorithm) -> Result<Hex> {
    let mut hasher = Hasher::new(alg);
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    tracing::debug!("Hashed {} bytes with {}", total, alg);
    Ok(Hex::encode(&hasher.finalize()))
}

/// Hash a file on disk
pub fn hash_file(path: impl AsRef<Path>, alg: DigestAlgorithm) -> Result<Hex> {
    let file = std::fs::File::open(path.as_ref())?;
    hash_stream(std::io::BufReader::new(file), alg)
}

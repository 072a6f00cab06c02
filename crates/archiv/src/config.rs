//! Configuration shared by signing and verification

use archiv_tsp::TimestampConfig;
use archiv_verify::VerifyOptions;
use std::path::PathBuf;

/// Everything needed to time-stamp and verify archives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivConfig {
    /// Time-stamp authority settings
    pub timestamp: TimestampConfig,
    pub verify: VerifyOptions,
    /// Root certificates (PEM or DER files) trusted for TSA chains
    pub trust_roots: Vec<PathBuf>,
    /// Intermediate CA certificates (PEM or DER files) available to every chain
    pub intermediates: Vec<PathBuf>,
    /// Certificate revocation lists (PEM or DER files)
    pub crls: Vec<PathBuf>,
}

impl ArchivConfig {
    pub fn with_timestamp(mut self, timestamp: TimestampConfig) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_verify_options(mut self, verify: VerifyOptions) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_trust_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.trust_roots.push(path.into());
        self
    }

    pub fn with_intermediate(mut self, path: impl Into<PathBuf>) -> Self {
        self.intermediates.push(path.into());
        self
    }

    pub fn with_crl(mut self, path: impl Into<PathBuf>) -> Self {
        self.crls.push(path.into());
        self
    }
}

//! Trusted timestamps for web archives
//!
//! An archive is a `content.zip` with the archived resources and a JSON
//! manifest carrying an RFC 3161 time-stamp over the hash of that content.
//! This crate ties the workspace together:
//!
//! - [`timestamp_archive`] hashes the content, obtains a time-stamp whose
//!   response is checked against the request, and returns the manifest
//! - [`verify_manifest_file`] recomputes the hash, validates the TSA
//!   certificate chain and checks the token signature
//!
//! # Example
//!
//! ```no_run
//! use archiv::{timestamp_archive, verify_manifest_file, ArchivConfig};
//! use archiv::tsp::TimestampClient;
//!
//! # async fn example() -> archiv::Result<()> {
//! let config = ArchivConfig::default().with_trust_root("dfn-root.pem");
//! let client = TimestampClient::new(config.timestamp.clone())?;
//!
//! let manifest = timestamp_archive(&client, "https://example.org/", "content.zip", vec![]).await?;
//! std::fs::write("manifest", manifest.to_json_pretty()?)?;
//!
//! let result = verify_manifest_file(&config, "manifest", "content.zip").await?;
//! assert!(result.is_valid());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod sign;
pub mod verify;

pub use archiv_crypto as crypto;
pub use archiv_der as der;
pub use archiv_trust as trust;
pub use archiv_tsp as tsp;
pub use archiv_types as types;

pub use archiv_types::{FileEntry, Manifest, TimeStampResponse, TrustStatus, VerificationResult};
pub use archiv_verify::{parse_generalized_time, ValidationTime, Verifier, VerifyOptions};
pub use config::ArchivConfig;
pub use error::{Error, Result};
pub use sign::{file_entry, sign_hash, timestamp_archive};
pub use verify::{load_trust_store, verify_manifest_file};

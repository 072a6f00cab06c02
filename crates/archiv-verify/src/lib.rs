//! Verification of timestamped archive manifests
//!
//! A [`Verifier`] answers three independent questions about a manifest:
//! does the archived content hash to the time-stamped value, is the
//! time-stamp authority's certificate trusted, and does the token signature
//! verify. All three answers land in a [`VerificationResult`]; a distrusted
//! certificate never aborts verification.
//!
//! # Example
//!
//! ```no_run
//! use archiv_trust::WebPkiTrustStore;
//! use archiv_verify::Verifier;
//! use std::sync::Arc;
//!
//! # async fn example(root_pem: &[u8], manifest: &[u8], content: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let trust = WebPkiTrustStore::from_pem(root_pem)?;
//! let verifier = Verifier::new(Arc::new(trust));
//! let result = verifier.verify_archive(manifest, content).await?;
//! println!("time-stamped at {}, valid: {}", result.time, result.is_valid());
//! # Ok(())
//! # }
//! ```

mod error;
mod time;
mod verifier;

pub use archiv_types::{TrustStatus, VerificationResult};
pub use error::{Error, Result};
pub use time::parse_generalized_time;
pub use verifier::{ValidationTime, Verifier, VerifyOptions};

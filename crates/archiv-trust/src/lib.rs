//! Trust store for time-stamp authority certificates
//!
//! The verification engine hands the signer certificate of a time-stamp token
//! to a [`TrustStore`], together with the other certificates the token
//! carries as chain material. The store answers with a
//! [`TrustStatus`]; a failed validation is an outcome, not an error.
//!
//! Chain material from a token only takes part in that token's validation.
//! Intermediates that should apply to every validation are imported once
//! with [`TrustStore::import_intermediate`].
//!
//! [`WebPkiTrustStore`] validates chains with rustls-webpki against a fixed
//! set of roots, optionally consulting certificate revocation lists.
//!
//! # Example
//!
//! ```no_run
//! use archiv_trust::{TrustStore, WebPkiTrustStore};
//! use std::time::SystemTime;
//!
//! # async fn example(root_pem: &[u8], signer_der: &[u8]) -> Result<(), archiv_trust::Error> {
//! let store = WebPkiTrustStore::from_pem(root_pem)?;
//! let status = store.validate_chain(signer_der, &[], SystemTime::now()).await;
//! println!("certificate trusted: {}", status);
//! # Ok(())
//! # }
//! ```

mod error;
mod webpki_store;

pub use archiv_types::TrustStatus;
pub use error::{Error, Result};
pub use webpki_store::{trust_status_for, WebPkiTrustStore, ID_KP_TIME_STAMPING};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::SystemTime;

/// Certificate trust collaborator
///
/// Implementations own their synchronization: the engine may call both
/// methods from concurrent verifications.
pub trait TrustStore: Send + Sync {
    /// Add a certificate that may serve as an intermediate in every later chain
    fn import_intermediate<'a>(
        &'a self,
        cert_der: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Validate the chain of `cert_der` at `time`
    ///
    /// `chain` holds the DER certificates that came with `cert_der`. They are
    /// candidate intermediates for this call only and are never retained.
    fn validate_chain<'a>(
        &'a self,
        cert_der: &'a [u8],
        chain: &'a [Vec<u8>],
        time: SystemTime,
    ) -> Pin<Box<dyn Future<Output = TrustStatus> + Send + 'a>>;
}

impl<T: TrustStore + ?Sized> TrustStore for Arc<T> {
    fn import_intermediate<'a>(
        &'a self,
        cert_der: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        (**self).import_intermediate(cert_der)
    }

    fn validate_chain<'a>(
        &'a self,
        cert_der: &'a [u8],
        chain: &'a [Vec<u8>],
        time: SystemTime,
    ) -> Pin<Box<dyn Future<Output = TrustStatus> + Send + 'a>> {
        (**self).validate_chain(cert_der, chain, time)
    }
}

//! rustls-webpki backed [`TrustStore`]

use crate::error::{Error, Result};
use crate::TrustStore;
use archiv_types::TrustStatus;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, CertificateRevocationListDer, TrustAnchor, UnixTime};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use webpki::{
    anchor_from_trusted_cert, BorrowedCertRevocationList, CertRevocationList, EndEntityCert,
    KeyUsage, RevocationCheckDepth, RevocationOptionsBuilder, UnknownStatusPolicy,
    ALL_VERIFICATION_ALGS,
};

/// id-kp-timeStamping (1.3.6.1.5.5.7.3.8), content octets
pub const ID_KP_TIME_STAMPING: &[u8] = &[0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x08];

/// Map a webpki validation failure to the reported outcome
pub fn trust_status_for(err: &webpki::Error) -> TrustStatus {
    match err {
        webpki::Error::CertRevoked => TrustStatus::Revoked,
        webpki::Error::CertExpired { .. } => TrustStatus::Expired,
        _ => TrustStatus::Untrusted,
    }
}

/// Trust store validating chains with rustls-webpki
///
/// Roots and CRLs are fixed at construction. Imported intermediates are
/// shared by all later validations; chain material passed to
/// [`TrustStore::validate_chain`] is used for that call only.
pub struct WebPkiTrustStore {
    anchors: Vec<TrustAnchor<'static>>,
    intermediates: RwLock<Vec<CertificateDer<'static>>>,
    crls: Vec<CertRevocationList<'static>>,
}

impl WebPkiTrustStore {
    /// Store trusting the given DER root certificates
    pub fn from_der_roots<I, B>(roots: I) -> Result<Self>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let anchors = roots
            .into_iter()
            .map(|der| {
                let cert = CertificateDer::from(der.as_ref());
                anchor_from_trusted_cert(&cert)
                    .map(|anchor| anchor.to_owned())
                    .map_err(|e| {
                        Error::InvalidCertificate(format!("failed to create trust anchor: {}", e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Trust store holds {} root(s)", anchors.len());

        Ok(Self {
            anchors,
            intermediates: RwLock::new(Vec::new()),
            crls: Vec::new(),
        })
    }

    /// Store trusting every certificate in a PEM bundle
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let roots = CertificateDer::pem_slice_iter(pem)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Pem(e.to_string()))?;
        if roots.is_empty() {
            return Err(Error::Pem("no certificates in PEM input".to_string()));
        }
        Self::from_der_roots(roots)
    }

    /// Store trusting the roots in each file, PEM or DER
    pub async fn load(root_paths: &[impl AsRef<Path>]) -> Result<Self> {
        let mut roots = Vec::new();
        for path in root_paths {
            let bytes = tokio::fs::read(path.as_ref()).await?;
            if looks_like_pem(&bytes) {
                for cert in CertificateDer::pem_slice_iter(&bytes) {
                    roots.push(cert.map_err(|e| Error::Pem(e.to_string()))?);
                }
            } else {
                roots.push(CertificateDer::from(bytes));
            }
        }
        Self::from_der_roots(roots)
    }

    /// Add a DER certificate revocation list
    pub fn with_crl_der(mut self, der: &[u8]) -> Result<Self> {
        let crl = BorrowedCertRevocationList::from_der(der)
            .and_then(|crl| crl.to_owned())
            .map_err(|e| Error::InvalidCrl(e.to_string()))?;
        self.crls.push(CertRevocationList::from(crl));
        Ok(self)
    }

    /// Add the revocation lists in a file, PEM or DER
    pub async fn with_crl_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        if !looks_like_pem(&bytes) {
            return self.with_crl_der(&bytes);
        }

        let mut store = self;
        for crl in CertificateRevocationListDer::pem_slice_iter(&bytes) {
            let crl = crl.map_err(|e| Error::Pem(e.to_string()))?;
            store = store.with_crl_der(crl.as_ref())?;
        }
        Ok(store)
    }

    /// Number of revocation lists consulted
    pub fn crl_count(&self) -> usize {
        self.crls.len()
    }

    /// Number of roots
    pub fn root_count(&self) -> usize {
        self.anchors.len()
    }

    /// Import every intermediate in a file, PEM or DER
    pub async fn import_intermediate_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        if !looks_like_pem(&bytes) {
            self.import_intermediate(&bytes).await?;
            return Ok(1);
        }

        let mut count = 0;
        for cert in CertificateDer::pem_slice_iter(&bytes) {
            let cert = cert.map_err(|e| Error::Pem(e.to_string()))?;
            self.import_intermediate(cert.as_ref()).await?;
            count += 1;
        }
        Ok(count)
    }

    /// Number of imported intermediates
    pub async fn intermediate_count(&self) -> usize {
        self.intermediates.read().await.len()
    }

    fn validate(
        &self,
        cert_der: &[u8],
        intermediates: &[CertificateDer<'static>],
        time: SystemTime,
    ) -> TrustStatus {
        let cert_der = CertificateDer::from(cert_der);
        let end_entity = match EndEntityCert::try_from(&cert_der) {
            Ok(cert) => cert,
            Err(e) => {
                tracing::warn!("Signer certificate does not parse: {}", e);
                return TrustStatus::Untrusted;
            }
        };

        let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        let verification_time = UnixTime::since_unix_epoch(since_epoch);

        let crl_refs: Vec<&CertRevocationList<'static>> = self.crls.iter().collect();
        let revocation = RevocationOptionsBuilder::new(&crl_refs).ok().map(|builder| {
            builder
                .with_depth(RevocationCheckDepth::Chain)
                .with_status_policy(UnknownStatusPolicy::Allow)
                .build()
        });

        tracing::debug!(
            "Validating chain against {} root(s), {} intermediate(s), {} CRL(s) at unix time {}",
            self.anchors.len(),
            intermediates.len(),
            crl_refs.len(),
            since_epoch.as_secs()
        );

        match end_entity.verify_for_usage(
            ALL_VERIFICATION_ALGS,
            &self.anchors,
            intermediates,
            verification_time,
            KeyUsage::required(ID_KP_TIME_STAMPING),
            revocation,
            None,
        ) {
            Ok(_) => {
                tracing::debug!("Certificate chain validated");
                TrustStatus::Trusted
            }
            Err(e) => {
                tracing::debug!("Certificate chain validation failed: {}", e);
                trust_status_for(&e)
            }
        }
    }
}

impl TrustStore for WebPkiTrustStore {
    fn import_intermediate<'a>(
        &'a self,
        cert_der: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let cert = CertificateDer::from(cert_der.to_vec());
            EndEntityCert::try_from(&cert).map_err(|e| {
                Error::InvalidCertificate(format!("failed to parse intermediate: {}", e))
            })?;

            let mut intermediates = self.intermediates.write().await;
            if !intermediates.contains(&cert) {
                intermediates.push(cert);
            }
            Ok(())
        })
    }

    fn validate_chain<'a>(
        &'a self,
        cert_der: &'a [u8],
        chain: &'a [Vec<u8>],
        time: SystemTime,
    ) -> Pin<Box<dyn Future<Output = TrustStatus> + Send + 'a>> {
        Box::pin(async move {
            let mut intermediates = self.intermediates.read().await.clone();
            for der in chain {
                let cert = CertificateDer::from(der.as_slice());
                if let Err(e) = EndEntityCert::try_from(&cert) {
                    tracing::warn!("Skipping chain certificate that does not parse: {}", e);
                    continue;
                }
                let cert = cert.into_owned();
                if !intermediates.contains(&cert) {
                    intermediates.push(cert);
                }
            }
            self.validate(cert_der, &intermediates, time)
        })
    }
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .is_some_and(|start| bytes[start..].starts_with(b"-----BEGIN"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_status_mapping() {
        assert_eq!(
            trust_status_for(&webpki::Error::CertRevoked),
            TrustStatus::Revoked
        );
        assert_eq!(
            trust_status_for(&webpki::Error::UnknownIssuer),
            TrustStatus::Untrusted
        );
        assert_eq!(
            trust_status_for(&webpki::Error::BadDer),
            TrustStatus::Untrusted
        );
    }

    #[test]
    fn test_looks_like_pem() {
        assert!(looks_like_pem(b"-----BEGIN CERTIFICATE-----\n"));
        assert!(looks_like_pem(b"\n  -----BEGIN X509 CRL-----\n"));
        assert!(!looks_like_pem(&[0x30, 0x82, 0x01, 0x00]));
        assert!(!looks_like_pem(b""));
    }

    #[test]
    fn test_empty_pem_bundle() {
        assert!(matches!(
            WebPkiTrustStore::from_pem(b"not a certificate"),
            Err(Error::Pem(_))
        ));
    }

    #[test]
    fn test_garbage_crl() {
        let store = WebPkiTrustStore::from_der_roots(Vec::<Vec<u8>>::new()).unwrap();
        assert!(matches!(
            store.with_crl_der(&[0x30, 0x00]),
            Err(Error::InvalidCrl(_))
        ));
    }

    #[tokio::test]
    async fn test_garbage_signer_is_untrusted() {
        let store = WebPkiTrustStore::from_der_roots(Vec::<Vec<u8>>::new()).unwrap();
        let status = store
            .validate_chain(&[0x30, 0x03, 0x02, 0x01, 0x01], &[], SystemTime::now())
            .await;
        assert_eq!(status, TrustStatus::Untrusted);
    }
}

//! Time-stamp request pipeline
//!
//! [`TimestampClient::sign`] runs the request as a strict sequence: build the
//! query, send it, parse the reply, check it answers the query, then verify
//! the token signature. Every check is fatal.

use crate::error::{Error, Result};
use crate::parse::{parse_response_status, parse_timestamp_response};
use crate::query::{TimeStampReq, TIMESTAMP_QUERY_CONTENT_TYPE};
use crate::signature::check_token_signature;
use archiv_crypto::{generate_nonce, AwsLcVerifier, SignatureVerifier, DEFAULT_NONCE_LEN};
use archiv_der::decode;
use archiv_types::{DigestAlgorithm, Hex, TimeStampResponse};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// DFN-Verein time-stamp service
pub const DFN_TSA_URL: &str = "http://zeitstempel.dfn.de";
/// FreeTSA time-stamp service
pub const FREETSA_URL: &str = "https://freetsa.org/tsr";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for talking to a time-stamp authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampConfig {
    /// TSA endpoint
    pub url: String,
    /// Algorithm the caller hashes content with
    pub digest_algorithm: DigestAlgorithm,
    /// Limit for the whole HTTP exchange
    pub timeout: Duration,
    /// Random nonce length in bytes
    pub nonce_len: usize,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self::new(DFN_TSA_URL)
    }
}

impl TimestampConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            digest_algorithm: DigestAlgorithm::default(),
            timeout: DEFAULT_TIMEOUT,
            nonce_len: DEFAULT_NONCE_LEN,
        }
    }

    /// The DFN-Verein TSA
    pub fn dfn() -> Self {
        Self::new(DFN_TSA_URL)
    }

    /// The FreeTSA service
    pub fn freetsa() -> Self {
        Self::new(FREETSA_URL)
    }

    pub fn with_digest_algorithm(mut self, alg: DigestAlgorithm) -> Self {
        self.digest_algorithm = alg;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Transport collaborator: POST a body and return the response body
pub trait Transport: Send + Sync {
    fn post<'a>(
        &'a self,
        url: &'a str,
        body: Vec<u8>,
        content_type: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;
}

/// [`Transport`] over HTTP(S) with reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post<'a>(
        &'a self,
        url: &'a str,
        body: Vec<u8>,
        content_type: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header("Content-Type", content_type)
                .body(body)
                .send()
                .await
                .map_err(|e| Error::Transport(e.to_string()))?;

            if !response.status().is_success() {
                return Err(Error::Transport(format!(
                    "TSA returned status {}",
                    response.status()
                )));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| Error::Transport(e.to_string()))?;
            Ok(bytes.to_vec())
        })
    }
}

/// A client for obtaining verified time-stamp tokens
pub struct TimestampClient {
    config: TimestampConfig,
    transport: Arc<dyn Transport>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl TimestampClient {
    /// Client with the HTTP transport and the aws-lc-rs verifier
    pub fn new(config: TimestampConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_collaborators(
            config,
            Arc::new(transport),
            Arc::new(AwsLcVerifier::new()),
        ))
    }

    /// Client with explicit collaborators
    pub fn with_collaborators(
        config: TimestampConfig,
        transport: Arc<dyn Transport>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        Self {
            config,
            transport,
            verifier,
        }
    }

    pub fn config(&self) -> &TimestampConfig {
        &self.config
    }

    /// Time-stamp a hash computed with the configured digest algorithm
    pub async fn sign(&self, hash: &[u8]) -> Result<TimeStampResponse> {
        self.sign_with_algorithm(hash, self.config.digest_algorithm)
            .await
    }

    /// Time-stamp a hash computed with `algorithm`
    pub async fn sign_with_algorithm(
        &self,
        hash: &[u8],
        algorithm: DigestAlgorithm,
    ) -> Result<TimeStampResponse> {
        // Build
        let nonce = generate_nonce(self.config.nonce_len);
        let request = TimeStampReq::new(algorithm.oid(), hash.to_vec(), nonce.clone());
        let query = request.to_der()?;
        tracing::debug!(
            "Built {} byte TimeStampReq for {} hash, nonce {}",
            query.len(),
            algorithm,
            Hex::encode(&nonce)
        );

        // Transmit
        let reply = self
            .transport
            .post(&self.config.url, query, TIMESTAMP_QUERY_CONTENT_TYPE)
            .await?;
        tracing::debug!("Received {} byte reply from {}", reply.len(), self.config.url);

        // Parse
        let root = decode(&reply, 0)?;
        let status = parse_response_status(&root)?;
        if !status.is_granted() {
            return Err(Error::mismatch(format!(
                "status {} ({}){}",
                status.code,
                status.code_name(),
                status
                    .description
                    .as_deref()
                    .map(|d| format!(": {}", d))
                    .unwrap_or_default()
            )));
        }
        let response = parse_timestamp_response(&root)?;

        // Validate
        validate_response(&response, hash, algorithm, &nonce)?;
        tracing::debug!("Response matches request");

        // Authenticate
        if !check_token_signature(&response, self.verifier.as_ref()).await? {
            return Err(Error::InvalidSignature);
        }
        tracing::debug!(
            "Timestamp signature verified, genTime {}",
            response.tst_info.gen_time
        );

        Ok(response)
    }
}

/// Check that a granted response answers the request that was sent
pub fn validate_response(
    response: &TimeStampResponse,
    hash: &[u8],
    algorithm: DigestAlgorithm,
    nonce: &[u8],
) -> Result<()> {
    if !response.status.is_granted() {
        return Err(Error::mismatch(format!(
            "status {} ({})",
            response.status.code,
            response.status.code_name()
        )));
    }

    let imprint = &response.tst_info.message_imprint;
    let expected_hash = Hex::encode(hash);
    if imprint.hash != expected_hash {
        return Err(Error::mismatch(format!(
            "hash: expected {}, got {}",
            expected_hash, imprint.hash
        )));
    }

    if imprint.algorithm_oid != algorithm.oid() {
        return Err(Error::mismatch(format!(
            "hash algorithm: expected {}, got {}",
            algorithm.oid(),
            imprint.algorithm_oid
        )));
    }

    let expected_nonce = Hex::encode(nonce);
    match &response.tst_info.nonce {
        Some(actual) if actual.eq_unsigned(&expected_nonce) => Ok(()),
        Some(actual) => Err(Error::mismatch(format!(
            "nonce: expected {}, got {}",
            expected_nonce, actual
        ))),
        None => Err(Error::mismatch("nonce: missing from response")),
    }
}

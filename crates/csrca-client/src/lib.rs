//! Requester side of csrca.
//!
//! Posts a PEM CSR to the signing service and inspects the certificate that
//! comes back. Any transport failure or non-2xx answer is terminal; there
//! are no retries.

pub mod error;

use std::fmt;
use std::time::Duration;

use csrca_certgen::encode::{hex, hex_colon};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};
use x509_parser::extensions::ParsedExtension;
use x509_parser::parse_x509_certificate;

pub use error::ClientError;

/// Endpoint a default-configured server listens on.
pub const DEFAULT_SIGN_URL: &str = "http://localhost:8881/sign";

const PEM_CONTENT_TYPE: &str = "application/x-pem-file";

/// HTTP client for the `/sign` endpoint.
#[derive(Debug, Clone)]
pub struct SignClient {
    http: reqwest::Client,
    url: String,
}

impl SignClient {
    pub fn new(url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `csr_pem` and return the PEM body of a successful answer.
    pub async fn submit(&self, csr_pem: &str) -> Result<String, ClientError> {
        debug!(url = %self.url, bytes = csr_pem.len(), "submitting CSR");
        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, PEM_CONTENT_TYPE)
            .body(csr_pem.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: body.trim_end().to_string(),
            });
        }

        info!(status = status.as_u16(), bytes = body.len(), "certificate received");
        Ok(body)
    }
}

/// What the client reports about a returned certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateReport {
    pub pem_size: usize,
    pub der_size: usize,
    pub issuer: String,
    pub subject: String,
    pub serial: String,
    /// Hex key identifier, colon separated.
    pub authority_key_id: Option<String>,
    pub public_key_algorithm: String,
    /// Seconds since the Unix epoch.
    pub not_before: i64,
    pub not_after: i64,
}

impl CertificateReport {
    pub fn from_pem(pem: &str) -> Result<Self, ClientError> {
        let der = csrca_certgen::pem::decode_certificate(pem.as_bytes())?;
        let (_, cert) = parse_x509_certificate(&der)
            .map_err(|e| ClientError::InvalidResponse(format!("error parsing certificate: {e}")))?;

        let authority_key_id = cert.extensions().iter().find_map(|ext| {
            match ext.parsed_extension() {
                ParsedExtension::AuthorityKeyIdentifier(aki) => {
                    aki.key_identifier.as_ref().map(|id| hex_colon(id.0))
                }
                _ => None,
            }
        });

        let validity = cert.validity();
        Ok(Self {
            pem_size: pem.len(),
            der_size: der.len(),
            issuer: cert.issuer().to_string(),
            subject: cert.subject().to_string(),
            serial: hex(cert.raw_serial()),
            authority_key_id,
            public_key_algorithm: algorithm_name(
                &cert.public_key().algorithm.algorithm.to_id_string(),
            ),
            not_before: validity.not_before.timestamp(),
            not_after: validity.not_after.timestamp(),
        })
    }
}

impl fmt::Display for CertificateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PEM size: {}", self.pem_size)?;
        writeln!(f, "certificate size: {}", self.der_size)?;
        writeln!(f, "Issuer: {}", self.issuer)?;
        writeln!(f, "Subject: {}", self.subject)?;
        writeln!(f, "Serial: {}", self.serial)?;
        writeln!(
            f,
            "Authority Key ID: {}",
            self.authority_key_id.as_deref().unwrap_or("none")
        )?;
        write!(f, "Public key algorithm: {}", self.public_key_algorithm)
    }
}

fn algorithm_name(oid: &str) -> String {
    match oid {
        "1.3.101.112" => "Ed25519".to_string(),
        "1.2.840.10045.2.1" => "ECDSA".to_string(),
        "1.2.840.113549.1.1.1" => "RSA".to_string(),
        other => other.to_string(),
    }
}

//! PEM framing for signing requests and certificates.

use rustls::pki_types::{CertificateDer, CertificateSigningRequestDer};
use rustls_pemfile::Item;

use crate::error::CertgenError;

/// Decode the first PEM block in `pem` as a certificate signing request.
///
/// Text before the first block is skipped. The first block must carry the
/// `CERTIFICATE REQUEST` label.
pub fn decode_csr(pem: &[u8]) -> Result<CertificateSigningRequestDer<'static>, CertgenError> {
    match first_item(pem)? {
        Item::Csr(der) => Ok(der),
        other => Err(CertgenError::MalformedInput(format!(
            "expected CERTIFICATE REQUEST block, found {}",
            item_label(&other)
        ))),
    }
}

/// Decode the first PEM block in `pem` as an X.509 certificate.
pub fn decode_certificate(pem: &[u8]) -> Result<CertificateDer<'static>, CertgenError> {
    match first_item(pem)? {
        Item::X509Certificate(der) => Ok(der),
        other => Err(CertgenError::MalformedInput(format!(
            "expected CERTIFICATE block, found {}",
            item_label(&other)
        ))),
    }
}

fn first_item(pem: &[u8]) -> Result<Item, CertgenError> {
    let mut reader = std::io::BufReader::new(pem);
    rustls_pemfile::read_one(&mut reader)
        .map_err(|e| CertgenError::MalformedInput(format!("failed to decode PEM: {e}")))?
        .ok_or_else(|| CertgenError::MalformedInput("no PEM block found".to_string()))
}

fn item_label(item: &Item) -> &'static str {
    match item {
        Item::X509Certificate(_) => "CERTIFICATE",
        Item::Csr(_) => "CERTIFICATE REQUEST",
        Item::Crl(_) => "X509 CRL",
        Item::Pkcs1Key(_) => "RSA PRIVATE KEY",
        Item::Pkcs8Key(_) => "PRIVATE KEY",
        Item::Sec1Key(_) => "EC PRIVATE KEY",
        _ => "unsupported block",
    }
}

//! Human-readable view of a certificate signing request.

use std::net::IpAddr;

use serde::Serialize;
use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::prelude::FromDer;

use crate::error::CertgenError;
use crate::pem::decode_csr;
use crate::encode::hex;

/// Parsed fields of a CSR, ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct CsrSummary {
    pub version: u32,
    pub subject: String,
    pub subject_attributes: Vec<NameAttribute>,
    pub public_key_algorithm: String,
    /// Hex of the subject public key bits.
    pub public_key: String,
    pub signature_algorithm: String,
    pub signature: String,
    pub signature_valid: bool,
    pub email_addresses: Vec<String>,
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
}

/// One attribute of a distinguished name.
#[derive(Debug, Clone, Serialize)]
pub struct NameAttribute {
    pub oid: String,
    pub value: String,
}

impl CsrSummary {
    /// Parse a DER-encoded CSR.
    ///
    /// A CSR whose signature does not verify still parses; the outcome is
    /// reported in `signature_valid`.
    pub fn from_der(der: &[u8]) -> Result<Self, CertgenError> {
        let (_, csr) = X509CertificationRequest::from_der(der)
            .map_err(|e| CertgenError::MalformedInput(format!("parse CSR error: {e}")))?;
        let info = &csr.certification_request_info;

        let subject_attributes = info
            .subject
            .iter_attributes()
            .map(|attr| NameAttribute {
                oid: attr.attr_type().to_id_string(),
                value: attr
                    .as_str()
                    .map_or_else(|_| hex(&attr.attr_value().data), ToString::to_string),
            })
            .collect();

        let mut summary = Self {
            version: info.version.0,
            subject: info.subject.to_string(),
            subject_attributes,
            public_key_algorithm: info.subject_pki.algorithm.algorithm.to_id_string(),
            public_key: hex(&info.subject_pki.subject_public_key.data),
            signature_algorithm: csr.signature_algorithm.algorithm.to_id_string(),
            signature: hex(&csr.signature_value.data),
            signature_valid: csr.verify_signature().is_ok(),
            email_addresses: Vec::new(),
            dns_names: Vec::new(),
            ip_addresses: Vec::new(),
        };

        for ext in csr.requested_extensions().into_iter().flatten() {
            if let ParsedExtension::SubjectAlternativeName(san) = ext {
                for name in &san.general_names {
                    match name {
                        GeneralName::RFC822Name(email) => {
                            summary.email_addresses.push((*email).to_string());
                        }
                        GeneralName::DNSName(dns) => summary.dns_names.push((*dns).to_string()),
                        GeneralName::IPAddress(bytes) => {
                            if let Some(ip) = ip_from_bytes(bytes) {
                                summary.ip_addresses.push(ip);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Decode one PEM block and parse it.
    pub fn from_pem(pem: &[u8]) -> Result<Self, CertgenError> {
        let der = decode_csr(pem)?;
        Self::from_der(&der)
    }
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => <[u8; 4]>::try_from(bytes).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(bytes).ok().map(IpAddr::from),
        _ => None,
    }
}

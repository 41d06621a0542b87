//! Self-signed root authority.

use std::fmt;
use std::net::IpAddr;

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
    KeyUsagePurpose, SanType, PKCS_ED25519,
};
use time::OffsetDateTime;
use tracing::debug;
use x509_parser::parse_x509_certificate;

use crate::encode::fingerprint;
use crate::error::CertgenError;
use crate::serial::random_serial;

/// Parameters for a self-signed certificate.
#[derive(Debug, Clone)]
pub struct IssuanceRequest {
    /// Comma-separated hostnames and IP literals.
    pub hosts: String,
    pub organization: String,
    pub valid_from: OffsetDateTime,
    pub valid_until: OffsetDateTime,
    pub is_ca: bool,
}

/// Hosts split into subject alternative name lists.
///
/// Each token is tried as an IP literal first and falls back to a DNS name.
/// Order of appearance is kept within each list and duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostList {
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
}

impl HostList {
    pub fn parse(hosts: &str) -> Result<Self, CertgenError> {
        if hosts.is_empty() {
            return Err(CertgenError::InvalidRequest("no hostname given".to_string()));
        }

        let mut list = Self::default();
        for host in hosts.split(',') {
            if host.is_empty() {
                return Err(CertgenError::InvalidRequest(format!(
                    "empty entry in host list {hosts:?}"
                )));
            }
            match host.parse::<IpAddr>() {
                Ok(ip) => list.ip_addresses.push(ip),
                Err(_) => list.dns_names.push(host.to_string()),
            }
        }
        Ok(list)
    }

    fn subject_alt_names(&self) -> Result<Vec<SanType>, CertgenError> {
        let mut sans = Vec::with_capacity(self.dns_names.len() + self.ip_addresses.len());
        for name in &self.dns_names {
            let name = name.as_str().try_into().map_err(|e: rcgen::Error| {
                CertgenError::InvalidRequest(format!("invalid DNS name {name:?}: {e}"))
            })?;
            sans.push(SanType::DnsName(name));
        }
        sans.extend(self.ip_addresses.iter().copied().map(SanType::IpAddress));
        Ok(sans)
    }
}

/// A self-signed certificate and the key that signed it.
///
/// Immutable once generated. The private key only leaves this value through
/// [`SelfSignedAuthority::key_pem`].
pub struct SelfSignedAuthority {
    key_pair: KeyPair,
    certificate: Certificate,
    cert_pem: String,
    key_pem: String,
    subject: String,
    fingerprint: String,
}

impl SelfSignedAuthority {
    /// Generate a fresh Ed25519 key and self-sign a certificate for `request`.
    pub fn generate(request: &IssuanceRequest) -> Result<Self, CertgenError> {
        let hosts = HostList::parse(&request.hosts)?;

        if request.valid_until <= request.valid_from {
            return Err(CertgenError::InvalidRequest(format!(
                "valid_until ({}) is not after valid_from ({})",
                request.valid_until, request.valid_from
            )));
        }

        let mut params = CertificateParams::default();
        params.serial_number = Some(random_serial()?);

        let mut dn = DistinguishedName::new();
        dn.push(DnType::OrganizationName, request.organization.as_str());
        params.distinguished_name = dn;

        params.not_before = request.valid_from;
        params.not_after = request.valid_until;
        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyCertSign,
        ];
        params.is_ca = if request.is_ca {
            IsCa::Ca(BasicConstraints::Unconstrained)
        } else {
            IsCa::ExplicitNoCa
        };
        params.subject_alt_names = hosts.subject_alt_names()?;

        let key_pair = KeyPair::generate_for(&PKCS_ED25519)
            .map_err(|e| CertgenError::IssuanceFailed(format!("key generation failed: {e}")))?;

        let certificate = params
            .self_signed(&key_pair)
            .map_err(|e| CertgenError::IssuanceFailed(format!("self-signing failed: {e}")))?;

        let subject = {
            let (_, parsed) = parse_x509_certificate(certificate.der()).map_err(|e| {
                CertgenError::IssuanceFailed(format!("generated certificate does not parse: {e}"))
            })?;
            parsed.subject().to_string()
        };

        let cert_pem = certificate.pem();
        let key_pem = key_pair.serialize_pem();
        let fingerprint = fingerprint(certificate.der());

        debug!(
            subject = %subject,
            fingerprint = %fingerprint,
            is_ca = request.is_ca,
            "generated self-signed certificate"
        );

        Ok(Self {
            key_pair,
            certificate,
            cert_pem,
            key_pem,
            subject,
            fingerprint,
        })
    }

    /// DER-encoded certificate.
    pub fn der(&self) -> &[u8] {
        self.certificate.der()
    }

    /// PEM-encoded certificate.
    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    /// PEM-encoded PKCS#8 private key.
    pub fn key_pem(&self) -> &str {
        &self.key_pem
    }

    /// Subject distinguished name in RFC 4514 form.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub(crate) fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub(crate) fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }
}

impl fmt::Debug for SelfSignedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelfSignedAuthority")
            .field("subject", &self.subject)
            .field("fingerprint", &self.fingerprint)
            .field("key_pair", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Create a self-signed certificate and its key.
pub fn generate_self_signed(request: &IssuanceRequest) -> Result<SelfSignedAuthority, CertgenError> {
    SelfSignedAuthority::generate(request)
}

//! CSR validation and leaf certificate issuance.

use std::collections::HashSet;

use rcgen::{
    CertificateParams, CertificateSigningRequestParams, ExtendedKeyUsagePurpose, IsCa,
    KeyUsagePurpose,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};
use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::parse_x509_certificate;
use x509_parser::prelude::FromDer;
use x509_parser::x509::X509Name;

use crate::encode::hex;
use crate::error::CertgenError;
use crate::pem::decode_csr;
use crate::selfsign::SelfSignedAuthority;
use crate::serial::random_serial;

/// Lifetime of every leaf certificate.
pub const LEAF_VALIDITY: Duration = Duration::hours(24);

/// A leaf certificate signed by the authority.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub pem: String,
    pub der: Vec<u8>,
    /// Serial number as lowercase hex.
    pub serial: String,
    /// Subject copied from the CSR, RFC 4514 form.
    pub subject: String,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl SelfSignedAuthority {
    /// Validate a PEM-encoded CSR and issue a leaf certificate for it.
    pub fn sign_request(&self, csr_pem: &[u8]) -> Result<IssuedCertificate, CertgenError> {
        self.sign_request_at(csr_pem, OffsetDateTime::now_utc())
    }

    /// Like [`sign_request`](Self::sign_request) with an explicit issuance time.
    ///
    /// `now` is truncated to whole seconds, the resolution of X.509 validity.
    /// The leaf subject is byte-identical to the CSR subject; a subject that
    /// cannot be carried over unchanged is refused with
    /// [`CertgenError::InvalidRequest`].
    pub fn sign_request_at(
        &self,
        csr_pem: &[u8],
        now: OffsetDateTime,
    ) -> Result<IssuedCertificate, CertgenError> {
        let der = decode_csr(csr_pem)?;

        let (_, csr) = X509CertificationRequest::from_der(&der)
            .map_err(|e| CertgenError::MalformedInput(format!("parse CSR failed: {e}")))?;
        let csr_subject = &csr.certification_request_info.subject;
        let subject = csr_subject.to_string();

        info!(
            subject = %subject,
            signature = %hex(&csr.signature_value.data),
            "received CSR"
        );

        csr.verify_signature()
            .map_err(|e| CertgenError::SignatureInvalid(e.to_string()))?;
        debug!(subject = %subject, "CSR signature ok");

        check_subject_layout(csr_subject)?;

        let request = CertificateSigningRequestParams::from_der(&der)
            .map_err(|e| CertgenError::MalformedInput(format!("unsupported CSR content: {e}")))?;

        let not_before = now - Duration::nanoseconds(i64::from(now.nanosecond()));
        let not_after = not_before + LEAF_VALIDITY;
        let serial = random_serial()?;
        let serial_hex = hex(&serial.to_bytes());

        let mut params = CertificateParams::default();
        params.serial_number = Some(serial);
        params.distinguished_name = request.params.distinguished_name;
        params.not_before = not_before;
        params.not_after = not_after;
        params.is_ca = IsCa::NoCa;
        params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ClientAuth];
        params.use_authority_key_identifier_extension = true;

        let certificate = params
            .signed_by(&request.public_key, self.certificate(), self.key_pair())
            .map_err(|e| CertgenError::IssuanceFailed(format!("signing failed: {e}")))?;

        let (_, leaf) = parse_x509_certificate(certificate.der()).map_err(|e| {
            CertgenError::IssuanceFailed(format!("issued certificate unreadable: {e}"))
        })?;
        if leaf.subject().as_raw() != csr_subject.as_raw() {
            return Err(CertgenError::InvalidRequest(format!(
                "subject cannot be reproduced: {subject}"
            )));
        }

        info!(
            serial = %serial_hex,
            subject = %subject,
            not_after = %not_after,
            "issued certificate"
        );

        Ok(IssuedCertificate {
            pem: certificate.pem(),
            der: certificate.der().to_vec(),
            serial: serial_hex,
            subject,
            not_before,
            not_after,
        })
    }
}

/// Refuse subjects the leaf encoder would rewrite: multi-valued RDNs and
/// attribute types that occur more than once.
fn check_subject_layout(subject: &X509Name<'_>) -> Result<(), CertgenError> {
    let mut seen = HashSet::new();
    for rdn in subject.iter() {
        let mut attributes = rdn.iter();
        let (Some(attr), None) = (attributes.next(), attributes.next()) else {
            return Err(CertgenError::InvalidRequest(format!(
                "subject cannot be reproduced: RDN without exactly one attribute in {subject}"
            )));
        };
        let oid = attr.attr_type().to_id_string();
        if !seen.insert(oid.clone()) {
            return Err(CertgenError::InvalidRequest(format!(
                "subject cannot be reproduced: repeated attribute {oid} in {subject}"
            )));
        }
    }
    Ok(())
}

/// Validate a PEM-encoded CSR and return the PEM-encoded leaf certificate.
pub fn handle_signing_request(
    authority: &SelfSignedAuthority,
    csr_pem: &[u8],
) -> Result<String, CertgenError> {
    authority.sign_request(csr_pem).map(|issued| issued.pem)
}

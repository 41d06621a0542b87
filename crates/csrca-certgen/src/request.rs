//! Client-side CSR construction.

use rcgen::{CertificateParams, DistinguishedName, DnType, DnValue, KeyPair, SanType, PKCS_ED25519};

use crate::error::CertgenError;

/// PKCS#9 `emailAddress` attribute type, 1.2.840.113549.1.9.1.
pub const OID_EMAIL_ADDRESS: &[u64] = &[1, 2, 840, 113549, 1, 9, 1];

/// A freshly generated key pair and the CSR it signed.
#[cfg_attr(test, derive(Debug))]
pub struct SigningRequest {
    pub csr_pem: String,
    pub csr_der: Vec<u8>,
    /// PKCS#8 private key. Stays with the requester.
    pub private_key_pem: String,
    pub public_key_pem: String,
}

/// Generate an Ed25519 key and a CSR for `common_name`.
///
/// The email address goes into the subject as a raw `emailAddress`
/// attribute and is also requested as an RFC 822 subject alternative name.
pub fn build_signing_request(
    common_name: &str,
    email_address: &str,
) -> Result<SigningRequest, CertgenError> {
    let email = rcgen::Ia5String::try_from(email_address).map_err(|e| {
        CertgenError::InvalidRequest(format!("invalid email address {email_address:?}: {e}"))
    })?;

    let key_pair = KeyPair::generate_for(&PKCS_ED25519)
        .map_err(|e| CertgenError::IssuanceFailed(format!("key generation failed: {e}")))?;

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    dn.push(
        DnType::CustomDnType(OID_EMAIL_ADDRESS.to_vec()),
        DnValue::Ia5String(email.clone()),
    );

    let mut params = CertificateParams::default();
    params.distinguished_name = dn;
    params.subject_alt_names = vec![SanType::Rfc822Name(email)];

    let csr = params
        .serialize_request(&key_pair)
        .map_err(|e| CertgenError::IssuanceFailed(format!("failed to sign CSR: {e}")))?;
    let csr_pem = csr
        .pem()
        .map_err(|e| CertgenError::IssuanceFailed(format!("failed to encode CSR: {e}")))?;

    Ok(SigningRequest {
        csr_pem,
        csr_der: csr.der().to_vec(),
        private_key_pem: key_pair.serialize_pem(),
        public_key_pem: key_pair.public_key_pem(),
    })
}

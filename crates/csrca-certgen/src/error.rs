//! Certificate authority errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CertgenError {
    /// The issuance parameters were rejected before any key material was made.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// PEM framing or DER structure could not be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The CSR's proof of possession did not verify.
    #[error("signature check failed: {0}")]
    SignatureInvalid(String),

    #[error("certificate issuance failed: {0}")]
    IssuanceFailed(String),
}

//! Client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Certgen(#[from] csrca_certgen::CertgenError),

    #[error("error performing POST to server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server rejected request with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

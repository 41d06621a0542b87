//! Server errors.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use csrca_certgen::CertgenError;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authority error: {0}")]
    Authority(#[from] CertgenError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rejected signing request, returned to the caller as HTTP 400.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CertgenError);

impl ApiError {
    /// Short client-facing description of the failure class.
    pub fn reason(&self) -> &'static str {
        match self.0 {
            CertgenError::InvalidRequest(_) => "invalid request",
            CertgenError::MalformedInput(_) => "parse CSR failed",
            CertgenError::SignatureInvalid(_) => "signature check failed",
            CertgenError::IssuanceFailed(_) => "error creating certificate",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "{}", self.reason());
        (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", self.reason()),
        )
            .into_response()
    }
}

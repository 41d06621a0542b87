//! Shared request handler state.

use std::sync::Arc;

use csrca_certgen::SelfSignedAuthority;
use time::OffsetDateTime;
use tracing::info;

use crate::config::AuthorityConfig;
use crate::error::ServerError;

/// State injected into every handler.
///
/// The authority is created once and never mutated, so handlers share it
/// without locking.
#[derive(Debug, Clone)]
pub struct AppState {
    pub authority: Arc<SelfSignedAuthority>,
}

impl AppState {
    pub fn new(authority: SelfSignedAuthority) -> Self {
        Self {
            authority: Arc::new(authority),
        }
    }

    /// Mint a fresh in-memory root authority from configuration.
    pub fn from_config(config: &AuthorityConfig) -> Result<Self, ServerError> {
        let request = config.issuance_request(OffsetDateTime::now_utc())?;
        let authority = SelfSignedAuthority::generate(&request)?;
        info!(
            subject = %authority.subject(),
            fingerprint = %authority.fingerprint(),
            hosts = %config.hosts,
            "created self-signed CA certificate"
        );
        Ok(Self::new(authority))
    }
}

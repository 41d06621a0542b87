//! Server configuration loaded from TOML.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use csrca_certgen::IssuanceRequest;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ServerError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub authority: AuthorityConfig,
}

impl Config {
    /// Read a TOML file, or return the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&text)
            .map_err(|e| ServerError::Config(format!("failed to parse {}: {e}", path.display())))
    }
}

/// Listener and request handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Largest accepted request body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr, ServerError> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid bind address {:?}: {e}", self.bind)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            log_level: default_log_level(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Root authority minted at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityConfig {
    #[serde(default = "default_organization")]
    pub organization: String,
    /// Comma-separated hostnames and IP literals.
    #[serde(default = "default_hosts")]
    pub hosts: String,
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,
}

impl AuthorityConfig {
    /// Issuance request for a root valid from `now`.
    pub fn issuance_request(&self, now: OffsetDateTime) -> Result<IssuanceRequest, ServerError> {
        let valid_until = now
            .checked_add(time::Duration::days(i64::from(self.validity_days)))
            .ok_or_else(|| {
                ServerError::Config(format!(
                    "validity_days {} is out of range",
                    self.validity_days
                ))
            })?;
        Ok(IssuanceRequest {
            hosts: self.hosts.clone(),
            organization: self.organization.clone(),
            valid_from: now,
            valid_until,
            is_ca: true,
        })
    }
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            hosts: default_hosts(),
            validity_days: default_validity_days(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8881
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_bytes() -> usize {
    16 * 1024 // 16 KiB
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_organization() -> String {
    "Blind Faith Inc".to_string()
}

fn default_hosts() -> String {
    "localhost,127.0.0.1".to_string()
}

fn default_validity_days() -> u32 {
    365
}

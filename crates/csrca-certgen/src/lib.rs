//! Certificate authority core for csrca.
//!
//! Builds a self-signed root authority, validates incoming certificate
//! signing requests and derives short-lived client certificates from them.
//! Also builds the requester's side of the exchange: a fresh key pair and a
//! CSR carrying a common name and email address.
//!
//! All ASN.1, PEM and signature work is delegated to `rcgen`,
//! `x509-parser` and `rustls-pemfile`.

pub mod encode;
pub mod error;
pub mod inspect;
pub mod issue;
pub mod pem;
pub mod request;
pub mod selfsign;
pub mod serial;

pub use error::CertgenError;
pub use inspect::CsrSummary;
pub use issue::{handle_signing_request, IssuedCertificate, LEAF_VALIDITY};
pub use request::{build_signing_request, SigningRequest};
pub use selfsign::{generate_self_signed, HostList, IssuanceRequest, SelfSignedAuthority};

//! Integration tests for the `/sign` endpoint, driven through the router.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::Engine;
use csrca_certgen::{build_signing_request, IssuanceRequest, SelfSignedAuthority};
use csrca_server::config::ServerConfig;
use csrca_server::{router, AppState, PEM_CONTENT_TYPE, SIGN_PATH};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt; // For `oneshot`
use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::parse_x509_certificate;
use x509_parser::prelude::FromDer;

fn test_state() -> AppState {
    let now = OffsetDateTime::now_utc();
    let authority = SelfSignedAuthority::generate(&IssuanceRequest {
        hosts: "localhost,127.0.0.1".to_string(),
        organization: "Blind Faith Inc".to_string(),
        valid_from: now,
        valid_until: now + Duration::days(365),
        is_ca: true,
    })
    .unwrap();
    AppState::new(authority)
}

fn test_app(state: AppState) -> Router {
    router(state, &ServerConfig::default())
}

fn post_sign(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .uri(SIGN_PATH)
        .method(Method::POST)
        .header(header::CONTENT_TYPE, PEM_CONTENT_TYPE)
        .body(body.into())
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn pem_block(label: &str, der: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(der);
    let mut out = format!("-----BEGIN {label}-----\n");
    for line in encoded.as_bytes().chunks(64) {
        out.push_str(std::str::from_utf8(line).unwrap());
        out.push('\n');
    }
    out.push_str(&format!("-----END {label}-----\n"));
    out
}

#[tokio::test]
async fn valid_csr_is_signed() {
    let state = test_state();
    let (_, ca) = parse_x509_certificate(state.authority.der()).unwrap();
    let app = test_app(state.clone());

    let request = build_signing_request("sample client certificate", "user@example.com").unwrap();
    let response = app.oneshot(post_sign(request.csr_pem)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        PEM_CONTENT_TYPE
    );

    let pem = body_string(response).await;
    assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));

    let der = csrca_certgen::pem::decode_certificate(pem.as_bytes()).unwrap();
    let (_, leaf) = parse_x509_certificate(&der).unwrap();
    assert_eq!(leaf.issuer().to_string(), ca.subject().to_string());
    leaf.verify_signature(Some(ca.public_key())).unwrap();
}

#[tokio::test]
async fn random_bytes_are_rejected() {
    let app = test_app(test_state());

    let garbage: Vec<u8> = (0u8..=255).rev().cycle().take(700).collect();
    let response = app.oneshot(post_sign(garbage)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert_eq!(body, "parse CSR failed\n");
    assert!(!body.contains("BEGIN CERTIFICATE"));
}

#[tokio::test]
async fn tampered_csr_is_rejected() {
    let app = test_app(test_state());

    let request = build_signing_request("tampered", "user@example.com").unwrap();
    let (_, csr) = X509CertificationRequest::from_der(&request.csr_der).unwrap();
    let key = csr
        .certification_request_info
        .subject_pki
        .subject_public_key
        .data
        .to_vec();

    let mut der = request.csr_der.clone();
    let offset = der
        .windows(key.len())
        .position(|w| w == key.as_slice())
        .unwrap();
    der[offset + key.len() - 1] ^= 0x80;

    let response = app
        .oneshot(post_sign(pem_block("CERTIFICATE REQUEST", &der)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert_eq!(body, "signature check failed\n");
}

#[tokio::test]
async fn certificate_instead_of_csr_is_rejected() {
    let state = test_state();
    let ca_pem = state.authority.cert_pem().to_string();
    let app = test_app(state);

    let response = app.oneshot(post_sign(ca_pem)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = router(
        test_state(),
        &ServerConfig {
            max_body_bytes: 256,
            ..ServerConfig::default()
        },
    );

    let response = app.oneshot(post_sign(vec![b'A'; 4096])).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn stalled_body_times_out() {
    let app = router(
        test_state(),
        &ServerConfig {
            request_timeout_secs: 1,
            ..ServerConfig::default()
        },
    );

    // A body that never yields a chunk or finishes.
    let stalled = futures::stream::pending::<Result<Vec<u8>, std::io::Error>>();
    let response = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        app.oneshot(post_sign(Body::from_stream(stalled))),
    )
    .await
    .expect("timeout layer did not answer")
    .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn get_is_not_allowed() {
    let app = test_app(test_state());

    let request = Request::builder()
        .uri(SIGN_PATH)
        .method(Method::GET)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn concurrent_requests_share_authority() {
    let state = test_state();
    let app = test_app(state);

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let request =
                build_signing_request(&format!("client {i}"), "user@example.com").unwrap();
            let response = app.oneshot(post_sign(request.csr_pem)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            body_string(response).await
        }));
    }

    let mut serials = Vec::new();
    for handle in handles {
        let pem = handle.await.unwrap();
        let der = csrca_certgen::pem::decode_certificate(pem.as_bytes()).unwrap();
        let (_, leaf) = parse_x509_certificate(&der).unwrap();
        serials.push(leaf.raw_serial().to_vec());
    }
    serials.sort();
    serials.dedup();
    assert_eq!(serials.len(), 8);
}

//! End-to-end test: real client against a real server on loopback.

use std::net::SocketAddr;
use std::time::Duration;

use csrca_client::{CertificateReport, ClientError, SignClient};
use csrca_server::config::AuthorityConfig;
use csrca_server::{AppState, Config, SIGN_PATH};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    url: String,
    authority_subject: String,
    shutdown: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let config = Config::default();
        let state = AppState::from_config(&AuthorityConfig::default()).unwrap();
        let authority_subject = state.authority.subject().to_string();

        let bind_addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = TcpListener::bind(bind_addr).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            csrca_server::serve(listener, state, &config, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        Self {
            url: format!("http://{addr}{SIGN_PATH}"),
            authority_subject,
            shutdown,
            handle,
        }
    }

    async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

#[tokio::test]
async fn client_obtains_certificate() {
    let server = TestServer::start().await;

    let request =
        csrca_certgen::build_signing_request("sample client certificate", "user@example.com")
            .unwrap();
    let csr = csrca_certgen::CsrSummary::from_pem(request.csr_pem.as_bytes()).unwrap();

    let client = SignClient::new(server.url.clone()).unwrap();
    let before = time::OffsetDateTime::now_utc().unix_timestamp();
    let pem = client.submit(&request.csr_pem).await.unwrap();
    let after = time::OffsetDateTime::now_utc().unix_timestamp();

    let report = CertificateReport::from_pem(&pem).unwrap();
    assert_eq!(report.subject, csr.subject);
    assert_eq!(report.issuer, server.authority_subject);
    assert_eq!(report.issuer, "O=Blind Faith Inc");
    assert_eq!(report.not_after - report.not_before, 24 * 60 * 60);
    assert!(report.not_before >= before && report.not_before <= after);
    assert!(report.authority_key_id.is_some());
    assert_eq!(report.public_key_algorithm, "Ed25519");
    assert_eq!(report.pem_size, pem.len());

    server.stop().await;
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let server = TestServer::start().await;

    let client = SignClient::new(server.url.clone()).unwrap();
    let err = client
        .submit("this is not a certificate signing request")
        .await
        .unwrap_err();
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "parse CSR failed");
        }
        other => panic!("expected status error, got {other:?}"),
    }

    server.stop().await;
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SignClient::new(format!("http://{addr}{SIGN_PATH}")).unwrap();
    let request = csrca_certgen::build_signing_request("nobody", "nobody@example.com").unwrap();
    let err = client.submit(&request.csr_pem).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

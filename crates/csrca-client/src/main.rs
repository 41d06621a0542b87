//! csrca-client: generate a key and CSR, have the server sign it.

use clap::Parser;
use csrca_client::{CertificateReport, SignClient, DEFAULT_SIGN_URL};

#[derive(Parser)]
#[command(
    name = "csrca-client",
    about = "Request a client certificate from a csrca server",
    version
)]
struct Cli {
    /// Signing endpoint.
    #[arg(long, default_value = DEFAULT_SIGN_URL)]
    url: String,

    /// Subject common name.
    #[arg(long, default_value = "sample client certificate")]
    common_name: String,

    /// Email address placed in the subject.
    #[arg(long, default_value = "user@example.com")]
    email: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let request = csrca_certgen::build_signing_request(&cli.common_name, &cli.email)?;
    println!("{}", request.public_key_pem);
    println!("{}", request.private_key_pem);
    println!("csrBytes size: {}", request.csr_der.len());
    println!("  csrPEM size: {}\n", request.csr_pem.len());
    println!("{}", request.csr_pem);

    let client = SignClient::new(&cli.url)?;
    let certificate_pem = client.submit(&request.csr_pem).await?;
    println!("Client certificate signed by server:\n{certificate_pem}");

    let report = CertificateReport::from_pem(&certificate_pem)?;
    println!("{report}");

    Ok(())
}

//! csrca-server: demo certificate authority over HTTP.

use std::path::PathBuf;

use clap::Parser;
use csrca_server::{AppState, Config};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "csrca-server",
    about = "Sign CSRs with a throwaway self-signed root",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let state = AppState::from_config(&config.authority)?;

    let addr = config.server.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;

    csrca_server::serve(listener, state, &config, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown requested");
    })
    .await?;

    Ok(())
}

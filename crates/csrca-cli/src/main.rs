//! csrparse: check that a CSR file parses and dump what is in it.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use csrca_certgen::CsrSummary;
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "csrparse",
    about = "Parse a PEM certificate signing request and print it as JSON",
    version
)]
struct Cli {
    /// CSR file.
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let data = std::fs::read(&cli.file)
        .with_context(|| format!("error reading file {}", cli.file.display()))?;
    tracing::debug!(file = %cli.file.display(), bytes = data.len(), "read CSR file");

    let summary = CsrSummary::from_pem(&data).context("parse CSR error")?;
    print!("{}", to_json(&summary)?);

    Ok(())
}

/// Pretty JSON with four-space indentation.
fn to_json(summary: &CsrSummary) -> anyhow::Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    summary
        .serialize(&mut serializer)
        .context("JSON error")?;
    String::from_utf8(out).context("JSON error")
}

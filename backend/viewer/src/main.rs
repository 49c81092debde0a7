use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing::debug;

#[derive(Parser)]
#[command(name = "linelog-view")]
#[command(about = "Render linelog JSON lines from stdin as colorized text")]
#[command(version)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    let _cli = Cli::parse();

    // Diagnostics only; rendered records are written directly.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Let Ctrl+C stop the upstream producer without killing us mid-pipe.
    if !std::io::stdin().is_terminal() {
        ignore_interrupts()?;
    }

    linelog_viewer::run(
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        std::io::stderr(),
    )
    .await
}

#[cfg(unix)]
fn ignore_interrupts() -> Result<()> {
    use anyhow::Context;
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupts =
        signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    tokio::spawn(async move {
        while interrupts.recv().await.is_some() {
            debug!("Ignoring SIGINT while reading from a pipe");
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn ignore_interrupts() -> Result<()> {
    tokio::spawn(async {
        while tokio::signal::ctrl_c().await.is_ok() {
            debug!("Ignoring Ctrl+C while reading from a pipe");
        }
    });
    Ok(())
}

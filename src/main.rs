//! Command-line entry point for logspray.
//!
//! ```bash
//! # Generate logs per the policies in logspray.json
//! logspray -f logspray.json
//!
//! # YAML works too; -v raises the log level
//! logspray -f logspray.yaml -v debug
//! ```

use anyhow::Context;
use clap::Parser;

use logspray::cli::Cli;
use logspray::config::SpoutConfig;
use logspray::spout::Spout;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = SpoutConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let spout = Spout::build(config, &cli.config)
        .await
        .context("failed to build spout")?;

    spout.run().await;
    Ok(())
}

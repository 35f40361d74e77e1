//! CLI argument definitions for logspray.

use clap::Parser;
use std::path::PathBuf;

/// Synthesize high-volume machine log streams for load testing.
#[derive(Parser)]
#[command(name = "logspray")]
#[command(about = "Generate machine logs from seed lines and replacement policies")]
#[command(version)]
pub struct Cli {
    /// Configuration file, JSON or YAML by extension
    #[arg(short = 'f', long = "config", default_value = "logspray.json")]
    pub config: PathBuf,

    /// Log level: trace, debug, info, warn, error (RUST_LOG overrides)
    #[arg(short = 'v', long = "log-level", default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["logspray"]);
        assert_eq!(cli.config, PathBuf::from("logspray.json"));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_explicit_arguments() {
        let cli = Cli::parse_from(["logspray", "-f", "spout.yaml", "-v", "debug"]);
        assert_eq!(cli.config, PathBuf::from("spout.yaml"));
        assert_eq!(cli.log_level, "debug");
    }
}

//! formsync - Mirror QingFlow form submissions into a Lark Bitable table
//!
//! # Usage
//!
//! ```bash
//! # Run the periodic sync (default)
//! formsync
//! formsync --config /etc/formsync/config.toml
//!
//! # Fetch one record, print what would be written, and exit
//! formsync --dry-run
//! DRY_RUN=true formsync
//! ```

mod cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::BoolishValueParser;
use formsync_config::{Config, LogFormat};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// formsync - Mirror QingFlow form submissions into a Lark Bitable table
#[derive(Parser, Debug)]
#[command(name = "formsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (.toml, or .json for the legacy layout)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Force debug logging
    #[arg(long, env = "DEBUG", value_parser = BoolishValueParser::new())]
    debug: bool,

    /// Fetch a single record, print its transformed fields and exit
    #[arg(long, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let log_level = resolve_log_level(cli.debug, cli.log_level.as_deref(), &config);
    init_logging(&log_level, config.log.format)?;

    if cli.dry_run {
        cmd::dry_run::run(config).await
    } else {
        cmd::run::run(config).await
    }
}

/// Resolve log level: --debug > --log-level > config file > default "info"
fn resolve_log_level(debug: bool, cli_level: Option<&str>, config: &Config) -> String {
    if debug {
        return "debug".to_string();
    }

    if let Some(level) = cli_level {
        return level.to_string();
    }

    config.log.level.clone()
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}

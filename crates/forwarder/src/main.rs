//! sysfwd - Syslog forwarding agent
//!
//! Relays the local syslog socket and a tree of log files to a remote
//! syslog drain, without ever writing the logs to local disk.
//!
//! # Usage
//!
//! ```bash
//! # Run the forwarder (default)
//! sysfwd --config /etc/sysfwd/config.toml
//!
//! # Validate a config and print what would run
//! sysfwd check --config /etc/sysfwd/config.toml
//! ```

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sysfwd_config::{LogConfig, LogFormat, LogOutput};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// sysfwd - Syslog forwarding agent
#[derive(Parser, Debug)]
#[command(name = "sysfwd")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = cmd::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the forwarder
    Serve,

    /// Validate the configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Check only prints to stdout
        Some(Command::Check) => cmd::check::run(&cli.config),
        Some(Command::Serve) | None => {
            let config = cmd::load_config(&cli.config)?;
            init_logging(&config.log, cli.log_level.as_deref())?;
            cmd::serve::run(config, &cli.config).await
        }
    }
}

/// Initialize the tracing subscriber for logging
///
/// Level: CLI flag > `RUST_LOG` > config file.
fn init_logging(log: &LogConfig, cli_level: Option<&str>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("invalid log level '{}': {}", level, e))?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(log.level.as_str()))
            .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    match (log.format, log.output) {
        (LogFormat::Console, LogOutput::Stderr) => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        (LogFormat::Console, LogOutput::Stdout) => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stdout))
            .init(),
        (LogFormat::Json, LogOutput::Stderr) => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        (LogFormat::Json, LogOutput::Stdout) => registry
            .with(fmt::layer().json().with_writer(std::io::stdout))
            .init(),
    }

    Ok(())
}

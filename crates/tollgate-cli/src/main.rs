mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Prefer RUST_LOG from env, otherwise use the provided level.
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.format.unwrap_or_default();
    let session_config = config::load(&cli.config)?;
    tracing::debug!(config = ?session_config, "Loaded session configuration");

    match &cli.command {
        Commands::Issue(args) => {
            commands::issue::issue(&session_config, args, format).await?;
        }
        Commands::Inspect(args) => {
            commands::inspect::inspect(&session_config, args, format)?;
        }
        Commands::CheckConfig => {
            commands::check_config::check_config(&session_config, format)?;
        }
    }

    Ok(())
}

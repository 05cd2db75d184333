//! Undertow CLI - Command-line interface
//!
//! Provides command-line access to Undertow operations.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use undertow_core::tracing_setup::{self, CliLogLevel};

#[derive(Parser)]
#[command(name = "undertow")]
#[command(about = "Drive a remote torrent daemon: add torrents and inspect status")]
struct Cli {
    /// Console log level
    #[arg(long, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    /// Also write a full TRACE log into this directory
    #[arg(long)]
    debug_log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    tracing_setup::init_tracing(
        cli.log_level.as_tracing_level(),
        cli.debug_log_dir.as_deref(),
    )?;

    commands::handle_command(cli.command).await?;

    Ok(())
}

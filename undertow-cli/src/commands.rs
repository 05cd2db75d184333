//! CLI command implementations

use std::sync::Arc;

use clap::Subcommand;
use undertow_core::config::UndertowConfig;
use undertow_core::daemon::{TorrentId, TransmissionClient};
use undertow_core::fetch::HttpFetcher;
use undertow_core::handler::{
    AddHandler, AddInput, AddReport, AddSource, GetHandler, GetInput, Handler,
};
use undertow_core::workflow::{AddError, AddOutcome, AddWorkflow};
use undertow_core::{Result, StatusSelector, UndertowError};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Add torrents by URL, magnet link, or fetched .torrent file
    Add {
        /// Torrent sources (URLs or magnet links)
        #[arg(required = true)]
        sources: Vec<String>,
        /// Download directory passed to the daemon
        #[arg(short, long)]
        download_dir: Option<String>,
        /// Download group passed to the daemon
        #[arg(short, long)]
        group: Option<String>,
        /// Fetch HTTP(S) sources and submit them as files
        #[arg(short, long)]
        fetch: bool,
    },
    /// List torrents known to the daemon
    List {
        /// Only list torrents in this state (e.g. seeding, downloading)
        #[arg(short, long, default_value = "all")]
        status: String,
        /// Narrow to specific torrent ids
        #[arg(short, long)]
        ids: Vec<i64>,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> Result<()> {
    let config = UndertowConfig::from_env();
    let client = Arc::new(TransmissionClient::new(&config.daemon));

    match command {
        Commands::Add {
            sources,
            download_dir,
            group,
            fetch,
        } => add_torrents(config, client, sources, download_dir, group, fetch).await,
        Commands::List { status, ids } => list_torrents(client, status, ids).await,
    }
}

/// Add one or more torrents and print the resolved records.
///
/// # Errors
/// - `UndertowError::Add` - a single-source add failed; batch failures are
///   printed per item instead
async fn add_torrents(
    config: UndertowConfig,
    client: Arc<TransmissionClient>,
    sources: Vec<String>,
    download_dir: Option<String>,
    group: Option<String>,
    fetch: bool,
) -> Result<()> {
    let fetcher = HttpFetcher::new(&config.fetch);
    let workflow = AddWorkflow::new(client, fetcher, config.workflow);
    let handler = AddHandler::new(workflow);

    let sources = if sources.len() == 1 {
        AddSource::Single(sources.into_iter().next().unwrap_or_default())
    } else {
        AddSource::Many(sources)
    };

    let report = handler
        .handle(AddInput {
            sources,
            download_dir,
            download_group: group,
            fetch_before_add: fetch,
        })
        .await?;

    match report {
        AddReport::Single(outcome) => print_outcome(&outcome),
        AddReport::Batch(results) => {
            for (index, result) in results.iter().enumerate() {
                match result {
                    Ok(outcome) => print_outcome(outcome),
                    Err(error) => println!("Item {index} failed: {}", chain(error)),
                }
            }
        }
    }

    Ok(())
}

/// List torrents, optionally narrowed by status and ids.
///
/// # Errors
/// - `UndertowError::UnknownSelector` - the status name is not recognized
/// - `UndertowError::Daemon` - the daemon could not be queried
async fn list_torrents(
    client: Arc<TransmissionClient>,
    status: String,
    ids: Vec<i64>,
) -> Result<()> {
    let selector: StatusSelector = status
        .parse()
        .map_err(|_| UndertowError::UnknownSelector { name: status })?;

    let handler = GetHandler::new(client);
    let ids = if ids.is_empty() {
        None
    } else {
        Some(ids.into_iter().map(TorrentId::new).collect())
    };

    let output = handler.handle(GetInput { ids, selector }).await?;

    if output.torrents.is_empty() {
        println!("No torrents matched");
        return Ok(());
    }

    for record in &output.torrents {
        println!(
            "{:>5}  {:<15}  {}",
            record.id.as_i64(),
            record.status.name(),
            record.name.as_deref().unwrap_or("<unnamed>")
        );
    }

    Ok(())
}

fn print_outcome(outcome: &AddOutcome) {
    println!(
        "Added torrent {} ({}): {}",
        outcome.record.id,
        outcome.record.status,
        outcome.record.name.as_deref().unwrap_or("<unnamed>")
    );
    if let Some(cleanup) = &outcome.cleanup {
        println!("  warning: {cleanup}");
    }
}

/// Formats an error with its source chain for terminal output.
fn chain(error: &AddError) -> String {
    use std::error::Error as _;

    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}

//! Single-item add workflow.
//!
//! Runs the dependent steps of one add operation (optional fetch of a
//! `.torrent` file, submission to the daemon, resolution of the assigned id
//! into a full record) and guarantees that a scratch file, once created,
//! receives exactly one deletion attempt on every exit path.

use std::path::{Path, PathBuf};

use super::{AddError, AddPhase, CleanupError};
use crate::config::WorkflowConfig;
use crate::daemon::{AddOptions, DaemonError, RemoteClient, TorrentId, TorrentRecord};
use crate::fetch::{TorrentFetcher, scratch_path};

/// One torrent to add.
#[derive(Debug, Clone)]
pub struct AddRequest {
    /// URL, magnet link, or local file path
    pub source: String,
    /// Options forwarded to the daemon
    pub options: AddOptions,
    /// Whether an HTTP(S) source should be fetched and submitted as a file
    pub fetch_before_add: bool,
}

impl AddRequest {
    /// Creates a request with empty options and no pre-fetch.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            options: AddOptions::default(),
            fetch_before_add: false,
        }
    }
}

/// Result of a successful add run.
#[derive(Debug)]
pub struct AddOutcome {
    /// The resolved torrent record
    pub record: TorrentRecord,
    /// Non-fatal scratch-file cleanup failure, if any
    pub cleanup: Option<CleanupError>,
}

/// Scratch file owned by one add run.
///
/// Created by the fetch step and never shared across runs. Removal consumes
/// the ownership, so a second deletion attempt cannot be expressed.
#[derive(Debug)]
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file, reporting a failure without propagating it.
    async fn remove(self) -> Option<CleanupError> {
        tracing::debug!(phase = %AddPhase::Cleanup, "Removing scratch file {}", self.path.display());
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => None,
            Err(source) => {
                let error = CleanupError {
                    path: self.path,
                    source,
                };
                tracing::warn!("{error}");
                Some(error)
            }
        }
    }
}

/// Executes add operations against the remote daemon.
///
/// Generic over the daemon client and the fetcher so real and mock
/// implementations drive the same workflow logic.
pub struct AddWorkflow<C: RemoteClient, F: TorrentFetcher> {
    client: C,
    fetcher: F,
    config: WorkflowConfig,
}

impl<C: RemoteClient, F: TorrentFetcher> AddWorkflow<C, F> {
    /// Creates a workflow writing scratch files under `config.scratch_dir`.
    pub fn new(client: C, fetcher: F, config: WorkflowConfig) -> Self {
        Self {
            client,
            fetcher,
            config,
        }
    }

    /// Runs one add operation to a terminal state.
    ///
    /// The source is trimmed of surrounding whitespace before use; an empty
    /// source passes through to the daemon unmodified. The source is fetched
    /// first only when `fetch_before_add` is set and it carries an HTTP(S)
    /// scheme; everything else is submitted as a URL/magnet.
    ///
    /// # Errors
    /// - `AddError::Fetch` - downloading the `.torrent` file failed
    /// - `AddError::Submit` - the daemon rejected the add
    /// - `AddError::Resolve` - the added torrent could not be read back
    pub async fn run(&self, request: AddRequest) -> Result<AddOutcome, AddError> {
        let source = request.source.trim();
        let options = self.effective_options(&request.options);

        if request.fetch_before_add && is_http_source(source) {
            self.add_from_fetched_file(source, &options).await
        } else {
            self.add_from_url(source, &options).await
        }
    }

    /// Direct path: submit the source string, then resolve the record.
    async fn add_from_url(
        &self,
        source: &str,
        options: &AddOptions,
    ) -> Result<AddOutcome, AddError> {
        tracing::debug!(phase = %AddPhase::Submitting, "Adding torrent source: {source}");
        let id = self
            .client
            .add_url(source, options)
            .await
            .map_err(AddError::Submit)?;

        let record = self.resolve(id).await?;
        Ok(AddOutcome {
            record,
            cleanup: None,
        })
    }

    /// Fetch path: download the file, submit it, resolve, then remove the
    /// scratch file exactly once whatever submit/resolve did.
    async fn add_from_fetched_file(
        &self,
        source: &str,
        options: &AddOptions,
    ) -> Result<AddOutcome, AddError> {
        let scratch = self.fetch(source).await?;

        tracing::debug!(
            phase = %AddPhase::Submitting,
            "Adding fetched torrent file: {}",
            scratch.path().display()
        );
        let id = match self.client.add_file(scratch.path(), options).await {
            Ok(id) => id,
            Err(error) => {
                let _ = scratch.remove().await;
                return Err(AddError::Submit(error));
            }
        };

        let resolved = self.resolve(id).await;
        let cleanup = scratch.remove().await;
        match resolved {
            Ok(record) => Ok(AddOutcome { record, cleanup }),
            Err(error) => Err(error),
        }
    }

    /// Downloads the source into the scratch directory, acquiring scratch-file
    /// ownership. On failure there is nothing to clean: creation was never
    /// confirmed.
    async fn fetch(&self, source: &str) -> Result<ScratchFile, AddError> {
        let dest = scratch_path(&self.config.scratch_dir, source);
        tracing::debug!(phase = %AddPhase::Fetching, "Fetching {source} to {}", dest.display());

        self.fetcher
            .fetch(source, &dest)
            .await
            .map_err(|error| AddError::Fetch {
                url: source.to_string(),
                source: error,
            })?;

        Ok(ScratchFile { path: dest })
    }

    /// Reads the full record back for a freshly assigned id.
    async fn resolve(&self, id: TorrentId) -> Result<TorrentRecord, AddError> {
        tracing::debug!(phase = %AddPhase::Resolving, "Resolving torrent {id}");
        let mut torrents = self
            .client
            .torrents(Some(&[id]))
            .await
            .map_err(|source| AddError::Resolve { id, source })?;

        if torrents.is_empty() {
            return Err(AddError::Resolve {
                id,
                source: DaemonError::NotFound { id },
            });
        }
        Ok(torrents.swap_remove(0))
    }

    /// Fills in the configured default download directory when the request
    /// does not carry one.
    fn effective_options(&self, options: &AddOptions) -> AddOptions {
        let mut options = options.clone();
        if options.download_dir.is_none() {
            options.download_dir = self.config.default_download_dir.clone();
        }
        options
    }
}

/// Whether the source names an HTTP(S) resource that can be pre-fetched.
fn is_http_source(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

//! Fetching `.torrent` files over HTTP into the scratch directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::FetchConfig;

/// Errors that can occur while downloading a `.torrent` file.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("Fetch of {url} returned HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to write fetched file")]
    Io(#[from] std::io::Error),
}

/// Capability to download a URL to a local file.
///
/// Single attempt, no built-in retry; retry policy belongs to callers.
#[async_trait]
pub trait TorrentFetcher: Send + Sync {
    /// Downloads `url` to `dest`, reporting completion or failure.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// HTTP fetcher backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the configured timeout and user agent.
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(config.request_timeout)
                .user_agent(config.user_agent)
                .build()
                .expect("HTTP client creation should not fail"),
        }
    }
}

#[async_trait]
impl TorrentFetcher for HttpFetcher {
    /// Downloads the response body to the destination path.
    ///
    /// # Errors
    /// - `FetchError::Http` - transport failure
    /// - `FetchError::HttpStatus` - server answered with a non-success status
    /// - `FetchError::Io` - destination file could not be written
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        tracing::debug!("Fetching torrent file: {url}");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Fetch of {url} failed with status {status}");
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        tokio::fs::write(dest, &body).await?;
        tracing::debug!("Fetched {} bytes to {}", body.len(), dest.display());
        Ok(())
    }
}

/// Derives the scratch file name for a source URL.
///
/// Uses the trailing path segment; a source with no separator names the file
/// after the whole source string.
pub fn scratch_file_name(source: &str) -> &str {
    source.rsplit('/').next().unwrap_or(source)
}

/// Joins the derived file name onto the scratch directory.
pub fn scratch_path(scratch_dir: &Path, source: &str) -> PathBuf {
    scratch_dir.join(scratch_file_name(source))
}

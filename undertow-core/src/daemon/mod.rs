//! Remote torrent-daemon types and client interface

pub mod client;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::TransmissionClient;

/// Daemon-assigned torrent identifier.
///
/// Issued by the daemon when a torrent is added and used to address it in
/// subsequent requests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TorrentId(i64);

impl TorrentId {
    /// Creates TorrentId from the daemon's integer identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying identifier as i64.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TorrentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Torrent lifecycle states reported by the daemon.
///
/// Wire values follow the daemon's numeric status enumeration; names follow
/// its lowercase hyphenated vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TorrentStatus {
    Stopped,
    QueuedVerify,
    Verifying,
    QueuedDownload,
    Downloading,
    QueuedSeed,
    Seeding,
}

impl TorrentStatus {
    /// Looks up a status by its daemon-reported name.
    ///
    /// `paused` is accepted as an alias for the stopped state and `checking`
    /// for the verifying state.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stopped" | "paused" => Some(Self::Stopped),
            "queued-verify" => Some(Self::QueuedVerify),
            "verifying" | "checking" => Some(Self::Verifying),
            "queued-download" => Some(Self::QueuedDownload),
            "downloading" => Some(Self::Downloading),
            "queued-seed" => Some(Self::QueuedSeed),
            "seeding" => Some(Self::Seeding),
            _ => None,
        }
    }

    /// Returns the canonical status name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::QueuedVerify => "queued-verify",
            Self::Verifying => "verifying",
            Self::QueuedDownload => "queued-download",
            Self::Downloading => "downloading",
            Self::QueuedSeed => "queued-seed",
            Self::Seeding => "seeding",
        }
    }
}

impl fmt::Display for TorrentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<i64> for TorrentStatus {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Stopped),
            1 => Ok(Self::QueuedVerify),
            2 => Ok(Self::Verifying),
            3 => Ok(Self::QueuedDownload),
            4 => Ok(Self::Downloading),
            5 => Ok(Self::QueuedSeed),
            6 => Ok(Self::Seeding),
            other => Err(format!("Unknown torrent status value: {other}")),
        }
    }
}

impl From<TorrentStatus> for i64 {
    fn from(status: TorrentStatus) -> Self {
        match status {
            TorrentStatus::Stopped => 0,
            TorrentStatus::QueuedVerify => 1,
            TorrentStatus::Verifying => 2,
            TorrentStatus::QueuedDownload => 3,
            TorrentStatus::Downloading => 4,
            TorrentStatus::QueuedSeed => 5,
            TorrentStatus::Seeding => 6,
        }
    }
}

/// Torrent record returned by the daemon.
///
/// Only `id` and `status` are interpreted here; the remaining fields pass
/// through for downstream consumers and default when the daemon omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentRecord {
    pub id: TorrentId,
    pub status: TorrentStatus,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hash_string: Option<String>,
    #[serde(default)]
    pub download_dir: Option<String>,
    #[serde(default)]
    pub percent_done: Option<f64>,
    #[serde(default)]
    pub rate_download: Option<i64>,
    #[serde(default)]
    pub rate_upload: Option<i64>,
    #[serde(default)]
    pub error_string: Option<String>,
    #[serde(default)]
    pub added_date: Option<i64>,
}

/// Options forwarded with an add request.
///
/// Field names map to the daemon's wire keys; absent fields are omitted so
/// daemon defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOptions {
    #[serde(rename = "download-dir", skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,
    #[serde(rename = "downloadGroup", skip_serializing_if = "Option::is_none")]
    pub download_group: Option<String>,
}

impl AddOptions {
    /// Returns true when no option is set.
    pub fn is_empty(&self) -> bool {
        self.download_dir.is_none() && self.download_group.is_none()
    }
}

/// Errors from communication with the remote daemon.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("Daemon request failed")]
    Http(#[from] reqwest::Error),

    #[error("Daemon returned HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("Daemon rejected request: {reason}")]
    Rejected { reason: String },

    #[error("Malformed daemon response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Torrent {id} not found")]
    NotFound { id: TorrentId },

    #[error("Session handshake with daemon failed")]
    SessionHandshake,

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Client interface to the remote torrent daemon.
///
/// The workflow engine only sees this trait; mock implementations back the
/// tests.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Adds a torrent by URL or magnet link, returning the daemon-assigned id.
    async fn add_url(&self, url: &str, options: &AddOptions) -> Result<TorrentId, DaemonError>;

    /// Adds a torrent from a local `.torrent` file, returning the
    /// daemon-assigned id.
    async fn add_file(&self, path: &Path, options: &AddOptions) -> Result<TorrentId, DaemonError>;

    /// Fetches torrent records, optionally narrowed to specific ids.
    async fn torrents(&self, ids: Option<&[TorrentId]>) -> Result<Vec<TorrentRecord>, DaemonError>;
}

#[async_trait]
impl<T: RemoteClient + ?Sized> RemoteClient for Arc<T> {
    async fn add_url(&self, url: &str, options: &AddOptions) -> Result<TorrentId, DaemonError> {
        (**self).add_url(url, options).await
    }

    async fn add_file(&self, path: &Path, options: &AddOptions) -> Result<TorrentId, DaemonError> {
        (**self).add_file(path, options).await
    }

    async fn torrents(&self, ids: Option<&[TorrentId]>) -> Result<Vec<TorrentRecord>, DaemonError> {
        (**self).torrents(ids).await
    }
}

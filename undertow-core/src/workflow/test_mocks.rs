//! Mock collaborators for workflow tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::daemon::{
    AddOptions, DaemonError, RemoteClient, TorrentId, TorrentRecord, TorrentStatus,
};
use crate::fetch::{FetchError, TorrentFetcher};

/// Builds a record with the given id and status and all other fields unset.
pub fn test_record(id: i64, status: TorrentStatus) -> TorrentRecord {
    TorrentRecord {
        id: TorrentId::new(id),
        status,
        name: None,
        hash_string: None,
        download_dir: None,
        percent_done: None,
        rate_download: None,
        rate_upload: None,
        error_string: None,
        added_date: None,
    }
}

/// One recorded add submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Url { url: String, options: AddOptions },
    File { path: PathBuf, options: AddOptions },
}

/// Mock daemon client for testing.
///
/// Assigns sequential ids to submissions and resolves them into records whose
/// `name` echoes the submitted source, so tests can match outcomes back to
/// inputs.
#[derive(Debug, Clone)]
pub struct MockRemoteClient {
    next_id: Arc<RwLock<i64>>,
    assigned: Arc<RwLock<HashMap<i64, String>>>,
    submissions: Arc<RwLock<Vec<Submission>>>,
    resolve_calls: Arc<RwLock<Vec<Vec<TorrentId>>>>,
    submit_delays: Arc<RwLock<Vec<(String, Duration)>>>,
    fail_submit_markers: Arc<RwLock<Vec<String>>>,
    records: Arc<RwLock<Vec<TorrentRecord>>>,
    should_fail_resolve: bool,
    resolve_status: TorrentStatus,
}

impl MockRemoteClient {
    /// Creates a mock client assigning ids from 1.
    pub fn new() -> Self {
        Self::new_with_first_id(1)
    }

    /// Creates a mock client assigning ids from the given value.
    pub fn new_with_first_id(first_id: i64) -> Self {
        Self {
            next_id: Arc::new(RwLock::new(first_id)),
            assigned: Arc::new(RwLock::new(HashMap::new())),
            submissions: Arc::new(RwLock::new(Vec::new())),
            resolve_calls: Arc::new(RwLock::new(Vec::new())),
            submit_delays: Arc::new(RwLock::new(Vec::new())),
            fail_submit_markers: Arc::new(RwLock::new(Vec::new())),
            records: Arc::new(RwLock::new(Vec::new())),
            should_fail_resolve: false,
            resolve_status: TorrentStatus::Downloading,
        }
    }

    /// Creates a mock client whose resolve step always fails.
    pub fn new_with_resolve_failure() -> Self {
        Self {
            should_fail_resolve: true,
            ..Self::new()
        }
    }

    /// Makes submissions whose source contains `marker` fail.
    pub async fn fail_submit_on(&self, marker: impl Into<String>) {
        self.fail_submit_markers.write().await.push(marker.into());
    }

    /// Delays submissions whose source contains `marker`.
    pub async fn set_submit_delay(&self, marker: impl Into<String>, delay: Duration) {
        self.submit_delays.write().await.push((marker.into(), delay));
    }

    /// Sets the records returned by an unfiltered get.
    pub async fn set_records(&self, records: Vec<TorrentRecord>) {
        *self.records.write().await = records;
    }

    /// Returns every add submission seen so far.
    pub async fn submissions(&self) -> Vec<Submission> {
        self.submissions.read().await.clone()
    }

    /// Returns the id lists passed to get calls.
    pub async fn resolve_calls(&self) -> Vec<Vec<TorrentId>> {
        self.resolve_calls.read().await.clone()
    }

    async fn submit(&self, source: String) -> Result<TorrentId, DaemonError> {
        let delay = {
            let delays = self.submit_delays.read().await;
            delays
                .iter()
                .find(|(marker, _)| source.contains(marker.as_str()))
                .map(|(_, delay)| *delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let rejected = {
            let markers = self.fail_submit_markers.read().await;
            markers.iter().any(|marker| source.contains(marker.as_str()))
        };
        if rejected {
            return Err(DaemonError::Rejected {
                reason: "mock submit failure".to_string(),
            });
        }

        let mut next_id = self.next_id.write().await;
        let id = *next_id;
        *next_id += 1;
        self.assigned.write().await.insert(id, source);
        Ok(TorrentId::new(id))
    }
}

impl Default for MockRemoteClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteClient for MockRemoteClient {
    async fn add_url(&self, url: &str, options: &AddOptions) -> Result<TorrentId, DaemonError> {
        self.submissions.write().await.push(Submission::Url {
            url: url.to_string(),
            options: options.clone(),
        });
        self.submit(url.to_string()).await
    }

    async fn add_file(&self, path: &Path, options: &AddOptions) -> Result<TorrentId, DaemonError> {
        self.submissions.write().await.push(Submission::File {
            path: path.to_path_buf(),
            options: options.clone(),
        });
        self.submit(path.display().to_string()).await
    }

    async fn torrents(&self, ids: Option<&[TorrentId]>) -> Result<Vec<TorrentRecord>, DaemonError> {
        let Some(ids) = ids else {
            return Ok(self.records.read().await.clone());
        };

        self.resolve_calls.write().await.push(ids.to_vec());
        if self.should_fail_resolve {
            return Err(DaemonError::Rejected {
                reason: "mock resolve failure".to_string(),
            });
        }

        let assigned = self.assigned.read().await;
        Ok(ids
            .iter()
            .map(|id| {
                let mut record = test_record(id.as_i64(), self.resolve_status);
                record.name = assigned.get(&id.as_i64()).cloned();
                record
            })
            .collect())
    }
}

/// Mock fetcher for testing.
#[derive(Debug, Clone)]
pub struct MockFetcher {
    should_fail: bool,
    write_output: bool,
    payload: Vec<u8>,
    calls: Arc<RwLock<Vec<(String, PathBuf)>>>,
}

impl MockFetcher {
    /// Creates a mock fetcher that writes a small payload to the destination.
    pub fn new() -> Self {
        Self {
            should_fail: false,
            write_output: true,
            payload: b"d8:announce0:4:infod4:name4:mocke".to_vec(),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Creates a mock fetcher that fails every fetch.
    pub fn new_with_failure() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    /// Creates a mock fetcher that reports success without writing the file.
    pub fn new_without_output() -> Self {
        Self {
            write_output: false,
            ..Self::new()
        }
    }

    /// Returns every (url, destination) pair fetched so far.
    pub async fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.read().await.clone()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TorrentFetcher for MockFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        self.calls
            .write()
            .await
            .push((url.to_string(), dest.to_path_buf()));

        if self.should_fail {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: 503,
            });
        }
        if self.write_output {
            tokio::fs::write(dest, &self.payload).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_assigns_sequential_ids() {
        let client = MockRemoteClient::new_with_first_id(7);

        let first = client
            .add_url("magnet:?xt=urn:btih:A", &AddOptions::default())
            .await
            .unwrap();
        let second = client
            .add_url("magnet:?xt=urn:btih:B", &AddOptions::default())
            .await
            .unwrap();

        assert_eq!(first, TorrentId::new(7));
        assert_eq!(second, TorrentId::new(8));
        assert_eq!(client.submissions().await.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_client_resolves_name_to_source() {
        let client = MockRemoteClient::new();
        let id = client
            .add_url("magnet:?xt=urn:btih:A", &AddOptions::default())
            .await
            .unwrap();

        let records = client.torrents(Some(&[id])).await.unwrap();
        assert_eq!(records[0].name.as_deref(), Some("magnet:?xt=urn:btih:A"));
        assert_eq!(records[0].status, TorrentStatus::Downloading);
    }

    #[tokio::test]
    async fn test_mock_client_submit_failure() {
        let client = MockRemoteClient::new();
        client.fail_submit_on("bad").await;

        let result = client
            .add_url("magnet:?xt=urn:btih:bad", &AddOptions::default())
            .await;
        assert!(matches!(result, Err(DaemonError::Rejected { .. })));
    }

    #[tokio::test]
    async fn test_mock_fetcher_writes_payload() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mock.torrent");
        let fetcher = MockFetcher::new();

        fetcher.fetch("http://x/mock.torrent", &dest).await.unwrap();

        assert!(dest.exists());
        assert_eq!(fetcher.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_fetcher_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mock.torrent");
        let fetcher = MockFetcher::new_with_failure();

        let result = fetcher.fetch("http://x/mock.torrent", &dest).await;
        assert!(matches!(result, Err(FetchError::HttpStatus { .. })));
        assert!(!dest.exists());
    }
}

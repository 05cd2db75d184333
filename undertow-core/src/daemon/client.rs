//! Transmission RPC client with session handshake and response parsing

use std::path::Path;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{AddOptions, DaemonError, RemoteClient, TorrentId, TorrentRecord};
use crate::config::DaemonConfig;

/// Header carrying the daemon's CSRF session token.
const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Fields requested from `torrent-get`.
const TORRENT_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "hashString",
    "downloadDir",
    "percentDone",
    "rateDownload",
    "rateUpload",
    "errorString",
    "addedDate",
];

/// Transmission RPC client.
///
/// Speaks the daemon's JSON-over-POST protocol against a single endpoint,
/// caching the session token the daemon hands out on the first 409 response.
pub struct TransmissionClient {
    rpc_url: String,
    auth: Option<(String, String)>,
    client: reqwest::Client,
    session_id: RwLock<Option<String>>,
}

/// Envelope of every RPC response.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: String,
    #[serde(default)]
    arguments: Value,
}

impl TransmissionClient {
    /// Creates a client for the configured RPC endpoint.
    ///
    /// Uses daemon configuration for timeout, user agent, and optional
    /// basic-auth credentials.
    pub fn new(config: &DaemonConfig) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            auth: config.credentials.clone(),
            client: reqwest::Client::builder()
                .timeout(config.rpc_timeout)
                .user_agent(config.user_agent)
                .build()
                .expect("HTTP client creation should not fail"),
            session_id: RwLock::new(None),
        }
    }

    /// Issues one RPC call and returns the response arguments.
    ///
    /// A 409 response carries a fresh session token; the request is retried
    /// once with the token attached.
    ///
    /// # Errors
    /// - `DaemonError::Http` - transport failure
    /// - `DaemonError::HttpStatus` - non-success HTTP status
    /// - `DaemonError::SessionHandshake` - 409 without a usable token, or twice
    /// - `DaemonError::Rejected` - daemon reported a non-success result
    /// - `DaemonError::MalformedResponse` - response body did not parse
    async fn call(&self, method: &str, arguments: Value) -> Result<Value, DaemonError> {
        let body = json!({ "method": method, "arguments": arguments });

        let mut response = self.post(&body).await?;
        if response.status().as_u16() == 409 {
            let session_id = response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .ok_or(DaemonError::SessionHandshake)?;
            tracing::debug!("Daemon issued new session id, retrying {method}");
            *self.session_id.write() = Some(session_id);
            response = self.post(&body).await?;
        }

        let status = response.status();
        if status.as_u16() == 409 {
            return Err(DaemonError::SessionHandshake);
        }
        if !status.is_success() {
            tracing::warn!("Daemon {} returned error status: {}", self.rpc_url, status);
            return Err(DaemonError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let rpc: RpcResponse =
            response
                .json()
                .await
                .map_err(|e| DaemonError::MalformedResponse {
                    reason: e.to_string(),
                })?;
        if rpc.result != "success" {
            return Err(DaemonError::Rejected { reason: rpc.result });
        }
        Ok(rpc.arguments)
    }

    /// Sends the request body with session token and credentials attached.
    async fn post(&self, body: &Value) -> Result<reqwest::Response, DaemonError> {
        let mut request = self.client.post(&self.rpc_url).json(body);
        if let Some(session_id) = self.session_id.read().clone() {
            request = request.header(SESSION_ID_HEADER, session_id);
        }
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, Some(password));
        }
        Ok(request.send().await?)
    }

    /// Converts add options into the argument object they serialize to.
    pub(super) fn option_arguments(options: &AddOptions) -> Map<String, Value> {
        match serde_json::to_value(options) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Extracts the daemon-assigned id from a `torrent-add` response.
    ///
    /// A fresh add is reported under `torrent-added`, a re-add of a known
    /// torrent under `torrent-duplicate`; both carry the id.
    pub(super) fn parse_add_response(arguments: &Value) -> Result<TorrentId, DaemonError> {
        let added = arguments
            .get("torrent-added")
            .or_else(|| arguments.get("torrent-duplicate"))
            .ok_or_else(|| DaemonError::MalformedResponse {
                reason: "add response carries neither torrent-added nor torrent-duplicate"
                    .to_string(),
            })?;

        let id = added
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| DaemonError::MalformedResponse {
                reason: "add response is missing the torrent id".to_string(),
            })?;

        Ok(TorrentId::new(id))
    }

    /// Parses the torrent list out of a `torrent-get` response.
    pub(super) fn parse_torrents(mut arguments: Value) -> Result<Vec<TorrentRecord>, DaemonError> {
        let torrents = arguments
            .get_mut("torrents")
            .map(Value::take)
            .ok_or_else(|| DaemonError::MalformedResponse {
                reason: "get response is missing the torrents list".to_string(),
            })?;

        serde_json::from_value(torrents).map_err(|e| DaemonError::MalformedResponse {
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl RemoteClient for TransmissionClient {
    /// Adds a torrent by URL or magnet link.
    ///
    /// # Errors
    /// - `DaemonError::Rejected` - daemon refused the add (e.g. invalid source)
    /// - `DaemonError::Http` / `DaemonError::HttpStatus` - transport failure
    async fn add_url(&self, url: &str, options: &AddOptions) -> Result<TorrentId, DaemonError> {
        let mut arguments = Self::option_arguments(options);
        arguments.insert("filename".to_string(), Value::String(url.to_string()));

        tracing::debug!("Submitting torrent source to daemon: {url}");
        let response = self.call("torrent-add", Value::Object(arguments)).await?;
        Self::parse_add_response(&response)
    }

    /// Adds a torrent by uploading a local `.torrent` file.
    ///
    /// The file is read and submitted as a base64 `metainfo` body.
    ///
    /// # Errors
    /// - `DaemonError::Io` - the file could not be read
    /// - `DaemonError::Rejected` - daemon refused the add (e.g. duplicate)
    async fn add_file(&self, path: &Path, options: &AddOptions) -> Result<TorrentId, DaemonError> {
        let contents = tokio::fs::read(path).await?;
        let mut arguments = Self::option_arguments(options);
        arguments.insert(
            "metainfo".to_string(),
            Value::String(BASE64.encode(contents)),
        );

        tracing::debug!("Submitting torrent file to daemon: {}", path.display());
        let response = self.call("torrent-add", Value::Object(arguments)).await?;
        Self::parse_add_response(&response)
    }

    /// Fetches torrent records, optionally narrowed to specific ids.
    async fn torrents(&self, ids: Option<&[TorrentId]>) -> Result<Vec<TorrentRecord>, DaemonError> {
        let mut arguments = Map::new();
        arguments.insert("fields".to_string(), json!(TORRENT_FIELDS));
        if let Some(ids) = ids {
            let ids: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
            arguments.insert("ids".to_string(), json!(ids));
        }

        let response = self.call("torrent-get", Value::Object(arguments)).await?;
        Self::parse_torrents(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::TorrentStatus;

    #[test]
    fn test_client_construction() {
        let config = DaemonConfig::default();
        let client = TransmissionClient::new(&config);
        assert_eq!(client.rpc_url, "http://127.0.0.1:9091/transmission/rpc");
        assert!(client.session_id.read().is_none());
    }

    #[test]
    fn test_option_arguments() {
        let options = AddOptions {
            download_dir: Some("/srv/media".to_string()),
            download_group: None,
        };
        let arguments = TransmissionClient::option_arguments(&options);
        assert_eq!(arguments.len(), 1);
        assert_eq!(arguments["download-dir"], "/srv/media");

        let empty = TransmissionClient::option_arguments(&AddOptions::default());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_parse_add_response_added() {
        let arguments = json!({ "torrent-added": { "id": 7, "name": "x" } });
        let id = TransmissionClient::parse_add_response(&arguments).unwrap();
        assert_eq!(id, TorrentId::new(7));
    }

    #[test]
    fn test_parse_add_response_duplicate() {
        let arguments = json!({ "torrent-duplicate": { "id": 9 } });
        let id = TransmissionClient::parse_add_response(&arguments).unwrap();
        assert_eq!(id, TorrentId::new(9));
    }

    #[test]
    fn test_parse_add_response_missing_torrent() {
        let result = TransmissionClient::parse_add_response(&json!({}));
        assert!(matches!(
            result.unwrap_err(),
            DaemonError::MalformedResponse { reason } if reason.contains("torrent-added")
        ));
    }

    #[test]
    fn test_parse_add_response_missing_id() {
        let arguments = json!({ "torrent-added": { "name": "x" } });
        let result = TransmissionClient::parse_add_response(&arguments);
        assert!(matches!(
            result.unwrap_err(),
            DaemonError::MalformedResponse { reason } if reason.contains("id")
        ));
    }

    #[test]
    fn test_parse_torrents() {
        let arguments = json!({
            "torrents": [
                { "id": 1, "status": 6, "name": "a" },
                { "id": 2, "status": 0 }
            ]
        });
        let records = TransmissionClient::parse_torrents(arguments).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, TorrentStatus::Seeding);
        assert_eq!(records[1].id, TorrentId::new(2));
    }

    #[test]
    fn test_parse_torrents_missing_list() {
        let result = TransmissionClient::parse_torrents(json!({}));
        assert!(matches!(
            result.unwrap_err(),
            DaemonError::MalformedResponse { reason } if reason.contains("torrents")
        ));
    }
}

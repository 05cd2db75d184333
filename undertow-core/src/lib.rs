//! Undertow Core - torrent-daemon orchestration
//!
//! This crate provides the building blocks for driving a remote torrent
//! daemon: the add workflow (fetch, submit, resolve, clean up), concurrent
//! batching, status filtering, and configuration management.

pub mod config;
pub mod daemon;
pub mod fetch;
pub mod handler;
pub mod status;
pub mod tracing_setup;
pub mod workflow;

// Re-export main types for convenient access
pub use config::UndertowConfig;
pub use daemon::{DaemonError, RemoteClient, TorrentId, TorrentRecord, TorrentStatus};
pub use fetch::{FetchError, HttpFetcher, TorrentFetcher};
pub use status::{StatusSelector, filter_by_status};
pub use workflow::{AddError, AddOutcome, AddRequest, AddWorkflow};

/// Core errors that can bubble up from any Undertow subsystem.
#[derive(Debug, thiserror::Error)]
pub enum UndertowError {
    #[error("Add workflow error: {0}")]
    Add(#[from] AddError),

    #[error("Daemon error: {0}")]
    Daemon(#[from] DaemonError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Unknown status selector: {name}")]
    UnknownSelector { name: String },
}

pub type Result<T> = std::result::Result<T, UndertowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let daemon_error = DaemonError::Rejected {
            reason: "duplicate torrent".to_string(),
        };
        let error = UndertowError::from(AddError::Submit(daemon_error));
        assert!(matches!(error, UndertowError::Add(_)));

        let error = UndertowError::from(DaemonError::SessionHandshake);
        assert!(matches!(error, UndertowError::Daemon(_)));
    }

    #[test]
    fn test_selector_error_display() {
        let error = UndertowError::UnknownSelector {
            name: "sideways".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown status selector: sideways");
    }
}

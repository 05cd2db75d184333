//! Centralized configuration for Undertow.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Central configuration for all Undertow components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct UndertowConfig {
    pub daemon: DaemonConfig,
    pub fetch: FetchConfig,
    pub workflow: WorkflowConfig,
}

/// Remote daemon RPC configuration.
///
/// Controls the endpoint, credentials, and HTTP parameters for
/// communication with the torrent daemon.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Optional basic-auth credentials (user, password)
    pub credentials: Option<(String, String)>,
    /// HTTP request timeout for RPC calls
    pub rpc_timeout: Duration,
    /// User agent for RPC requests
    pub user_agent: &'static str,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:9091/transmission/rpc".to_string(),
            credentials: None,
            rpc_timeout: Duration::from_secs(30),
            user_agent: "undertow/0.1.0",
        }
    }
}

/// Torrent-file fetch configuration.
///
/// Controls HTTP parameters for downloading `.torrent` files before
/// submitting them to the daemon.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// HTTP request timeout for `.torrent` downloads
    pub request_timeout: Duration,
    /// User agent for fetch requests
    pub user_agent: &'static str,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            user_agent: "undertow/0.1.0",
        }
    }
}

/// Add-workflow configuration.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Directory for ephemeral downloaded `.torrent` files.
    ///
    /// Shared across concurrent runs. Each run writes a file named after its
    /// source's trailing path segment, so two concurrent requests with the
    /// same trailing segment can collide. Known limitation.
    pub scratch_dir: PathBuf,
    /// Download directory applied when a request does not carry one
    pub default_download_dir: Option<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
            default_download_dir: None,
        }
    }
}

impl UndertowConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("UNDERTOW_RPC_URL") {
            config.daemon.rpc_url = url;
        }

        if let (Ok(user), Ok(password)) = (
            std::env::var("UNDERTOW_RPC_USER"),
            std::env::var("UNDERTOW_RPC_PASSWORD"),
        ) {
            config.daemon.credentials = Some((user, password));
        }

        if let Ok(timeout) = std::env::var("UNDERTOW_RPC_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.daemon.rpc_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(dir) = std::env::var("UNDERTOW_SCRATCH_DIR") {
            config.workflow.scratch_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("UNDERTOW_DOWNLOAD_DIR") {
            config.workflow.default_download_dir = Some(dir);
        }

        config
    }

    /// Creates a configuration writing scratch files under the given directory.
    pub fn for_testing(scratch_dir: PathBuf) -> Self {
        Self {
            workflow: WorkflowConfig {
                scratch_dir,
                default_download_dir: None,
            },
            ..Default::default()
        }
    }
}

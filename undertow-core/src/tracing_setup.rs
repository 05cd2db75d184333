//! Tracing setup for Undertow
//!
//! Console output follows the user's chosen level. When a debug-log directory
//! is given, a second layer additionally captures everything at TRACE level to
//! disk so failed runs can be inspected after the fact.

use std::fs::{File, create_dir_all};
use std::path::Path;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Name of the per-run debug log inside the debug-log directory.
const DEBUG_LOG_NAME: &str = "undertow-last-run.log";

/// Initialize tracing.
///
/// The console layer respects `console_level` (overridable through the
/// standard env filter variable). With `debug_log_dir` set, a full TRACE log
/// is also written to `undertow-last-run.log` in that directory, overwriting
/// the previous run.
///
/// # Errors
/// - `std::io::Error` - the debug-log directory or file could not be created
pub fn init_tracing(console_level: Level, debug_log_dir: Option<&Path>) -> std::io::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.to_string()));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_filter(console_filter);

    let file_layer = match debug_log_dir {
        Some(dir) => {
            create_dir_all(dir)?;
            let log_file = File::create(dir.join(DEBUG_LOG_NAME))?;
            let layer = fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false) // No color codes in files
                .with_writer(log_file)
                .with_filter(EnvFilter::new("trace"));
            Some(layer)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// CLI log levels for user control
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliLogLevel {
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Informational, warning, and error messages
    Info,
    /// Debug, informational, warning, and error messages
    Debug,
    /// All messages including detailed tracing
    Trace,
}

impl CliLogLevel {
    /// Converts CLI log level to tracing Level enum.
    ///
    /// # Examples
    /// ```
    /// use undertow_core::tracing_setup::CliLogLevel;
    ///
    /// let level = CliLogLevel::Info.as_tracing_level();
    /// assert_eq!(level, tracing::Level::INFO);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CliLogLevel::Error => "error",
            CliLogLevel::Warn => "warn",
            CliLogLevel::Info => "info",
            CliLogLevel::Debug => "debug",
            CliLogLevel::Trace => "trace",
        };
        write!(f, "{name}")
    }
}

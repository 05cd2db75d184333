//! The torrent-add workflow: fetch, submit, resolve, clean up

pub mod add;
pub mod batch;
#[cfg(test)]
pub mod test_mocks;

use std::fmt;
use std::path::PathBuf;

pub use add::{AddOutcome, AddRequest, AddWorkflow};

use crate::daemon::{DaemonError, TorrentId};
use crate::fetch::FetchError;

/// Steps of one add run, in execution order.
///
/// Named so traces and errors can point at the step that was active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPhase {
    Fetching,
    Submitting,
    Resolving,
    Cleanup,
}

impl fmt::Display for AddPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetching => write!(f, "fetching"),
            Self::Submitting => write!(f, "submitting"),
            Self::Resolving => write!(f, "resolving"),
            Self::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// Terminal failures of one add run.
///
/// Each variant names the step that failed; the run reaches exactly one
/// terminal state and a failure here is the item's outcome.
#[derive(Debug, thiserror::Error)]
pub enum AddError {
    #[error("Failed to fetch torrent file from {url}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Daemon rejected torrent add")]
    Submit(#[source] DaemonError),

    #[error("Failed to resolve torrent {id} after add")]
    Resolve {
        id: TorrentId,
        #[source]
        source: DaemonError,
    },
}

/// Non-fatal failure to delete a scratch file.
///
/// Reported through the side channel only; never alters the run's primary
/// outcome.
#[derive(Debug, thiserror::Error)]
#[error("Failed to delete scratch file {}", path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

//! Status-based filtering of torrent records

use std::fmt;
use std::str::FromStr;

use crate::daemon::{TorrentRecord, TorrentStatus};

/// Filter criterion over a torrent's daemon-reported lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusSelector {
    /// Match every record.
    #[default]
    All,
    /// Match records in exactly this state.
    Only(TorrentStatus),
}

impl FromStr for StatusSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        TorrentStatus::from_name(&s.to_lowercase())
            .map(Self::Only)
            .ok_or_else(|| format!("Unknown status selector: {s}"))
    }
}

impl fmt::Display for StatusSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

/// Narrows records to those matching the selector.
///
/// `All` is the identity. Otherwise records are kept on an exact status
/// match, relative order preserved; no matches yields an empty list, not an
/// error.
pub fn filter_by_status(
    records: Vec<TorrentRecord>,
    selector: StatusSelector,
) -> Vec<TorrentRecord> {
    match selector {
        StatusSelector::All => records,
        StatusSelector::Only(status) => records
            .into_iter()
            .filter(|record| record.status == status)
            .collect(),
    }
}

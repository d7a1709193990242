//! Reservation events and cancellation reasons.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::types::DownloadId;

/// Why a download was cancelled.
///
/// Each reason has a stable label so telemetry sinks can keep them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The user dismissed the duplicate-download prompt.
    DuplicatePromptDismissed,
    /// The user cancelled the download through another surface.
    UserCancelled,
    /// The download was destroyed while a decision was outstanding.
    OwnerDestroyed,
    /// No download directory could be determined.
    NoDownloadDirectory,
    /// The target path could not be reserved.
    ReservationFailed,
}

impl CancelReason {
    /// Stable metric label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicatePromptDismissed => "duplicate_prompt_dismissed",
            Self::UserCancelled => "user_cancelled",
            Self::OwnerDestroyed => "owner_destroyed",
            Self::NoDownloadDirectory => "no_download_directory",
            Self::ReservationFailed => "reservation_failed",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-process tally of cancellation reasons.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReasonCounts {
    counts: BTreeMap<CancelReason, u64>,
}

impl CancelReasonCounts {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `reason`.
    pub fn record(&mut self, reason: CancelReason) {
        *self.counts.entry(reason).or_insert(0) += 1;
    }

    /// Occurrences of `reason` so far.
    pub fn get(&self, reason: CancelReason) -> u64 {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    /// Total cancellations across all reasons.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterate `(reason, count)` pairs in reason order.
    pub fn iter(&self) -> impl Iterator<Item = (CancelReason, u64)> + '_ {
        self.counts.iter().map(|(reason, count)| (*reason, *count))
    }
}

/// Events emitted by the reservation subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReservationEvent {
    /// A path was verified and claimed.
    Reserved {
        /// Owning download.
        id: DownloadId,
        /// The claimed path.
        path: PathBuf,
        /// Whether the claimed path differs from the requested one.
        uniquified: bool,
    },

    /// A claim was dropped.
    Released {
        /// The released path.
        path: PathBuf,
    },

    /// A reservation ended without a verified path.
    ReservationFailed {
        /// Owning download.
        id: DownloadId,
        /// Error message.
        error: String,
    },

    /// A download was cancelled.
    DownloadCancelled {
        /// The cancelled download.
        id: DownloadId,
        /// Why it was cancelled.
        reason: CancelReason,
    },
}

impl ReservationEvent {
    /// Create a reserved event.
    pub fn reserved(id: DownloadId, path: impl Into<PathBuf>, uniquified: bool) -> Self {
        Self::Reserved {
            id,
            path: path.into(),
            uniquified,
        }
    }

    /// Create a released event.
    pub fn released(path: impl Into<PathBuf>) -> Self {
        Self::Released { path: path.into() }
    }

    /// Create a failure event.
    pub fn failed(id: DownloadId, error: impl Into<String>) -> Self {
        Self::ReservationFailed {
            id,
            error: error.into(),
        }
    }

    /// Create a cancellation event.
    pub const fn cancelled(id: DownloadId, reason: CancelReason) -> Self {
        Self::DownloadCancelled { id, reason }
    }
}

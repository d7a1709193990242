//! Reservation error types.
//!
//! These errors are serializable and do not depend on `std::io::Error`;
//! I/O failures are captured as strings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a reservation could not produce a verified path.
///
/// Claim races between downloads are never surfaced: the tracker retries
/// the next candidate instead.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReservationError {
    /// The target or default directory could not be determined or created.
    #[error("Directory unavailable ({path}): {reason}")]
    DirectoryUnavailable {
        /// The directory that was checked.
        path: PathBuf,
        /// Why it is unusable.
        reason: String,
    },

    /// Every uniquified candidate was taken.
    #[error("No free name for {path} after {attempts} attempts")]
    ReservationExhausted {
        /// The originally requested path.
        path: PathBuf,
        /// Number of suffixed candidates tried.
        attempts: u32,
    },

    /// The path is on disk or claimed, and the policy forbids working around it.
    #[error("Target {path} is already in use")]
    Conflict {
        /// The contested path.
        path: PathBuf,
    },

    /// The requested path has no filename or no parent directory.
    #[error("Invalid target path: {path}")]
    InvalidPath {
        /// The rejected path.
        path: PathBuf,
    },

    /// The probe worker stopped before finishing (shutdown or panic).
    #[error("Reservation interrupted: {reason}")]
    Interrupted {
        /// What stopped the worker.
        reason: String,
    },

    /// The download was destroyed before the reservation could be used.
    #[error("Download no longer exists")]
    OwnerGone,
}

impl ReservationError {
    /// Create a directory-unavailable error.
    pub fn directory_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DirectoryUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an exhausted-suffixes error.
    pub fn exhausted(path: impl Into<PathBuf>, attempts: u32) -> Self {
        Self::ReservationExhausted {
            path: path.into(),
            attempts,
        }
    }

    /// Create a conflict error.
    pub fn conflict(path: impl Into<PathBuf>) -> Self {
        Self::Conflict { path: path.into() }
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    /// Create an interrupted error.
    pub fn interrupted(reason: impl Into<String>) -> Self {
        Self::Interrupted {
            reason: reason.into(),
        }
    }

    /// Whether the caller may succeed by retrying with a different target.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DirectoryUnavailable { .. } | Self::Conflict { .. } | Self::Interrupted { .. }
        )
    }

    /// Whether this is the silent owner-destroyed outcome.
    #[must_use]
    pub const fn is_owner_gone(&self) -> bool {
        matches!(self, Self::OwnerGone)
    }

    /// Convert to a user-friendly message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::DirectoryUnavailable { path, .. } => {
                format!("Cannot save to {}. Choose a different folder.", path.display())
            }
            Self::ReservationExhausted { path, .. } => format!(
                "Too many files named like {} already exist. The download could not be continued.",
                path.display()
            ),
            Self::Conflict { path } => format!("{} is already in use.", path.display()),
            Self::InvalidPath { path } => format!("{} is not a valid file path.", path.display()),
            Self::Interrupted { .. } => {
                "The download could not be continued. Try again.".to_string()
            }
            Self::OwnerGone => "The download is no longer available.".to_string(),
        }
    }
}

/// Result of a reservation: a verified, collision-free path or a failure.
pub type ReservationResult = Result<super::ReservedPath, ReservationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = ReservationError::exhausted("/dl/a.txt", 100);
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("reservation_exhausted"));
        assert!(json.contains("100"));

        let parsed: ReservationError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(ReservationError::directory_unavailable("/ro", "denied").is_recoverable());
        assert!(ReservationError::conflict("/dl/a").is_recoverable());
        assert!(!ReservationError::exhausted("/dl/a", 3).is_recoverable());
        assert!(!ReservationError::OwnerGone.is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        let err = ReservationError::directory_unavailable("/mnt/ro", "read-only");
        assert!(err.user_message().contains("/mnt/ro"));
        assert!(ReservationError::OwnerGone.is_owner_gone());
    }
}

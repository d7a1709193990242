//! Core reservation identifiers and request/result values.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity token of a download owned by the download pipeline.
///
/// The token is an opaque handle: it never grants access to the download's
/// state by itself. State is looked up through the live-download table,
/// which forgets the token once the download is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadId(Uuid);

impl DownloadId {
    /// Mint a fresh, random download identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (e.g. one persisted by the pipeline).
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DownloadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to do when the requested target collides with a file on disk or
/// with another download's reservation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Insert ` (N)` before the extension until a free name is found.
    #[default]
    Uniquify,
    /// Take the exact path even if a file exists on disk.
    Overwrite,
    /// Give up as soon as any collision is seen.
    Fail,
}

impl ConflictPolicy {
    /// Stable lowercase label, used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uniquify => "uniquify",
            Self::Overwrite => "overwrite",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to reserve a target path for one download.
///
/// Immutable once submitted to the tracker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    /// The download the reservation is made for.
    pub owner: DownloadId,
    /// Requested absolute target path.
    pub path: PathBuf,
    /// The download directory. If the target's parent is missing and equals
    /// this directory, it is created even when `create_directory` is false.
    pub download_directory: PathBuf,
    /// Create the target's parent directory tree if it is missing.
    pub create_directory: bool,
    /// Collision handling.
    pub policy: ConflictPolicy,
}

impl ReservationRequest {
    /// Create a request with the default policy (`Uniquify`) and no
    /// directory creation.
    pub fn new(
        owner: DownloadId,
        path: impl Into<PathBuf>,
        download_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            owner,
            path: path.into(),
            download_directory: download_directory.into(),
            create_directory: false,
            policy: ConflictPolicy::default(),
        }
    }

    /// Set the conflict policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set whether a missing target directory should be created.
    #[must_use]
    pub const fn with_create_directory(mut self, create: bool) -> Self {
        self.create_directory = create;
        self
    }

    /// Directory the target file lives in.
    pub fn target_directory(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

/// A path currently claimed by a download.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservedPath {
    /// The claimed absolute path.
    pub path: PathBuf,
    /// The download holding the claim.
    pub owner: DownloadId,
}

impl ReservedPath {
    /// Create a reserved path value.
    pub fn new(path: impl Into<PathBuf>, owner: DownloadId) -> Self {
        Self {
            path: path.into(),
            owner,
        }
    }

    /// The claimed path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the value, returning the path.
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

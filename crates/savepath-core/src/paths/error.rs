//! Path-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during directory resolution and verification.
#[derive(Debug, Error)]
pub enum PathError {
    /// No download directory could be determined for this platform.
    #[error("Cannot determine download directory")]
    NoDownloadDir,

    /// A path was expected to be a directory but was not.
    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),

    /// A directory does not exist and creation was not allowed.
    #[error("Directory {0} does not exist")]
    DirectoryNotFound(PathBuf),

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// A directory is not writable.
    #[error("Directory {path} is not writable: {reason}")]
    NotWritable { path: PathBuf, reason: String },

    /// An empty path was provided.
    #[error("Path cannot be empty")]
    EmptyPath,
}

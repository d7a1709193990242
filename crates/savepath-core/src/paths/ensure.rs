//! Directory creation and verification utilities.
//!
//! The `DirectoryCreationStrategy` enum has no interactive variant; callers
//! that ask the user first decide before calling `ensure_directory`.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::error::PathError;

/// Strategy for how to handle missing directories when ensuring they exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryCreationStrategy {
    /// Create directories automatically if they are missing.
    #[default]
    AutoCreate,
    /// Do not create directories; return an error if missing.
    Disallow,
}

impl DirectoryCreationStrategy {
    /// `AutoCreate` when `create` is true, `Disallow` otherwise.
    #[must_use]
    pub const fn from_flag(create: bool) -> Self {
        if create { Self::AutoCreate } else { Self::Disallow }
    }
}

/// Ensure the provided directory exists and is writable according to the chosen strategy.
///
/// If the directory exists, verifies it's actually a directory and is writable.
/// If the directory doesn't exist, behavior depends on `strategy`:
/// - `AutoCreate`: Creates the directory (and parents)
/// - `Disallow`: Returns an error
pub fn ensure_directory(path: &Path, strategy: DirectoryCreationStrategy) -> Result<(), PathError> {
    if path.as_os_str().is_empty() {
        return Err(PathError::EmptyPath);
    }

    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
    } else {
        match strategy {
            DirectoryCreationStrategy::AutoCreate => {
                fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
            DirectoryCreationStrategy::Disallow => {
                return Err(PathError::DirectoryNotFound(path.to_path_buf()));
            }
        }
    }

    verify_writable(path)
}

/// Verify a directory is writable by creating and removing a uniquely named
/// scratch file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let not_writable = |e: std::io::Error| PathError::NotWritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut scratch = tempfile::Builder::new()
        .prefix(".savepath_write_test")
        .tempfile_in(path)
        .map_err(not_writable)?;
    scratch.write_all(b"test").map_err(not_writable)?;
    scratch.close().map_err(not_writable)
}

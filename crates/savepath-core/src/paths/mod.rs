//! Filesystem path primitives.
//!
//! - Existence and directory probing (`FsPathProbe`)
//! - Directory creation and writability checks
//! - Uniquified candidate names
//! - Platform download directory lookup
//!
//! # Design
//!
//! - Everything here may block on storage I/O; async callers run it on a
//!   blocking worker
//! - No shared state: every function is a pure function of the filesystem

mod ensure;
mod error;
mod platform;
mod probe;
mod uniquify;

#[cfg(test)]
mod test_utils;

// Error type
pub use error::PathError;

// Directory operations
pub use ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};

// Probing
pub use probe::FsPathProbe;

// Candidate naming
pub use uniquify::{uniquified_candidates, uniquified_path};

// Platform download directory
pub use platform::{
    DOWNLOAD_DIR_ENV, FixedDownloadDirectory, PlatformDownloadDirectory, default_download_dir,
};

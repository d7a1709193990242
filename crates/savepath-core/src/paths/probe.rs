//! Filesystem-backed `PathProbe`.

use std::io::ErrorKind;
use std::path::Path;

use crate::ports::PathProbe;

use super::ensure::{DirectoryCreationStrategy, ensure_directory};

/// Probe that asks the real filesystem. Every call may block on storage I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPathProbe;

impl FsPathProbe {
    /// Create a new filesystem probe.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PathProbe for FsPathProbe {
    fn exists(&self, path: &Path) -> bool {
        // Dangling symlinks count as present, and so does anything we cannot stat.
        match std::fs::symlink_metadata(path) {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Treating unreadable path as existing");
                true
            }
        }
    }

    fn ensure_directory(&self, dir: &Path, create: bool) -> bool {
        match ensure_directory(dir, DirectoryCreationStrategy::from_flag(create)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Directory is not usable");
                false
            }
        }
    }
}

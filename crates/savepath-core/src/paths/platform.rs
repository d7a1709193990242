//! Platform download directory resolution.

use std::env;
use std::path::PathBuf;

use crate::ports::DownloadDirectoryPort;

use super::error::PathError;

/// Environment variable that overrides the platform download directory.
pub const DOWNLOAD_DIR_ENV: &str = "SAVEPATH_DOWNLOAD_DIR";

/// Get the platform's default download directory.
///
/// Resolution order:
/// 1. `SAVEPATH_DOWNLOAD_DIR` environment variable (highest priority)
/// 2. The platform downloads folder (e.g. `~/Downloads`, XDG `DOWNLOAD` dir)
/// 3. `Downloads` under the home directory
pub fn default_download_dir() -> Result<PathBuf, PathError> {
    // 1. Runtime override
    if let Ok(path) = env::var(DOWNLOAD_DIR_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    // 2. Platform downloads folder
    if let Some(dir) = dirs::download_dir() {
        return Ok(dir);
    }

    // 3. Home fallback
    dirs::home_dir()
        .map(|home| home.join("Downloads"))
        .ok_or(PathError::NoDownloadDir)
}

/// `DownloadDirectoryPort` backed by [`default_download_dir`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformDownloadDirectory;

impl PlatformDownloadDirectory {
    /// Create a new platform directory lookup.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DownloadDirectoryPort for PlatformDownloadDirectory {
    fn default_download_dir(&self) -> Result<PathBuf, PathError> {
        default_download_dir()
    }
}

/// `DownloadDirectoryPort` that always answers with a configured directory.
#[derive(Debug, Clone)]
pub struct FixedDownloadDirectory {
    dir: PathBuf,
}

impl FixedDownloadDirectory {
    /// Use `dir` as the download directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadDirectoryPort for FixedDownloadDirectory {
    fn default_download_dir(&self) -> Result<PathBuf, PathError> {
        if self.dir.as_os_str().is_empty() {
            return Err(PathError::EmptyPath);
        }
        Ok(self.dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn env_override_wins() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let _env = EnvVarGuard::set(DOWNLOAD_DIR_ENV, "/srv/downloads");

        assert_eq!(
            default_download_dir().unwrap(),
            PathBuf::from("/srv/downloads")
        );
        assert_eq!(
            PlatformDownloadDirectory::new().default_download_dir().unwrap(),
            PathBuf::from("/srv/downloads")
        );
    }

    #[test]
    fn blank_override_is_ignored() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let _env = EnvVarGuard::set(DOWNLOAD_DIR_ENV, "   ");

        if let Ok(dir) = default_download_dir() {
            assert_ne!(dir, PathBuf::from("   "));
        }
    }

    #[test]
    fn fixed_directory_rejects_empty() {
        assert!(matches!(
            FixedDownloadDirectory::new("").default_download_dir(),
            Err(PathError::EmptyPath)
        ));
        assert_eq!(
            FixedDownloadDirectory::new("/dl").default_download_dir().unwrap(),
            PathBuf::from("/dl")
        );
    }
}

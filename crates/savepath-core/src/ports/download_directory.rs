//! Download directory lookup port.

use std::path::PathBuf;

use crate::paths::PathError;

/// Port for looking up the host's default download directory.
///
/// # Example
///
/// ```ignore
/// let dirs: Arc<dyn DownloadDirectoryPort> = Arc::new(PlatformDownloadDirectory::new());
/// let target = dirs.default_download_dir()?.join("report.pdf");
/// ```
pub trait DownloadDirectoryPort: Send + Sync {
    /// The directory new downloads are saved to by default.
    fn default_download_dir(&self) -> Result<PathBuf, PathError>;
}

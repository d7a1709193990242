//! Filesystem probe port.
//!
//! The reservation tracker asks only two questions of storage: does this
//! path exist, and is this directory usable. Keeping them behind a trait lets
//! tests count probes and simulate read-only parents.

use std::path::Path;

/// Blocking filesystem questions used by the reservation tracker.
///
/// Implementations hold no state between calls and may block on I/O.
/// Failures are answered as "not usable" rather than raised.
pub trait PathProbe: Send + Sync {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `dir` is a writable directory, creating it first when
    /// `create` is set and it is missing.
    fn ensure_directory(&self, dir: &Path, create: bool) -> bool;
}

//! Core domain types, ports and path primitives for savepath.
//!
//! - `download` - Reservation requests, results, events and errors
//! - `paths` - Filesystem probing, directory checks and candidate naming
//! - `ports` - Traits for the filesystem, download directory and event sink
//! - `settings` - Reservation settings and validation

#![deny(unused_crate_dependencies)]

pub mod download;
pub mod paths;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use download::{
    CancelReason, CancelReasonCounts, ConflictPolicy, DEFAULT_USER_AGENT, DownloadId,
    DownloadInfo, ReservationError, ReservationEvent, ReservationRequest, ReservationResult,
    ReservedPath, ResponseMetadata,
};
pub use paths::{
    DirectoryCreationStrategy, FixedDownloadDirectory, FsPathProbe, PathError,
    PlatformDownloadDirectory, default_download_dir, ensure_directory, uniquified_candidates,
    uniquified_path, verify_writable,
};
pub use ports::{
    DownloadDirectoryPort, NoopReservationEmitter, PathProbe, ReservationEventEmitterPort,
};
pub use settings::{
    DEFAULT_MAX_PROBE_WORKERS, DEFAULT_MAX_UNIQUIFY_ATTEMPTS, ReservationSettings,
    SettingsError, SettingsUpdate, validate_settings,
};

// Dev-dependencies are only referenced from test modules
#[cfg(test)]
use serde_json as _;

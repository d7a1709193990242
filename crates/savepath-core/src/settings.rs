//! Reservation settings and validation.
//!
//! Pure configuration types with no infrastructure dependencies.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default bound on ` (N)` suffixes tried before giving up.
pub const DEFAULT_MAX_UNIQUIFY_ATTEMPTS: u32 = 100;

/// Default size of the filesystem probe worker pool.
pub const DEFAULT_MAX_PROBE_WORKERS: u32 = 4;

/// Reservation settings.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReservationSettings {
    /// Upper bound on uniquified candidates per reservation (1-10000).
    pub max_uniquify_attempts: Option<u32>,

    /// Maximum concurrent filesystem probes (1-64).
    pub max_probe_workers: Option<u32>,

    /// Overrides the platform download directory.
    pub download_directory: Option<String>,
}

impl ReservationSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            max_uniquify_attempts: Some(DEFAULT_MAX_UNIQUIFY_ATTEMPTS),
            max_probe_workers: Some(DEFAULT_MAX_PROBE_WORKERS),
            download_directory: None,
        }
    }

    /// Get the effective uniquify bound (with default fallback).
    #[must_use]
    pub const fn effective_max_uniquify_attempts(&self) -> u32 {
        match self.max_uniquify_attempts {
            Some(n) => n,
            None => DEFAULT_MAX_UNIQUIFY_ATTEMPTS,
        }
    }

    /// Get the effective worker pool size (with default fallback).
    #[must_use]
    pub const fn effective_max_probe_workers(&self) -> u32 {
        match self.max_probe_workers {
            Some(n) => n,
            None => DEFAULT_MAX_PROBE_WORKERS,
        }
    }

    /// Configured download directory override, if set and non-blank.
    pub fn download_directory_override(&self) -> Option<PathBuf> {
        self.download_directory
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    /// Merge an update into these settings, only touching fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref attempts) = other.max_uniquify_attempts {
            self.max_uniquify_attempts = *attempts;
        }
        if let Some(ref workers) = other.max_probe_workers {
            self.max_probe_workers = *workers;
        }
        if let Some(ref dir) = other.download_directory {
            self.download_directory.clone_from(dir);
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub max_uniquify_attempts: Option<Option<u32>>,
    pub max_probe_workers: Option<Option<u32>>,
    pub download_directory: Option<Option<String>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Max uniquify attempts must be between 1 and 10,000, got {0}")]
    InvalidUniquifyAttempts(u32),

    #[error("Max probe workers must be between 1 and 64, got {0}")]
    InvalidProbeWorkers(u32),

    #[error("Download directory cannot be empty")]
    EmptyDownloadDirectory,
}

/// Validate settings values.
pub fn validate_settings(settings: &ReservationSettings) -> Result<(), SettingsError> {
    if let Some(attempts) = settings.max_uniquify_attempts {
        if !(1..=10_000).contains(&attempts) {
            return Err(SettingsError::InvalidUniquifyAttempts(attempts));
        }
    }

    if let Some(workers) = settings.max_probe_workers {
        if !(1..=64).contains(&workers) {
            return Err(SettingsError::InvalidProbeWorkers(workers));
        }
    }

    if settings
        .download_directory
        .as_ref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(SettingsError::EmptyDownloadDirectory);
    }

    Ok(())
}

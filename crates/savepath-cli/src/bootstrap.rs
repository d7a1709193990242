//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter: the filesystem probe, the platform download
//! directory and the event sink are instantiated here and handed to the
//! reservation service.

use std::path::PathBuf;
use std::sync::Arc;

use savepath_core::{
    FsPathProbe, PlatformDownloadDirectory, ReservationEvent, ReservationEventEmitterPort,
    ReservationSettings, SettingsUpdate,
};
use savepath_reserve::{
    OriginContext, ReservationService, ReservationServiceDeps, build_reservation_service,
};

use crate::error::CliError;
use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Reservation settings after applying command-line overrides.
    pub settings: ReservationSettings,
}

impl CliConfig {
    /// Default settings with the global flags of `cli` applied.
    pub fn from_cli(cli: &Cli) -> Self {
        let mut settings = ReservationSettings::with_defaults();
        settings.merge(&SettingsUpdate {
            max_uniquify_attempts: cli.max_attempts.map(Some),
            max_probe_workers: cli.probe_workers.map(Some),
            download_directory: Some(
                cli.download_dir
                    .as_ref()
                    .map(|dir| dir.to_string_lossy().into_owned()),
            ),
        });
        Self { settings }
    }
}

/// Event sink that writes reservation events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmitter;

impl ReservationEventEmitterPort for LogEmitter {
    fn emit(&self, event: ReservationEvent) {
        tracing::debug!(?event, "reservation event");
    }

    fn clone_box(&self) -> Box<dyn ReservationEventEmitterPort> {
        Box::new(*self)
    }
}

/// Fully composed context for CLI commands.
///
/// The CLI's main task is the origin: handlers drive `origin` to receive
/// reservation results.
pub struct CliContext {
    /// The reservation service.
    pub service: ReservationService,
    /// Run queue results are delivered on.
    pub origin: OriginContext,
}

impl CliContext {
    /// The directory relative paths are resolved against.
    pub fn download_dir(&self) -> Result<PathBuf, CliError> {
        Ok(self.service.default_download_dir()?)
    }

    /// Resolve a command-line path: relative paths live in the download directory.
    pub fn resolve_target(&self, path: &std::path::Path) -> Result<PathBuf, CliError> {
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        Ok(self.download_dir()?.join(path))
    }
}

/// Build the CLI context.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let origin = OriginContext::new();
    let service = build_reservation_service(
        ReservationServiceDeps {
            probe: Arc::new(FsPathProbe::new()),
            directories: Arc::new(PlatformDownloadDirectory::new()),
            event_emitter: Arc::new(LogEmitter),
            settings: config.settings,
        },
        origin.handle(),
    )?;

    tracing::debug!(?service, "Reservation service ready");
    Ok(CliContext { service, origin })
}

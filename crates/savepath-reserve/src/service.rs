//! Composed reservation service.
//!
//! One instance per process, built once at the composition root and passed
//! to whatever needs to reserve paths or open duplicate prompts.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use savepath_core::{
    CancelReason, CancelReasonCounts, DownloadDirectoryPort, DownloadId, FixedDownloadDirectory,
    PathError, PathProbe, ReservationEventEmitterPort, ReservationRequest, ReservationResult,
    ReservationSettings, SettingsError, validate_settings,
};

use crate::delegate::{DelegateContext, DuplicateResolutionDelegate, FileSelectedCallback};
use crate::lifecycle::{DownloadRecord, LiveDownloads};
use crate::origin::OriginHandle;
use crate::registry::ReservationRegistry;
use crate::telemetry::CancelTelemetry;
use crate::tracker::{PathReservationTracker, TrackerDeps};

/// Dependencies for building a [`ReservationService`].
pub struct ReservationServiceDeps<P, D, E>
where
    P: PathProbe + 'static,
    D: DownloadDirectoryPort + 'static,
    E: ReservationEventEmitterPort + 'static,
{
    /// Filesystem probe.
    pub probe: Arc<P>,
    /// Platform download directory lookup.
    pub directories: Arc<D>,
    /// Sink for reservation and cancellation events.
    pub event_emitter: Arc<E>,
    /// Reservation settings. Validated by the builder.
    pub settings: ReservationSettings,
}

/// Build a reservation service whose callbacks are delivered on `origin`.
///
/// A `download_directory` in the settings replaces `deps.directories`. When
/// called inside a Tokio runtime, reservations are spawned on that runtime
/// even if later requested from outside it.
pub fn build_reservation_service<P, D, E>(
    deps: ReservationServiceDeps<P, D, E>,
    origin: OriginHandle,
) -> Result<ReservationService, SettingsError>
where
    P: PathProbe + 'static,
    D: DownloadDirectoryPort + 'static,
    E: ReservationEventEmitterPort + 'static,
{
    validate_settings(&deps.settings)?;

    let directories: Arc<dyn DownloadDirectoryPort> =
        match deps.settings.download_directory_override() {
            Some(dir) => Arc::new(FixedDownloadDirectory::new(dir)),
            None => deps.directories,
        };
    let emitter: Arc<dyn ReservationEventEmitterPort> = deps.event_emitter;
    let downloads = LiveDownloads::new();

    let tracker = PathReservationTracker::new(TrackerDeps {
        registry: Arc::new(ReservationRegistry::new()),
        probe: deps.probe,
        downloads: downloads.clone(),
        emitter: Arc::clone(&emitter),
        settings: deps.settings.clone(),
        runtime: tokio::runtime::Handle::try_current().ok(),
    });

    Ok(ReservationService {
        downloads,
        tracker,
        directories,
        origin,
        telemetry: CancelTelemetry::new(emitter),
        settings: deps.settings,
    })
}

/// Download reservations, lifecycles and duplicate prompts for one process.
pub struct ReservationService {
    downloads: LiveDownloads,
    tracker: PathReservationTracker,
    directories: Arc<dyn DownloadDirectoryPort>,
    origin: OriginHandle,
    telemetry: CancelTelemetry,
    settings: ReservationSettings,
}

impl ReservationService {
    /// The live-download table.
    pub const fn downloads(&self) -> &LiveDownloads {
        &self.downloads
    }

    /// The path reservation tracker.
    pub const fn tracker(&self) -> &PathReservationTracker {
        &self.tracker
    }

    /// The shared claim table.
    pub fn registry(&self) -> &Arc<ReservationRegistry> {
        self.tracker.registry()
    }

    /// Settings the service was built with.
    pub const fn settings(&self) -> &ReservationSettings {
        &self.settings
    }

    /// The origin results are delivered on.
    pub const fn origin(&self) -> &OriginHandle {
        &self.origin
    }

    /// Track a new download.
    pub fn register_download(&self, record: DownloadRecord) -> DownloadId {
        self.downloads.register(record)
    }

    /// Destroy a download and release everything it reserved.
    ///
    /// Observers (open duplicate prompts) are disarmed first.
    pub fn destroy_download(&self, id: DownloadId) -> bool {
        let destroyed = self.downloads.destroy(id);
        self.tracker.release_download(id);
        destroyed
    }

    /// The user cancelled `id` outside of any prompt.
    pub fn cancel_download(&self, id: DownloadId) -> bool {
        if !self.downloads.is_live(id) {
            return false;
        }
        self.telemetry.record(id, CancelReason::UserCancelled);
        self.destroy_download(id)
    }

    /// Reserve a path, delivering the result on the service's origin.
    pub fn reserve<F>(&self, request: ReservationRequest, on_done: F)
    where
        F: FnOnce(ReservationResult) + Send + 'static,
    {
        self.tracker.reserve(request, &self.origin, on_done);
    }

    /// Reserve a path and wait for the result.
    pub async fn reserve_path(&self, request: ReservationRequest) -> ReservationResult {
        self.tracker.reserve_path(request).await
    }

    /// Release a reserved path.
    pub fn release(&self, path: &Path) -> bool {
        self.tracker.release(path)
    }

    /// Open a duplicate prompt for `id`, or `None` if it is already gone.
    pub fn create_duplicate_prompt(
        &self,
        id: DownloadId,
        file_path: impl Into<PathBuf>,
        callback: FileSelectedCallback,
    ) -> Option<DuplicateResolutionDelegate> {
        DuplicateResolutionDelegate::new(self.delegate_context(), id, file_path, callback)
    }

    /// Collaborators handed to each duplicate prompt.
    pub fn delegate_context(&self) -> DelegateContext {
        DelegateContext {
            tracker: self.tracker.clone(),
            downloads: self.downloads.clone(),
            directories: Arc::clone(&self.directories),
            origin: self.origin.clone(),
            telemetry: self.telemetry.clone(),
        }
    }

    /// The directory downloads go to by default.
    pub fn default_download_dir(&self) -> Result<PathBuf, PathError> {
        self.directories.default_download_dir()
    }

    /// Cancellation tally so far.
    pub fn cancel_counts(&self) -> CancelReasonCounts {
        self.telemetry.counts()
    }
}

impl fmt::Debug for ReservationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationService")
            .field("downloads", &self.downloads)
            .field("tracker", &self.tracker)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

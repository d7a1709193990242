//! Path reservation tracker.
//!
//! Turns a `ReservationRequest` into a verified, collision-free path:
//!
//! 1. Check the target directory (creating it when allowed).
//! 2. Probe the requested path against disk and the registry, then claim it.
//! 3. On collision, apply the request's `ConflictPolicy`.
//!
//! Steps 1-3 run on a blocking worker. At most `max_probe_workers` requests
//! probe at once; candidates within one request are tried strictly in order.
//! The result is handed back to the caller's origin context, where the
//! owner's liveness is checked one last time before the claim is kept.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use savepath_core::{
    ConflictPolicy, DownloadId, PathProbe, ReservationError, ReservationEvent,
    ReservationEventEmitterPort, ReservationRequest, ReservationResult, ReservationSettings,
    ReservedPath, uniquified_candidates,
};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

use crate::lifecycle::{LifecycleHandle, LiveDownloads};
use crate::origin::OriginHandle;
use crate::registry::{ClaimOutcome, ReservationRegistry};

/// A claim taken by a probe worker that has not been handed to the owner yet.
///
/// Dropping an armed guard releases the claim, so a result that never reaches
/// a live owner never leaks a reservation.
#[derive(Debug)]
#[must_use]
pub(crate) struct ClaimGuard {
    registry: Arc<ReservationRegistry>,
    path: Option<PathBuf>,
    owner: DownloadId,
    release_on_drop: bool,
}

impl ClaimGuard {
    /// Guard a claim this reservation just took.
    fn fresh(registry: Arc<ReservationRegistry>, path: PathBuf, owner: DownloadId) -> Self {
        Self {
            registry,
            path: Some(path),
            owner,
            release_on_drop: true,
        }
    }

    /// Wrap a claim the owner already held before this reservation.
    fn existing(registry: Arc<ReservationRegistry>, path: PathBuf, owner: DownloadId) -> Self {
        Self {
            registry,
            path: Some(path),
            owner,
            release_on_drop: false,
        }
    }

    fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Keep the claim and return its path.
    fn disarm(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if self.release_on_drop && self.registry.release_for(&path, self.owner) {
                tracing::debug!(
                    target: "savepath.reserve",
                    owner = %self.owner,
                    path = %path.display(),
                    "Released undelivered claim"
                );
            }
        }
    }
}

type ClaimOutcomeResult = Result<ClaimGuard, ReservationError>;

/// Dependencies for building a [`PathReservationTracker`].
pub struct TrackerDeps {
    /// Shared claim table.
    pub registry: Arc<ReservationRegistry>,
    /// Filesystem probe used by workers.
    pub probe: Arc<dyn PathProbe>,
    /// Live downloads, consulted before a claim is handed out.
    pub downloads: LiveDownloads,
    /// Sink for reservation events.
    pub emitter: Arc<dyn ReservationEventEmitterPort>,
    /// Attempt bound and worker pool size.
    pub settings: ReservationSettings,
    /// Runtime the probe tasks are spawned on. When `None`, the runtime
    /// current at each `reserve` call is used.
    pub runtime: Option<Handle>,
}

/// Orchestrates reservations against the registry and the filesystem.
///
/// Cheap to clone; clones share the registry and the worker pool.
#[derive(Clone)]
pub struct PathReservationTracker {
    registry: Arc<ReservationRegistry>,
    probe: Arc<dyn PathProbe>,
    downloads: LiveDownloads,
    emitter: Arc<dyn ReservationEventEmitterPort>,
    workers: Arc<Semaphore>,
    max_attempts: u32,
    runtime: Option<Handle>,
}

impl PathReservationTracker {
    /// Create a tracker from its dependencies.
    pub fn new(deps: TrackerDeps) -> Self {
        let workers = usize::try_from(deps.settings.effective_max_probe_workers())
            .unwrap_or(1)
            .max(1);
        Self {
            registry: deps.registry,
            probe: deps.probe,
            downloads: deps.downloads,
            emitter: deps.emitter,
            workers: Arc::new(Semaphore::new(workers)),
            max_attempts: deps.settings.effective_max_uniquify_attempts().max(1),
            runtime: deps.runtime,
        }
    }

    /// The claim table this tracker writes to.
    pub fn registry(&self) -> &Arc<ReservationRegistry> {
        &self.registry
    }

    /// Upper bound on uniquified candidates per request.
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Reserve a path and deliver the result on `origin`.
    ///
    /// Returns immediately. `on_done` runs exactly once, on the origin
    /// context, after this request's probing has finished. If the owner was
    /// destroyed in the meantime it receives `Err(OwnerGone)` and the claim
    /// is released. If the origin context itself is gone, `on_done` is
    /// dropped unrun and any claim is released.
    ///
    /// With no runtime configured and none current, `on_done` receives
    /// `Err(Interrupted)` on the origin.
    pub fn reserve<F>(&self, request: ReservationRequest, origin: &OriginHandle, on_done: F)
    where
        F: FnOnce(ReservationResult) + Send + 'static,
    {
        self.spawn_reservation(request, origin, None, on_done);
    }

    /// Like [`reserve`](Self::reserve), but the result is also discarded
    /// (claim released, `Err(OwnerGone)` delivered) once `handle` has been
    /// revoked.
    pub fn reserve_for<F>(
        &self,
        request: ReservationRequest,
        handle: &LifecycleHandle,
        origin: &OriginHandle,
        on_done: F,
    ) where
        F: FnOnce(ReservationResult) + Send + 'static,
    {
        self.spawn_reservation(request, origin, Some(handle.clone()), on_done);
    }

    fn spawn_reservation<F>(
        &self,
        request: ReservationRequest,
        origin: &OriginHandle,
        handle: Option<LifecycleHandle>,
        on_done: F,
    ) where
        F: FnOnce(ReservationResult) + Send + 'static,
    {
        let tracker = self.clone();
        let origin = origin.clone();

        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::warn!(
                target: "savepath.reserve",
                owner = %request.owner,
                "No async runtime to probe on"
            );
            origin.post(move || {
                on_done(Err(ReservationError::interrupted("no async runtime available")));
            });
            return;
        };

        runtime.spawn(async move {
            let outcome = tracker.probe_and_claim(request.clone()).await;
            let owner = request.owner;
            let delivered = origin.post(move || {
                let wanted = handle.as_ref().is_none_or(LifecycleHandle::is_valid);
                let result = tracker.finish(&request, outcome, wanted);
                on_done(result);
            });
            if !delivered {
                tracing::debug!(
                    target: "savepath.reserve",
                    owner = %owner,
                    "Origin context gone, dropping reservation result"
                );
            }
        });
    }

    /// Reserve a path and wait for the result on the calling task.
    pub async fn reserve_path(&self, request: ReservationRequest) -> ReservationResult {
        let outcome = self.probe_and_claim(request.clone()).await;
        self.finish(&request, outcome, true)
    }

    /// Release a verified path once its download stops using it.
    ///
    /// Idempotent. Returns whether a claim was removed.
    pub fn release(&self, path: &Path) -> bool {
        let removed = self.registry.release(path);
        if removed {
            tracing::debug!(
                target: "savepath.reserve",
                path = %path.display(),
                "Released reservation"
            );
            self.emitter.emit(ReservationEvent::released(path));
        }
        removed
    }

    /// Release every path held by `owner`.
    pub fn release_download(&self, owner: DownloadId) -> Vec<PathBuf> {
        let released = self.registry.release_owner(owner);
        for path in &released {
            self.emitter.emit(ReservationEvent::released(path.clone()));
        }
        if !released.is_empty() {
            tracing::debug!(
                target: "savepath.reserve",
                owner = %owner,
                count = released.len(),
                "Released download reservations"
            );
        }
        released
    }

    /// Run the blocking probe/claim sequence on a pooled worker.
    async fn probe_and_claim(&self, request: ReservationRequest) -> ClaimOutcomeResult {
        let permit = Arc::clone(&self.workers)
            .acquire_owned()
            .await
            .map_err(|_| ReservationError::interrupted("probe worker pool closed"))?;

        let tracker = self.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            tracker.claim_blocking(&request)
        })
        .await
        .map_err(|e| ReservationError::interrupted(format!("probe worker failed: {e}")))?
    }

    /// Resolve a request to a held claim. Blocks on filesystem I/O.
    fn claim_blocking(&self, request: &ReservationRequest) -> ClaimOutcomeResult {
        let path = request.path.as_path();
        let dir = match request.target_directory() {
            Some(dir) if path.is_absolute() && path.file_name().is_some() => dir,
            _ => return Err(ReservationError::invalid_path(path)),
        };

        let create = request.create_directory || dir == request.download_directory;
        if !self.probe.ensure_directory(dir, create) {
            let reason = if create {
                "directory could not be created"
            } else {
                "directory is missing or unusable"
            };
            return Err(ReservationError::directory_unavailable(dir, reason));
        }

        let owner = request.owner;
        match request.policy {
            ConflictPolicy::Overwrite => match self.registry.claim(path, owner) {
                ClaimOutcome::Claimed => Ok(self.fresh(path, owner)),
                ClaimOutcome::AlreadyOwned => Ok(self.existing(path, owner)),
                ClaimOutcome::Taken => Err(ReservationError::conflict(path)),
            },
            ConflictPolicy::Fail => self
                .try_candidate(path, owner)
                .ok_or_else(|| ReservationError::conflict(path)),
            ConflictPolicy::Uniquify => {
                if let Some(guard) = self.try_candidate(path, owner) {
                    return Ok(guard);
                }
                uniquified_candidates(path, self.max_attempts)
                    .find_map(|candidate| self.try_candidate(&candidate, owner))
                    .ok_or_else(|| ReservationError::exhausted(path, self.max_attempts))
            }
        }
    }

    /// Claim `path` if it is free both on disk and in the registry.
    fn try_candidate(&self, path: &Path, owner: DownloadId) -> Option<ClaimGuard> {
        match self.registry.owner_of(path) {
            Some(holder) if holder == owner => return Some(self.existing(path, owner)),
            Some(_) => return None,
            None => {}
        }

        if self.probe.exists(path) {
            return None;
        }

        match self.registry.claim(path, owner) {
            ClaimOutcome::Claimed => Some(self.fresh(path, owner)),
            ClaimOutcome::AlreadyOwned => Some(self.existing(path, owner)),
            ClaimOutcome::Taken => {
                tracing::trace!(
                    target: "savepath.reserve",
                    owner = %owner,
                    path = %path.display(),
                    "Lost claim race, trying next candidate"
                );
                None
            }
        }
    }

    fn fresh(&self, path: &Path, owner: DownloadId) -> ClaimGuard {
        ClaimGuard::fresh(Arc::clone(&self.registry), path.to_path_buf(), owner)
    }

    fn existing(&self, path: &Path, owner: DownloadId) -> ClaimGuard {
        ClaimGuard::existing(Arc::clone(&self.registry), path.to_path_buf(), owner)
    }

    /// Turn a worker outcome into the caller-visible result.
    ///
    /// A claim is only kept when `wanted` and the owner is still live.
    fn finish(
        &self,
        request: &ReservationRequest,
        outcome: ClaimOutcomeResult,
        wanted: bool,
    ) -> ReservationResult {
        let owner = request.owner;
        match outcome {
            Ok(guard) if !wanted || !self.downloads.is_live(owner) => {
                tracing::debug!(
                    target: "savepath.reserve",
                    owner = %owner,
                    path = %guard.path().display(),
                    "Owner destroyed during reservation"
                );
                drop(guard);
                Err(ReservationError::OwnerGone)
            }
            Ok(guard) => {
                let path = guard.disarm();
                let uniquified = path != request.path;
                tracing::debug!(
                    target: "savepath.reserve",
                    owner = %owner,
                    path = %path.display(),
                    policy = %request.policy,
                    uniquified,
                    "Reserved download target"
                );
                self.emitter
                    .emit(ReservationEvent::reserved(owner, path.clone(), uniquified));
                Ok(ReservedPath::new(path, owner))
            }
            Err(error) => {
                if !error.is_owner_gone() {
                    tracing::warn!(
                        target: "savepath.reserve",
                        owner = %owner,
                        path = %request.path.display(),
                        error = %error,
                        "Reservation failed"
                    );
                    self.emitter
                        .emit(ReservationEvent::failed(owner, error.to_string()));
                }
                Err(error)
            }
        }
    }
}

impl fmt::Debug for PathReservationTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathReservationTracker")
            .field("claims", &self.registry.len())
            .field("max_attempts", &self.max_attempts)
            .field("idle_workers", &self.workers.available_permits())
            .finish_non_exhaustive()
    }
}

//! Duplicate-download decision delegate.
//!
//! Created when a download's target duplicates an existing file. The
//! presentation layer shows a prompt backed by this delegate and forwards
//! the user's answer:
//!
//! - **Accept** reserves a uniquified path in the default download directory
//!   and resumes the download with it.
//! - **Cancel** (or dismissing the prompt) resumes the download with no path,
//!   which aborts it.
//!
//! The delegate observes the download's lifetime through a revocable
//! [`LifecycleHandle`]. Once the download is destroyed, a decision that has
//! not been made yet becomes a no-op and its callback is never run. An accept
//! already in flight still completes, with `None`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use savepath_core::{
    CancelReason, ConflictPolicy, DownloadDirectoryPort, DownloadId, ReservationError,
    ReservationRequest,
};

use crate::lifecycle::{DownloadObserver, LifecycleHandle, LiveDownloads, ObserverId};
use crate::origin::OriginHandle;
use crate::telemetry::CancelTelemetry;
use crate::tracker::PathReservationTracker;

/// Completion callback. `None` means "do not proceed with this download".
pub type FileSelectedCallback = Box<dyn FnOnce(Option<PathBuf>) + Send + 'static>;

/// Where a delegate is in its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionState {
    /// Waiting for the user.
    Pending,
    /// The user accepted; a reservation was requested.
    Accepted,
    /// The user cancelled or dismissed the prompt.
    Cancelled,
}

impl DecisionState {
    /// Whether a decision has been made.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Collaborators a delegate needs to act on a decision.
#[derive(Clone)]
pub struct DelegateContext {
    /// Reserves the accepted path.
    pub tracker: PathReservationTracker,
    /// Live-download table the delegate observes.
    pub downloads: LiveDownloads,
    /// Source of the default download directory.
    pub directories: Arc<dyn DownloadDirectoryPort>,
    /// Context the completion callback is delivered on.
    pub origin: OriginHandle,
    /// Cancellation recorder.
    pub telemetry: CancelTelemetry,
}

/// Registered with the live-download table; revokes the handle on destroy.
struct OwnerWatch {
    handle: LifecycleHandle,
}

impl DownloadObserver for OwnerWatch {
    fn on_download_destroyed(&self, id: DownloadId) {
        tracing::debug!(id = %id, "Download destroyed with duplicate prompt open");
        self.handle.invalidate();
    }
}

/// Decision state machine for one duplicate download.
pub struct DuplicateResolutionDelegate {
    ctx: DelegateContext,
    watch: Arc<OwnerWatch>,
    observer_id: ObserverId,
    file_path: PathBuf,
    state: DecisionState,
    callback: Option<FileSelectedCallback>,
    off_the_record: bool,
}

impl DuplicateResolutionDelegate {
    /// Create a delegate for `download`, which wants to save to `file_path`.
    ///
    /// Returns `None` if the download is no longer live. The privacy flag is
    /// captured here because the record may be gone by the time the prompt
    /// is rendered.
    pub fn new(
        ctx: DelegateContext,
        download: DownloadId,
        file_path: impl Into<PathBuf>,
        callback: FileSelectedCallback,
    ) -> Option<Self> {
        let handle = ctx.downloads.handle(download)?;
        let off_the_record = handle.is_off_the_record()?;

        let watch = Arc::new(OwnerWatch { handle });
        let as_observer: Arc<dyn DownloadObserver> = watch.clone();
        let weak: Weak<dyn DownloadObserver> = Arc::downgrade(&as_observer);
        let observer_id = ctx.downloads.add_observer(download, weak)?;

        Some(Self {
            ctx,
            watch,
            observer_id,
            file_path: file_path.into(),
            state: DecisionState::Pending,
            callback: Some(callback),
            off_the_record,
        })
    }

    /// The download this prompt is about.
    pub fn download_id(&self) -> DownloadId {
        self.watch.handle.id()
    }

    /// Current decision state.
    pub const fn state(&self) -> DecisionState {
        self.state
    }

    /// Whether the download is still around to act on.
    pub fn is_owner_live(&self) -> bool {
        self.watch.handle.is_valid()
    }

    /// Whether a decision would still do anything.
    fn is_actionable(&self) -> bool {
        self.state == DecisionState::Pending && self.is_owner_live()
    }

    /// Proceed with a uniquified copy of the file.
    ///
    /// Always returns `true`. The callback receives the reserved path, or
    /// `None` if no directory or free name was found or the download went
    /// away (or [`on_owner_destroyed`](Self::on_owner_destroyed) was called)
    /// while the reservation was in flight.
    pub fn accept(&mut self) -> bool {
        if !self.is_actionable() {
            tracing::debug!(
                id = %self.download_id(),
                state = ?self.state,
                "Ignoring accept on inactive duplicate prompt"
            );
            return true;
        }
        self.state = DecisionState::Accepted;
        let Some(callback) = self.callback.take() else {
            return true;
        };

        let id = self.download_id();
        let download_dir = match self.ctx.directories.default_download_dir() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!(
                    id = %id,
                    error = %e,
                    "No download directory for duplicate download"
                );
                self.ctx
                    .telemetry
                    .record(id, CancelReason::NoDownloadDirectory);
                callback(None);
                return true;
            }
        };

        let request = ReservationRequest::new(id, self.file_path.clone(), download_dir)
            .with_policy(ConflictPolicy::Uniquify)
            .with_create_directory(true);

        let telemetry = self.ctx.telemetry.clone();
        self.ctx.tracker.reserve_for(
            request,
            &self.watch.handle,
            &self.ctx.origin,
            move |result| match result {
                Ok(reserved) => callback(Some(reserved.into_path())),
                Err(ReservationError::OwnerGone) => {
                    telemetry.record(id, CancelReason::OwnerDestroyed);
                    callback(None);
                }
                Err(_) => {
                    telemetry.record(id, CancelReason::ReservationFailed);
                    callback(None);
                }
            },
        );
        true
    }

    /// Abort the download. Always returns `true`.
    pub fn cancel(&mut self) -> bool {
        if !self.is_actionable() {
            return true;
        }
        self.state = DecisionState::Cancelled;

        let id = self.download_id();
        if let Some(callback) = self.callback.take() {
            callback(None);
        }
        self.ctx
            .telemetry
            .record(id, CancelReason::DuplicatePromptDismissed);
        tracing::info!(
            id = %id,
            path = %self.file_path.display(),
            "Duplicate download prompt dismissed"
        );
        true
    }

    /// The prompt was closed without an explicit answer.
    pub fn on_dismissed(&mut self) {
        self.cancel();
    }

    /// The download is being destroyed; disarm later decisions.
    ///
    /// Does not resolve a pending decision.
    pub fn on_owner_destroyed(&self) {
        self.watch.handle.invalidate();
    }

    /// Move the target into `dir`, keeping the filename.
    ///
    /// Only allowed while the decision is pending. Returns `false` if the
    /// stored path has no filename.
    pub fn set_target_directory(&mut self, dir: impl AsRef<Path>) -> bool {
        if self.state.is_resolved() {
            return false;
        }
        let Some(name) = self.file_path.file_name() else {
            return false;
        };
        self.file_path = dir.as_ref().join(name);
        true
    }

    /// The requested path as a display string.
    pub fn file_path(&self) -> String {
        self.file_path.to_string_lossy().into_owned()
    }

    /// The requested path.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Total bytes of the download, `0` once it is gone.
    pub fn total_bytes(&self) -> i64 {
        self.watch.handle.total_bytes().unwrap_or(0)
    }

    /// MIME type of the download, empty once it is gone.
    pub fn mime_type(&self) -> String {
        self.watch.handle.mime_type().unwrap_or_default()
    }

    /// Privacy flag captured at construction.
    pub const fn is_off_the_record(&self) -> bool {
        self.off_the_record
    }

    /// URL of the page that started the download, empty once it is gone.
    pub fn page_url(&self) -> String {
        self.watch.handle.page_url().unwrap_or_default()
    }

    /// Whether the download is an offline page, `false` once it is gone.
    pub fn is_offline_page(&self) -> bool {
        self.watch.handle.is_offline_page().unwrap_or(false)
    }

    /// Prompt text naming the duplicate file.
    pub fn message_text(&self) -> String {
        let name = self
            .file_path
            .file_name()
            .map_or_else(|| self.file_path(), |n| n.to_string_lossy().into_owned());
        format!("{name} already exists. Download it again?")
    }

    /// Navigation does not dismiss this prompt.
    pub const fn expires_on_navigation(&self) -> bool {
        false
    }
}

impl Drop for DuplicateResolutionDelegate {
    fn drop(&mut self) {
        self.ctx
            .downloads
            .remove_observer(self.download_id(), self.observer_id);
    }
}

impl fmt::Debug for DuplicateResolutionDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplicateResolutionDelegate")
            .field("download", &self.download_id())
            .field("file_path", &self.file_path)
            .field("state", &self.state)
            .field("off_the_record", &self.off_the_record)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use savepath_core::{
        FixedDownloadDirectory, NoopReservationEmitter, PathError, PathProbe,
        ReservationSettings,
    };

    use super::*;
    use crate::lifecycle::DownloadRecord;
    use crate::origin::OriginContext;
    use crate::registry::ReservationRegistry;
    use crate::tracker::TrackerDeps;

    struct NothingExists;

    impl PathProbe for NothingExists {
        fn exists(&self, _path: &Path) -> bool {
            false
        }

        fn ensure_directory(&self, _dir: &Path, _create: bool) -> bool {
            true
        }
    }

    struct NoDirectory;

    impl DownloadDirectoryPort for NoDirectory {
        fn default_download_dir(&self) -> Result<PathBuf, PathError> {
            Err(PathError::NoDownloadDir)
        }
    }

    type Calls = Arc<Mutex<Vec<Option<PathBuf>>>>;

    fn recording_callback() -> (Calls, FileSelectedCallback) {
        let calls: Calls = Arc::default();
        let sink = Arc::clone(&calls);
        (
            calls,
            Box::new(move |path| sink.lock().unwrap().push(path)),
        )
    }

    fn context(
        downloads: &LiveDownloads,
        origin: &OriginContext,
        directories: Arc<dyn DownloadDirectoryPort>,
    ) -> DelegateContext {
        let emitter = Arc::new(NoopReservationEmitter::new());
        let tracker = PathReservationTracker::new(TrackerDeps {
            registry: Arc::new(ReservationRegistry::new()),
            probe: Arc::new(NothingExists),
            downloads: downloads.clone(),
            emitter: emitter.clone(),
            settings: ReservationSettings::default(),
            runtime: None,
        });
        DelegateContext {
            tracker,
            downloads: downloads.clone(),
            directories,
            origin: origin.handle(),
            telemetry: CancelTelemetry::new(emitter),
        }
    }

    fn private_pdf() -> DownloadRecord {
        DownloadRecord {
            total_bytes: 512,
            mime_type: "application/pdf".to_string(),
            off_the_record: true,
            page_url: "https://example.com/reports".to_string(),
            ..DownloadRecord::default()
        }
    }

    #[test]
    fn accessors_read_through_handle() {
        let downloads = LiveDownloads::new();
        let origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        let ctx = context(&downloads, &origin, Arc::new(FixedDownloadDirectory::new("/dl")));
        let (_, callback) = recording_callback();

        let delegate = DuplicateResolutionDelegate::new(ctx, id, "/dl/report.pdf", callback).unwrap();
        assert_eq!(delegate.file_path(), "/dl/report.pdf");
        assert_eq!(delegate.total_bytes(), 512);
        assert_eq!(delegate.mime_type(), "application/pdf");
        assert_eq!(delegate.page_url(), "https://example.com/reports");
        assert!(delegate.is_off_the_record());
        assert!(!delegate.expires_on_navigation());
        assert!(delegate.message_text().starts_with("report.pdf"));

        downloads.destroy(id);
        assert_eq!(delegate.total_bytes(), 0);
        assert_eq!(delegate.mime_type(), "");
        assert!(delegate.is_off_the_record());
    }

    #[test]
    fn cancel_fires_once_and_records_dismissal() {
        let downloads = LiveDownloads::new();
        let origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        let ctx = context(&downloads, &origin, Arc::new(FixedDownloadDirectory::new("/dl")));
        let telemetry = ctx.telemetry.clone();
        let (calls, callback) = recording_callback();

        let mut delegate = DuplicateResolutionDelegate::new(ctx, id, "/dl/report.pdf", callback).unwrap();
        assert!(delegate.cancel());
        assert!(delegate.cancel());
        delegate.on_dismissed();

        assert_eq!(*calls.lock().unwrap(), vec![None]);
        assert_eq!(delegate.state(), DecisionState::Cancelled);
        assert_eq!(
            telemetry.counts().get(CancelReason::DuplicatePromptDismissed),
            1
        );
    }

    #[test]
    fn destroyed_owner_disarms_decisions() {
        let downloads = LiveDownloads::new();
        let origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        let ctx = context(&downloads, &origin, Arc::new(FixedDownloadDirectory::new("/dl")));
        let (calls, callback) = recording_callback();

        let mut delegate = DuplicateResolutionDelegate::new(ctx, id, "/dl/report.pdf", callback).unwrap();
        downloads.destroy(id);

        assert!(!delegate.is_owner_live());
        assert!(delegate.accept());
        assert!(delegate.cancel());
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(delegate.state(), DecisionState::Pending);
    }

    #[test]
    fn explicit_owner_destroyed_disarms_without_table_change() {
        let downloads = LiveDownloads::new();
        let origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        let ctx = context(&downloads, &origin, Arc::new(FixedDownloadDirectory::new("/dl")));
        let (calls, callback) = recording_callback();

        let mut delegate = DuplicateResolutionDelegate::new(ctx, id, "/dl/report.pdf", callback).unwrap();
        delegate.on_owner_destroyed();

        assert!(delegate.cancel());
        assert!(calls.lock().unwrap().is_empty());
        assert!(downloads.is_live(id));
    }

    #[test]
    fn missing_download_directory_resolves_empty() {
        let downloads = LiveDownloads::new();
        let origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        let ctx = context(&downloads, &origin, Arc::new(NoDirectory));
        let telemetry = ctx.telemetry.clone();
        let (calls, callback) = recording_callback();

        let mut delegate = DuplicateResolutionDelegate::new(ctx, id, "/dl/report.pdf", callback).unwrap();
        assert!(delegate.accept());

        assert_eq!(*calls.lock().unwrap(), vec![None]);
        assert_eq!(telemetry.counts().get(CancelReason::NoDownloadDirectory), 1);
    }

    #[tokio::test]
    async fn accept_delivers_reserved_path_on_origin() {
        let downloads = LiveDownloads::new();
        let mut origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        let ctx = context(&downloads, &origin, Arc::new(FixedDownloadDirectory::new("/dl")));
        let (calls, callback) = recording_callback();

        let mut delegate = DuplicateResolutionDelegate::new(ctx, id, "/dl/report.pdf", callback).unwrap();
        assert!(delegate.accept());
        assert!(delegate.accept());
        assert_eq!(delegate.state(), DecisionState::Accepted);

        origin.run_next().await;
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Some(PathBuf::from("/dl/report.pdf"))]
        );
    }

    #[tokio::test]
    async fn owner_destroyed_after_accept_discards_reservation() {
        let downloads = LiveDownloads::new();
        let mut origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        let ctx = context(&downloads, &origin, Arc::new(FixedDownloadDirectory::new("/dl")));
        let registry = Arc::clone(ctx.tracker.registry());
        let telemetry = ctx.telemetry.clone();
        let (calls, callback) = recording_callback();

        let mut delegate = DuplicateResolutionDelegate::new(ctx, id, "/dl/report.pdf", callback).unwrap();
        assert!(delegate.accept());
        delegate.on_owner_destroyed();
        origin.run_next().await;

        assert_eq!(*calls.lock().unwrap(), vec![None]);
        assert!(registry.is_empty());
        assert_eq!(telemetry.counts().get(CancelReason::OwnerDestroyed), 1);
    }

    #[test]
    fn set_target_directory_keeps_filename_until_resolved() {
        let downloads = LiveDownloads::new();
        let origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        let ctx = context(&downloads, &origin, Arc::new(FixedDownloadDirectory::new("/dl")));
        let (_, callback) = recording_callback();

        let mut delegate = DuplicateResolutionDelegate::new(ctx, id, "/dl/report.pdf", callback).unwrap();
        assert!(delegate.set_target_directory("/sd/card"));
        assert_eq!(delegate.path(), Path::new("/sd/card/report.pdf"));

        delegate.cancel();
        assert!(!delegate.set_target_directory("/elsewhere"));
        assert_eq!(delegate.path(), Path::new("/sd/card/report.pdf"));
    }

    #[test]
    fn set_target_directory_needs_a_filename() {
        let downloads = LiveDownloads::new();
        let origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        let ctx = context(&downloads, &origin, Arc::new(FixedDownloadDirectory::new("/dl")));
        let (_, callback) = recording_callback();

        let mut delegate = DuplicateResolutionDelegate::new(ctx, id, "/", callback).unwrap();
        assert!(!delegate.set_target_directory("/sd"));
    }

    #[test]
    fn drop_unregisters_observer() {
        let downloads = LiveDownloads::new();
        let origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        let ctx = context(&downloads, &origin, Arc::new(FixedDownloadDirectory::new("/dl")));
        let (_, callback) = recording_callback();

        let delegate = DuplicateResolutionDelegate::new(ctx, id, "/dl/a.pdf", callback).unwrap();
        assert_eq!(downloads.observer_count(id), 1);
        drop(delegate);
        assert_eq!(downloads.observer_count(id), 0);
    }

    #[test]
    fn gone_download_has_no_delegate() {
        let downloads = LiveDownloads::new();
        let origin = OriginContext::new();
        let id = downloads.register(private_pdf());
        downloads.destroy(id);
        let ctx = context(&downloads, &origin, Arc::new(FixedDownloadDirectory::new("/dl")));
        let (_, callback) = recording_callback();

        assert!(DuplicateResolutionDelegate::new(ctx, id, "/dl/a.pdf", callback).is_none());
    }
}

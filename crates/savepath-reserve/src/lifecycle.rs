//! Live-download table and revocable lifecycle handles.
//!
//! The download pipeline owns each download's mutable record. Everything else
//! reaches it through a `DownloadId` looked up in `LiveDownloads`, and
//! `destroy` removes the entry, so a late reader finds nothing instead of
//! stale state. Observers registered for a download are told synchronously
//! when it is destroyed.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use savepath_core::{DownloadId, DownloadInfo};

/// Mutable state of one download, as seen by the reservation subsystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadRecord {
    /// Expected size in bytes, `0` if unknown.
    pub total_bytes: i64,
    /// MIME type of the content.
    pub mime_type: String,
    /// Whether the owning browsing context is private.
    pub off_the_record: bool,
    /// The file path currently associated with the download.
    pub target_path: Option<PathBuf>,
    /// URL of the page that started the download.
    pub page_url: String,
    /// Whether the download saves an offline copy of a page.
    pub is_offline_page: bool,
}

impl DownloadRecord {
    /// Seed a record from response metadata.
    ///
    /// An unknown content length becomes `0`; the referrer stands in for the
    /// page URL.
    pub fn from_info(info: &DownloadInfo, off_the_record: bool) -> Self {
        Self {
            total_bytes: info.total_bytes.max(0),
            mime_type: info.original_mime_type.clone(),
            off_the_record,
            target_path: None,
            page_url: info.referrer.clone(),
            is_offline_page: false,
        }
    }
}

/// Receives destruction notices for downloads it observes.
pub trait DownloadObserver: Send + Sync {
    /// The download `id` was destroyed. Called synchronously by `destroy`.
    fn on_download_destroyed(&self, id: DownloadId);
}

/// Registration token returned by [`LiveDownloads::add_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

struct LiveEntry {
    record: DownloadRecord,
    observers: Vec<(ObserverId, Weak<dyn DownloadObserver>)>,
}

#[derive(Default)]
struct LiveDownloadsInner {
    entries: RwLock<HashMap<DownloadId, LiveEntry>>,
    next_observer: AtomicU64,
}

impl LiveDownloadsInner {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<DownloadId, LiveEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DownloadId, LiveEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Table of downloads that are currently alive.
///
/// Cheap to clone; all clones share the same table.
#[derive(Clone, Default)]
pub struct LiveDownloads {
    inner: Arc<LiveDownloadsInner>,
}

impl LiveDownloads {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a download with a fresh identity.
    pub fn register(&self, record: DownloadRecord) -> DownloadId {
        let id = DownloadId::new();
        self.register_with_id(id, record);
        id
    }

    /// Add a download under an identity minted by the pipeline.
    ///
    /// Returns `false` (and changes nothing) if `id` is already live.
    pub fn register_with_id(&self, id: DownloadId, record: DownloadRecord) -> bool {
        let mut entries = self.inner.write();
        if entries.contains_key(&id) {
            return false;
        }
        entries.insert(
            id,
            LiveEntry {
                record,
                observers: Vec::new(),
            },
        );
        true
    }

    /// Mutate a live download's record. Returns `false` if it is gone.
    pub fn update(&self, id: DownloadId, f: impl FnOnce(&mut DownloadRecord)) -> bool {
        self.inner
            .write()
            .get_mut(&id)
            .map(|entry| f(&mut entry.record))
            .is_some()
    }

    /// Whether `id` is still alive.
    pub fn is_live(&self, id: DownloadId) -> bool {
        self.inner.read().contains_key(&id)
    }

    /// Copy of a live download's record.
    pub fn record(&self, id: DownloadId) -> Option<DownloadRecord> {
        self.inner.read().get(&id).map(|entry| entry.record.clone())
    }

    /// A revocable handle to a live download, or `None` if it is gone.
    pub fn handle(&self, id: DownloadId) -> Option<LifecycleHandle> {
        self.is_live(id).then(|| LifecycleHandle {
            id,
            downloads: Arc::downgrade(&self.inner),
            revoked: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Register `observer` for destruction of `id`.
    ///
    /// The table keeps only a weak reference. Returns `None` if `id` is gone.
    pub fn add_observer(
        &self,
        id: DownloadId,
        observer: Weak<dyn DownloadObserver>,
    ) -> Option<ObserverId> {
        let mut entries = self.inner.write();
        let entry = entries.get_mut(&id)?;
        let observer_id = ObserverId(self.inner.next_observer.fetch_add(1, Ordering::Relaxed));
        entry.observers.push((observer_id, observer));
        Some(observer_id)
    }

    /// Unregister an observer. Harmless if the download is already gone.
    pub fn remove_observer(&self, id: DownloadId, observer: ObserverId) -> bool {
        let mut entries = self.inner.write();
        let Some(entry) = entries.get_mut(&id) else {
            return false;
        };
        let before = entry.observers.len();
        entry.observers.retain(|(oid, _)| *oid != observer);
        entry.observers.len() != before
    }

    /// Number of observers registered for `id`.
    pub fn observer_count(&self, id: DownloadId) -> usize {
        self.inner
            .read()
            .get(&id)
            .map_or(0, |entry| entry.observers.len())
    }

    /// Destroy a download: forget its record and notify its observers.
    ///
    /// Observers run after the entry is removed and outside the table lock,
    /// so they may call back into the table. Returns `false` if `id` was not
    /// live.
    pub fn destroy(&self, id: DownloadId) -> bool {
        let Some(entry) = self.inner.write().remove(&id) else {
            return false;
        };

        tracing::debug!(
            id = %id,
            observers = entry.observers.len(),
            "Download destroyed"
        );

        for (_, observer) in entry.observers {
            if let Some(observer) = observer.upgrade() {
                observer.on_download_destroyed(id);
            }
        }
        true
    }

    /// Number of live downloads.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no download is live.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl fmt::Debug for LiveDownloads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveDownloads")
            .field("live", &self.len())
            .finish()
    }
}

/// Weak, revocable view of one download's record.
///
/// Never owns the record. Every accessor re-checks liveness and returns
/// `None` once the handle is invalidated or the download is destroyed.
/// Clones share revocation.
#[derive(Clone)]
pub struct LifecycleHandle {
    id: DownloadId,
    downloads: Weak<LiveDownloadsInner>,
    revoked: Arc<AtomicBool>,
}

impl LifecycleHandle {
    /// The observed download.
    pub const fn id(&self) -> DownloadId {
        self.id
    }

    /// Revoke the handle. Later accessors report "unavailable".
    pub fn invalidate(&self) {
        self.revoked.store(true, Ordering::Release);
    }

    /// Whether the handle is unrevoked and the download is still present.
    pub fn is_valid(&self) -> bool {
        self.with_record(|_| ()).is_some()
    }

    /// Run `f` on the live record, if there still is one.
    pub fn with_record<R>(&self, f: impl FnOnce(&DownloadRecord) -> R) -> Option<R> {
        if self.revoked.load(Ordering::Acquire) {
            return None;
        }
        let inner = self.downloads.upgrade()?;
        let entries = inner.read();
        entries.get(&self.id).map(|entry| f(&entry.record))
    }

    /// Total bytes of the download.
    pub fn total_bytes(&self) -> Option<i64> {
        self.with_record(|r| r.total_bytes)
    }

    /// MIME type of the download.
    pub fn mime_type(&self) -> Option<String> {
        self.with_record(|r| r.mime_type.clone())
    }

    /// Privacy flag of the owning browsing context.
    pub fn is_off_the_record(&self) -> Option<bool> {
        self.with_record(|r| r.off_the_record)
    }

    /// File path currently associated with the download.
    pub fn target_path(&self) -> Option<PathBuf> {
        self.with_record(|r| r.target_path.clone()).flatten()
    }

    /// URL of the page that started the download.
    pub fn page_url(&self) -> Option<String> {
        self.with_record(|r| r.page_url.clone())
    }

    /// Whether the download is an offline page.
    pub fn is_offline_page(&self) -> Option<bool> {
        self.with_record(|r| r.is_offline_page)
    }
}

impl fmt::Debug for LifecycleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHandle")
            .field("id", &self.id)
            .field("revoked", &self.revoked.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

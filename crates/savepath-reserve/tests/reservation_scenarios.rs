//! End-to-end reservation scenarios against a real temporary directory.

mod common;

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use savepath_core::{
    ConflictPolicy, FixedDownloadDirectory, ReservationError, ReservationEvent,
    ReservationRequest, ReservationSettings,
};
use savepath_reserve::{
    DownloadRecord, OriginContext, ReservationService, ReservationServiceDeps,
    build_reservation_service,
};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use common::{CountingProbe, RecordingEmitter};

struct Harness {
    service: Arc<ReservationService>,
    probe: Arc<CountingProbe>,
    emitter: RecordingEmitter,
    origin: OriginContext,
    dir: TempDir,
}

fn harness(settings: ReservationSettings) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let probe = Arc::new(CountingProbe::default());
    let emitter = RecordingEmitter::default();
    let origin = OriginContext::new();

    let service = build_reservation_service(
        ReservationServiceDeps {
            probe: Arc::clone(&probe),
            directories: Arc::new(FixedDownloadDirectory::new(dir.path())),
            event_emitter: Arc::new(emitter.clone()),
            settings,
        },
        origin.handle(),
    )
    .unwrap();

    Harness {
        service: Arc::new(service),
        probe,
        emitter,
        origin,
        dir,
    }
}

impl Harness {
    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn request(&self, name: &str) -> ReservationRequest {
        let id = self.service.register_download(DownloadRecord::default());
        ReservationRequest::new(id, self.path(name), self.dir.path())
    }
}

#[tokio::test]
async fn free_target_is_reserved_as_requested() {
    let h = harness(ReservationSettings::default());

    let reserved = assert_ok!(h.service.reserve_path(h.request("notes.txt")).await);
    assert_eq!(reserved.path(), h.path("notes.txt"));

    let events = h.emitter.events();
    assert!(matches!(
        events.as_slice(),
        [ReservationEvent::Reserved { uniquified: false, .. }]
    ));
}

#[tokio::test]
async fn existing_file_yields_first_then_second_suffix() {
    let h = harness(ReservationSettings::default());
    fs::write(h.path("report.pdf"), b"old").unwrap();

    let first = assert_ok!(h.service.reserve_path(h.request("report.pdf")).await);
    assert_eq!(first.path(), h.path("report (1).pdf"));

    fs::write(h.path("report (1).pdf"), b"partial").unwrap();
    h.service.release(first.path());

    let second = assert_ok!(h.service.reserve_path(h.request("report.pdf")).await);
    assert_eq!(second.path(), h.path("report (2).pdf"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_are_pairwise_distinct() {
    let h = harness(ReservationSettings::default());
    fs::write(h.path("report.pdf"), b"old").unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&h.service);
            let request = h.request("report.pdf");
            tokio::spawn(async move { service.reserve_path(request).await })
        })
        .collect();

    let mut paths = BTreeSet::new();
    for task in tasks {
        let reserved = assert_ok!(task.await.unwrap());
        assert!(paths.insert(reserved.into_path()), "duplicate reservation");
    }

    let expected: BTreeSet<PathBuf> = (1..=8)
        .map(|n| h.path(&format!("report ({n}).pdf")))
        .collect();
    assert_eq!(paths, expected);
}

#[tokio::test]
async fn compound_extension_is_uniquified_as_a_unit() {
    let h = harness(ReservationSettings::default());
    fs::write(h.path("backup.tar.gz"), b"old").unwrap();

    let reserved = assert_ok!(h.service.reserve_path(h.request("backup.tar.gz")).await);
    assert_eq!(reserved.path(), h.path("backup (1).tar.gz"));
}

#[tokio::test]
async fn uncreatable_directory_fails_without_probing_paths() {
    let h = harness(ReservationSettings::default());
    fs::write(h.path("blocker"), b"not a directory").unwrap();

    let request = h.request("blocker/sub/a.txt").with_create_directory(true);
    let err = assert_err!(h.service.reserve_path(request).await);

    assert!(matches!(err, ReservationError::DirectoryUnavailable { .. }));
    assert!(err.is_recoverable());
    assert_eq!(h.probe.exists_calls(), 0);
    assert!(h.service.registry().is_empty());
}

#[tokio::test]
async fn missing_user_directory_is_not_recreated() {
    let h = harness(ReservationSettings::default());

    let err = assert_err!(h.service.reserve_path(h.request("gone/a.txt")).await);
    assert!(matches!(err, ReservationError::DirectoryUnavailable { .. }));
    assert!(!h.path("gone").exists());
}

#[tokio::test]
async fn missing_download_directory_is_created() {
    let h = harness(ReservationSettings::default());
    let download_dir = h.path("fresh");
    let id = h.service.register_download(DownloadRecord::default());

    let request = ReservationRequest::new(id, download_dir.join("a.txt"), &download_dir);
    let reserved = assert_ok!(h.service.reserve_path(request).await);

    assert!(download_dir.is_dir());
    assert_eq!(reserved.path(), download_dir.join("a.txt"));
}

#[tokio::test]
async fn fail_policy_stops_at_first_collision() {
    let h = harness(ReservationSettings::default());
    fs::write(h.path("a.txt"), b"").unwrap();

    let request = h.request("a.txt").with_policy(ConflictPolicy::Fail);
    let err = assert_err!(h.service.reserve_path(request).await);

    assert_eq!(err, ReservationError::conflict(h.path("a.txt")));
    assert_eq!(h.probe.exists_calls(), 1);
}

#[tokio::test]
async fn overwrite_claims_existing_file() {
    let h = harness(ReservationSettings::default());
    fs::write(h.path("a.txt"), b"").unwrap();

    let request = h.request("a.txt").with_policy(ConflictPolicy::Overwrite);
    let reserved = assert_ok!(h.service.reserve_path(request).await);

    assert_eq!(reserved.path(), h.path("a.txt"));
    assert_eq!(h.probe.exists_calls(), 0);
}

#[tokio::test]
async fn suffix_search_is_bounded() {
    let settings = ReservationSettings {
        max_uniquify_attempts: Some(3),
        ..ReservationSettings::default()
    };
    let h = harness(settings);
    for name in ["a.txt", "a (1).txt", "a (2).txt", "a (3).txt"] {
        fs::write(h.path(name), b"").unwrap();
    }

    let err = assert_err!(h.service.reserve_path(h.request("a.txt")).await);
    assert_eq!(err, ReservationError::exhausted(h.path("a.txt"), 3));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn release_twice_leaves_other_claims_intact() {
    let h = harness(ReservationSettings::default());
    let kept = assert_ok!(h.service.reserve_path(h.request("kept.txt")).await);
    let dropped = assert_ok!(h.service.reserve_path(h.request("dropped.txt")).await);

    assert!(h.service.release(dropped.path()));
    assert!(!h.service.release(dropped.path()));
    assert!(!h.service.release(&h.path("never.txt")));

    assert_eq!(h.service.registry().owner_of(kept.path()), Some(kept.owner));

    let again = assert_ok!(h.service.reserve_path(h.request("dropped.txt")).await);
    assert_eq!(again.path(), dropped.path());
}

#[tokio::test]
async fn callback_runs_on_origin_exactly_once() {
    let mut h = harness(ReservationSettings::default());
    let (tx, rx) = std::sync::mpsc::channel();

    h.service.reserve(h.request("a.txt"), move |result| {
        tx.send((std::thread::current().id(), result)).unwrap();
    });

    assert_eq!(h.origin.run_pending(), 0);
    h.origin.run_next().await;

    let (thread, result) = rx.try_recv().unwrap();
    assert_eq!(thread, std::thread::current().id());
    assert_eq!(assert_ok!(result).path(), h.path("a.txt"));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn destroyed_owner_gets_empty_result_and_claim_is_freed() {
    let mut h = harness(ReservationSettings::default());
    let request = h.request("a.txt");
    let owner = request.owner;
    let (tx, rx) = std::sync::mpsc::channel();

    h.service.reserve(request, move |result| tx.send(result).unwrap());
    h.service.destroy_download(owner);
    h.origin.run_next().await;

    let err = assert_err!(rx.try_recv().unwrap());
    assert!(err.is_owner_gone());
    assert!(h.service.registry().is_empty());
}

#[test]
fn reservations_work_outside_the_tokio_test_macro() {
    let h = harness(ReservationSettings::default());

    let reserved = tokio_test::block_on(h.service.reserve_path(h.request("sync.txt")));
    assert_eq!(assert_ok!(reserved).path(), h.path("sync.txt"));
}

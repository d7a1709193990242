//! Shared test doubles for the reservation integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use savepath_core::{FsPathProbe, PathProbe, ReservationEvent, ReservationEventEmitterPort};

/// Real filesystem probe that counts how often it is asked.
#[derive(Default)]
pub struct CountingProbe {
    inner: FsPathProbe,
    exists_calls: AtomicUsize,
    ensure_calls: AtomicUsize,
}

impl CountingProbe {
    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.exists_calls() + self.ensure_calls()
    }
}

impl PathProbe for CountingProbe {
    fn exists(&self, path: &Path) -> bool {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(path)
    }

    fn ensure_directory(&self, dir: &Path, create: bool) -> bool {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.ensure_directory(dir, create)
    }
}

/// Emitter that keeps every event it sees.
#[derive(Clone, Default)]
pub struct RecordingEmitter {
    events: Arc<Mutex<Vec<ReservationEvent>>>,
}

impl RecordingEmitter {
    pub fn events(&self) -> Vec<ReservationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ReservationEventEmitterPort for RecordingEmitter {
    fn emit(&self, event: ReservationEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn clone_box(&self) -> Box<dyn ReservationEventEmitterPort> {
        Box::new(self.clone())
    }
}

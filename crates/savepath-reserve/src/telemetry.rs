//! Cancellation telemetry.

use std::sync::{Arc, Mutex, PoisonError};

use savepath_core::{
    CancelReason, CancelReasonCounts, DownloadId, ReservationEvent, ReservationEventEmitterPort,
};

/// Records why downloads were cancelled.
///
/// Every cancellation is forwarded to the event sink and tallied in an
/// in-process `CancelReasonCounts`. Clones share the tally.
#[derive(Clone)]
pub struct CancelTelemetry {
    emitter: Arc<dyn ReservationEventEmitterPort>,
    counts: Arc<Mutex<CancelReasonCounts>>,
}

impl CancelTelemetry {
    /// Create a recorder that forwards to `emitter`.
    pub fn new(emitter: Arc<dyn ReservationEventEmitterPort>) -> Self {
        Self {
            emitter,
            counts: Arc::new(Mutex::new(CancelReasonCounts::new())),
        }
    }

    /// Record one cancellation of `id`.
    pub fn record(&self, id: DownloadId, reason: CancelReason) {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(reason);
        self.emitter.emit(ReservationEvent::cancelled(id, reason));
    }

    /// Snapshot of the tally so far.
    pub fn counts(&self) -> CancelReasonCounts {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for CancelTelemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelTelemetry")
            .field("counts", &self.counts())
            .finish_non_exhaustive()
    }
}

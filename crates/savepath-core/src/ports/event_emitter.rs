//! Reservation event emitter port.
//!
//! This port abstracts event emission so the tracker and delegate can report
//! reservations and cancellations without knowing the host's telemetry sink.

use crate::download::ReservationEvent;

/// Port for emitting reservation events.
pub trait ReservationEventEmitterPort: Send + Sync {
    /// Emit an event. Must not block.
    fn emit(&self, event: ReservationEvent);

    /// Clone this emitter into a boxed trait object.
    fn clone_box(&self) -> Box<dyn ReservationEventEmitterPort>;
}

/// A no-op emitter for tests and CLI contexts.
#[derive(Debug, Clone, Default)]
pub struct NoopReservationEmitter;

impl NoopReservationEmitter {
    /// Create a new no-op emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ReservationEventEmitterPort for NoopReservationEmitter {
    fn emit(&self, _event: ReservationEvent) {}

    fn clone_box(&self) -> Box<dyn ReservationEventEmitterPort> {
        Box::new(self.clone())
    }
}

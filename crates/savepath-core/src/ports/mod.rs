//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the reservation core expects from its
//! surroundings: the filesystem, the host's download directory lookup and
//! the telemetry sink.
//!
//! # Design Rules
//!
//! - Only domain types in signatures
//! - Synchronous; blocking implementations are run off the origin context
//!   by the caller

pub mod download_directory;
pub mod event_emitter;
pub mod path_probe;

pub use download_directory::DownloadDirectoryPort;
pub use event_emitter::{NoopReservationEmitter, ReservationEventEmitterPort};
pub use path_probe::PathProbe;

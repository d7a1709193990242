//! Reservation domain types, events and errors.
//!
//! This module contains pure data types. No I/O or runtime dependencies.
//!
//! # Structure
//!
//! - `types` - Identifiers and request/result values (`DownloadId`, `ReservationRequest`, `ReservedPath`)
//! - `events` - Reservation events and cancellation reasons
//! - `errors` - Error taxonomy for reservations
//! - `info` - Download metadata transcribed from responses

pub mod errors;
pub mod events;
pub mod info;
pub mod types;

// Re-export commonly used types
pub use errors::{ReservationError, ReservationResult};
pub use events::{CancelReason, CancelReasonCounts, ReservationEvent};
pub use info::{DEFAULT_USER_AGENT, DownloadInfo, ResponseMetadata};
pub use types::{ConflictPolicy, DownloadId, ReservationRequest, ReservedPath};

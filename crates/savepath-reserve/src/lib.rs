//! Download target reservation for savepath.
//!
//! - `registry` - Process-wide table of claimed paths
//! - `origin` - Run queue results are delivered on
//! - `lifecycle` - Live downloads and revocable lifecycle handles
//! - `tracker` - Path reservation (probe, claim, uniquify)
//! - `delegate` - Duplicate-download decision state machine
//! - `service` - Composed service built at the composition root
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use savepath_core::{
//!     FsPathProbe, NoopReservationEmitter, PlatformDownloadDirectory, ReservationRequest,
//!     ReservationSettings,
//! };
//! use savepath_reserve::{
//!     DownloadRecord, OriginContext, ReservationServiceDeps, build_reservation_service,
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let origin = OriginContext::new();
//! let service = build_reservation_service(
//!     ReservationServiceDeps {
//!         probe: Arc::new(FsPathProbe::new()),
//!         directories: Arc::new(PlatformDownloadDirectory::new()),
//!         event_emitter: Arc::new(NoopReservationEmitter::new()),
//!         settings: ReservationSettings::with_defaults(),
//!     },
//!     origin.handle(),
//! )?;
//!
//! let id = service.register_download(DownloadRecord::default());
//! let dir = service.default_download_dir()?;
//! let reserved = service
//!     .reserve_path(ReservationRequest::new(id, dir.join("report.pdf"), &dir))
//!     .await?;
//! println!("saving to {}", reserved.path().display());
//! # Ok(())
//! # }
//! ```

#![deny(unused_crate_dependencies)]

mod delegate;
mod lifecycle;
mod origin;
mod registry;
mod service;
mod telemetry;
mod tracker;

pub use delegate::{
    DecisionState, DelegateContext, DuplicateResolutionDelegate, FileSelectedCallback,
};
pub use lifecycle::{DownloadObserver, DownloadRecord, LifecycleHandle, LiveDownloads, ObserverId};
pub use origin::{OriginContext, OriginHandle};
pub use registry::{ClaimOutcome, ReservationRegistry};
pub use service::{ReservationService, ReservationServiceDeps, build_reservation_service};
pub use telemetry::CancelTelemetry;
pub use tracker::{PathReservationTracker, TrackerDeps};

// Dev-dependencies exercised only by the integration tests
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;

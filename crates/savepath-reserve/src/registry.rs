//! Process-wide table of claimed target paths.
//!
//! The registry is the only state shared between concurrent reservations.
//! It is touched from blocking probe workers and from the origin context, so
//! it uses a `std` mutex and never holds it across I/O.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use savepath_core::{DownloadId, ReservedPath};

/// Outcome of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The path was free and now belongs to the caller.
    Claimed,
    /// The caller already held the path.
    AlreadyOwned,
    /// Another download holds the path.
    Taken,
}

impl ClaimOutcome {
    /// Whether the caller holds the path after the attempt.
    #[must_use]
    pub const fn is_held(self) -> bool {
        matches!(self, Self::Claimed | Self::AlreadyOwned)
    }
}

/// Map of reserved path → owning download.
///
/// INVARIANT: at most one entry per path. Membership is the only source of
/// truth for "is this path claimed".
#[derive(Debug, Default)]
pub struct ReservationRegistry {
    claims: Mutex<HashMap<PathBuf, DownloadId>>,
}

impl ReservationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn claims(&self) -> MutexGuard<'_, HashMap<PathBuf, DownloadId>> {
        // Every critical section leaves the map consistent, so a poisoned
        // lock still guards valid data.
        self.claims.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically claim `path` for `owner` if nobody else holds it.
    ///
    /// Of two racing claims for the same path exactly one gets `Claimed`.
    pub fn claim(&self, path: &Path, owner: DownloadId) -> ClaimOutcome {
        let mut claims = self.claims();
        match claims.get(path) {
            Some(holder) if *holder == owner => ClaimOutcome::AlreadyOwned,
            Some(_) => ClaimOutcome::Taken,
            None => {
                claims.insert(path.to_path_buf(), owner);
                ClaimOutcome::Claimed
            }
        }
    }

    /// Claim `path` for `owner`, returning whether the caller now holds it.
    pub fn try_claim(&self, path: &Path, owner: DownloadId) -> bool {
        self.claim(path, owner).is_held()
    }

    /// Drop the claim on `path`.
    ///
    /// Idempotent: releasing an unclaimed path is a no-op. Returns whether
    /// an entry was removed.
    pub fn release(&self, path: &Path) -> bool {
        self.claims().remove(path).is_some()
    }

    /// Drop the claim on `path` only if `owner` still holds it.
    pub fn release_for(&self, path: &Path, owner: DownloadId) -> bool {
        let mut claims = self.claims();
        if claims.get(path) == Some(&owner) {
            claims.remove(path);
            true
        } else {
            false
        }
    }

    /// Drop every claim held by `owner`, returning the released paths.
    pub fn release_owner(&self, owner: DownloadId) -> Vec<PathBuf> {
        let mut claims = self.claims();
        let released: Vec<PathBuf> = claims
            .iter()
            .filter(|(_, holder)| **holder == owner)
            .map(|(path, _)| path.clone())
            .collect();
        for path in &released {
            claims.remove(path);
        }
        released
    }

    /// Whether some download other than `owner` holds `path`.
    pub fn is_claimed_by_other(&self, path: &Path, owner: DownloadId) -> bool {
        self.claims().get(path).is_some_and(|holder| *holder != owner)
    }

    /// Whether anyone holds `path`.
    pub fn is_claimed(&self, path: &Path) -> bool {
        self.claims().contains_key(path)
    }

    /// The download holding `path`, if any.
    pub fn owner_of(&self, path: &Path) -> Option<DownloadId> {
        self.claims().get(path).copied()
    }

    /// Snapshot of all current claims.
    pub fn snapshot(&self) -> Vec<ReservedPath> {
        self.claims()
            .iter()
            .map(|(path, owner)| ReservedPath::new(path.clone(), *owner))
            .collect()
    }

    /// Number of claimed paths.
    pub fn len(&self) -> usize {
        self.claims().len()
    }

    /// Whether no path is claimed.
    pub fn is_empty(&self) -> bool {
        self.claims().is_empty()
    }
}

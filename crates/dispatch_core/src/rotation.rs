//! Rotation stats: when each driver last drove and how many rides they took recently.
//!
//! The matcher only ever reads a [`RotationSnapshot`]. Writes happen when a ride is
//! *accepted*, which is outside the matcher. Two concurrent matches may rank the same idle
//! driver first; whoever performs the acceptance must do a conditional write so only one of
//! them wins. [`InMemoryRotationLedger::record_acceptance`] shows the shape of that write
//! with an optimistic version check.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::model::{DriverId, RideId};

pub const DEFAULT_FAIRNESS_WINDOW_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSnapshot {
    pub driver_id: DriverId,
    /// `None` means the driver has never driven; they are treated as maximally stale.
    #[serde(default)]
    pub last_drove: Option<NaiveDateTime>,
    /// Rides inside the trailing fairness window.
    #[serde(default)]
    pub recent_ride_count: u32,
}

impl RotationSnapshot {
    pub fn never_driven(driver_id: DriverId) -> Self {
        Self {
            driver_id,
            last_drove: None,
            recent_ride_count: 0,
        }
    }
}

/// One accepted ride in a driver's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideHistoryEntry {
    pub driver_id: DriverId,
    pub ride_id: RideId,
    pub driven_at: NaiveDateTime,
}

/// Read/write boundary for rotation stats.
pub trait RotationLedger: Send + Sync {
    /// Rotation stats as of `now`, counting rides in the last `window_days` days.
    fn snapshot(&self, driver: &DriverId, now: NaiveDateTime, window_days: u32) -> RotationSnapshot;

    /// Current write version for `driver`. Read it before ranking, pass it back on acceptance.
    fn version(&self, driver: &DriverId) -> u64;

    /// Record an accepted ride if nobody else wrote since `expected_version` was read.
    ///
    /// Returns the new version.
    fn record_acceptance(
        &mut self,
        driver: &DriverId,
        ride: &RideId,
        accepted_at: NaiveDateTime,
        expected_version: u64,
    ) -> Result<u64, LedgerError>;
}

#[derive(Debug, Default, Clone)]
struct DriverHistory {
    drives: Vec<(RideId, NaiveDateTime)>,
    version: u64,
}

/// Ride-history-backed ledger for tests, the CLI and single-process callers.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRotationLedger {
    drivers: HashMap<DriverId, DriverHistory>,
}

impl InMemoryRotationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(entries: impl IntoIterator<Item = RideHistoryEntry>) -> Self {
        let mut ledger = Self::new();
        for entry in entries {
            ledger
                .drivers
                .entry(entry.driver_id)
                .or_default()
                .drives
                .push((entry.ride_id, entry.driven_at));
        }
        ledger
    }
}

impl RotationLedger for InMemoryRotationLedger {
    fn snapshot(&self, driver: &DriverId, now: NaiveDateTime, window_days: u32) -> RotationSnapshot {
        let Some(history) = self.drivers.get(driver) else {
            return RotationSnapshot::never_driven(driver.clone());
        };
        // A window reaching past the calendar's start has no lower bound.
        let window_start = Duration::try_days(i64::from(window_days))
            .and_then(|window| now.checked_sub_signed(window));
        // Rides scheduled after `now` have not been driven yet.
        let past = history.drives.iter().map(|(_, at)| *at).filter(|at| *at <= now);

        let mut last_drove = None;
        let mut recent_ride_count = 0u32;
        for at in past {
            last_drove = last_drove.max(Some(at));
            if window_start.map_or(true, |start| at > start) {
                recent_ride_count = recent_ride_count.saturating_add(1);
            }
        }
        RotationSnapshot {
            driver_id: driver.clone(),
            last_drove,
            recent_ride_count,
        }
    }

    fn version(&self, driver: &DriverId) -> u64 {
        self.drivers.get(driver).map_or(0, |h| h.version)
    }

    fn record_acceptance(
        &mut self,
        driver: &DriverId,
        ride: &RideId,
        accepted_at: NaiveDateTime,
        expected_version: u64,
    ) -> Result<u64, LedgerError> {
        let history = self.drivers.entry(driver.clone()).or_default();
        if history.version != expected_version {
            return Err(LedgerError::VersionConflict {
                driver: driver.clone(),
                expected: expected_version,
                actual: history.version,
            });
        }
        if history.drives.iter().any(|(id, _)| id == ride) {
            return Err(LedgerError::DuplicateRide {
                driver: driver.clone(),
                ride: ride.clone(),
            });
        }
        history.drives.push((ride.clone(), accepted_at));
        history.version += 1;
        tracing::debug!(driver = %driver, ride = %ride, version = history.version, "rotation updated");
        Ok(history.version)
    }
}

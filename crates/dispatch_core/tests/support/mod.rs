#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::NaiveDateTime;
use dispatch_core::audit::AuditSink;
use dispatch_core::directory::SnapshotSource;
use dispatch_core::error::{AuditError, SourceError};
use dispatch_core::matching::{ExclusionReason, RotationByDriver, UnavailabilityByDriver};
use dispatch_core::model::{DriverCandidate, DriverId, OrgId, RideId, TimeWindow};
use dispatch_core::rotation::RotationSnapshot;
use dispatch_core::schedule::UnavailabilityWindow;

pub fn rotation_map(snapshots: impl IntoIterator<Item = RotationSnapshot>) -> RotationByDriver {
    snapshots
        .into_iter()
        .map(|s| (s.driver_id.clone(), s))
        .collect()
}

pub fn time_off_map(entries: impl IntoIterator<Item = UnavailabilityWindow>) -> UnavailabilityByDriver {
    let mut map: UnavailabilityByDriver = HashMap::new();
    for entry in entries {
        map.entry(entry.driver_id.clone()).or_default().push(entry);
    }
    map
}

/// Which collaborator call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    Candidates,
    Unavailability,
    Rotation,
}

/// Snapshot source over fixed data that can be told to fail one fetch.
pub struct ScriptedSource {
    pub candidates: Vec<DriverCandidate>,
    pub unavailability: UnavailabilityByDriver,
    pub rotation: RotationByDriver,
    pub fail_at: FailAt,
    pub calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(candidates: Vec<DriverCandidate>) -> Self {
        Self {
            candidates,
            unavailability: HashMap::new(),
            rotation: HashMap::new(),
            fail_at: FailAt::Nothing,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, step: FailAt) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == step {
            return Err(SourceError::Unavailable(format!("{step:?} store offline")));
        }
        Ok(())
    }
}

impl SnapshotSource for ScriptedSource {
    fn candidates(&self, _organization: &OrgId) -> Result<Vec<DriverCandidate>, SourceError> {
        self.check(FailAt::Candidates)?;
        Ok(self.candidates.clone())
    }

    fn unavailability(
        &self,
        _organization: &OrgId,
        _window: &TimeWindow,
    ) -> Result<UnavailabilityByDriver, SourceError> {
        self.check(FailAt::Unavailability)?;
        Ok(self.unavailability.clone())
    }

    fn rotation(
        &self,
        _organization: &OrgId,
        _now: NaiveDateTime,
        _fairness_window_days: u32,
    ) -> Result<RotationByDriver, SourceError> {
        self.check(FailAt::Rotation)?;
        Ok(self.rotation.clone())
    }
}

/// Keeps every exclusion it is given.
#[derive(Default)]
pub struct RecordingAuditSink {
    pub records: Mutex<Vec<(DriverId, ExclusionReason)>>,
}

impl RecordingAuditSink {
    pub fn recorded(&self) -> Vec<(DriverId, ExclusionReason)> {
        self.records.lock().expect("audit lock").clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record_exclusion(
        &self,
        _organization: &OrgId,
        _ride: &RideId,
        driver: &DriverId,
        reason: ExclusionReason,
    ) -> Result<(), AuditError> {
        self.records
            .lock()
            .expect("audit lock")
            .push((driver.clone(), reason));
        Ok(())
    }
}

/// Rejects every exclusion.
#[derive(Default)]
pub struct FailingAuditSink {
    pub attempts: AtomicUsize,
}

impl AuditSink for FailingAuditSink {
    fn record_exclusion(
        &self,
        _organization: &OrgId,
        ride: &RideId,
        driver: &DriverId,
        _reason: ExclusionReason,
    ) -> Result<(), AuditError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuditError {
            ride: ride.clone(),
            driver: driver.clone(),
            message: "audit table missing".into(),
        })
    }
}

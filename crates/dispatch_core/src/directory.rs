//! Snapshot collaborators: the driver directory, the time-off store and ride history.
//!
//! A match reads one consistent snapshot from a [`SnapshotSource`]. Any fetch failure aborts
//! the match; the engine never ranks from a partial or guessed snapshot.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::SourceError;
use crate::matching::{RotationByDriver, UnavailabilityByDriver};
use crate::model::{DriverCandidate, DriverId, LocationDescriptor, OrgId, RoleSet, TimeWindow};
use crate::rotation::{InMemoryRotationLedger, RideHistoryEntry, RotationLedger};
use crate::schedule::UnavailabilityWindow;

pub trait SnapshotSource: Send + Sync {
    /// Drivers of `organization`, in directory order.
    fn candidates(&self, organization: &OrgId) -> Result<Vec<DriverCandidate>, SourceError>;

    /// Time off of the organization's drivers that may intersect `window`.
    fn unavailability(
        &self,
        organization: &OrgId,
        window: &TimeWindow,
    ) -> Result<UnavailabilityByDriver, SourceError>;

    /// Rotation stats of the organization's drivers as of `now`.
    fn rotation(
        &self,
        organization: &OrgId,
        now: NaiveDateTime,
        fairness_window_days: u32,
    ) -> Result<RotationByDriver, SourceError>;
}

/// On-disk shape of a directory snapshot.
///
/// Driver records stay raw JSON until [`read_driver`] converts them one at a time, so one bad
/// record cannot sink the rest of the directory.
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub drivers: Vec<Value>,
    #[serde(default)]
    pub unavailability: Vec<UnavailabilityWindow>,
    #[serde(default)]
    pub rides: Vec<RideHistoryEntry>,
}

/// Directory held in memory, typically loaded from a JSON export.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    drivers: Vec<DriverCandidate>,
    unavailability: Vec<UnavailabilityWindow>,
    ledger: InMemoryRotationLedger,
}

impl From<DirectorySnapshot> for InMemoryDirectory {
    fn from(snapshot: DirectorySnapshot) -> Self {
        Self {
            drivers: snapshot
                .drivers
                .into_iter()
                .enumerate()
                .map(|(index, record)| read_driver(index, record))
                .collect(),
            unavailability: snapshot.unavailability,
            ledger: InMemoryRotationLedger::from_history(snapshot.rides),
        }
    }
}

/// Convert one directory record. A record that does not fit [`DriverCandidate`] is kept with
/// whatever identity can be salvaged and its `defect` set, so matching excludes it with
/// "Incomplete driver data" instead of dropping it silently.
pub fn read_driver(index: usize, record: Value) -> DriverCandidate {
    match DriverCandidate::deserialize(&record) {
        Ok(driver) => driver,
        Err(err) => {
            let driver = salvage_driver(index, &record, err.to_string());
            warn!(driver_id = %driver.id, error = %err, "malformed driver record");
            driver
        }
    }
}

fn salvage_driver(index: usize, record: &Value, defect: String) -> DriverCandidate {
    let text = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let role_names: Vec<&str> = match record.get("roles") {
        Some(Value::String(one)) => vec![one.as_str()],
        Some(Value::Array(many)) => many.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    let (first_name, last_name) = match (text("first_name"), text("last_name")) {
        (None, None) => ("Unknown driver".to_string(), String::new()),
        (first, last) => (first.unwrap_or_default(), last.unwrap_or_default()),
    };

    DriverCandidate {
        id: DriverId::new(text("id").unwrap_or_else(|| format!("record-{index}"))),
        first_name,
        last_name,
        organization_id: OrgId::new(text("organization_id").unwrap_or_default()),
        roles: RoleSet::from_names_lossy(role_names),
        home: LocationDescriptor::postal(String::new()),
        town_preference: None,
        allergens: Default::default(),
        capabilities: Default::default(),
        destination_limitation: false,
        max_weekly_rides: None,
        vehicles: None,
        defect: Some(defect),
    }
}

impl InMemoryDirectory {
    pub fn from_json_str(s: &str) -> Result<Self, SourceError> {
        let snapshot: DirectorySnapshot = serde_json::from_str(s)?;
        Ok(snapshot.into())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn ledger(&self) -> &InMemoryRotationLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut InMemoryRotationLedger {
        &mut self.ledger
    }

    /// Drivers of `organization`. A malformed record with no readable role is kept too: it
    /// might be a driver, and it must surface as an exclusion rather than vanish.
    fn org_drivers<'a>(&'a self, organization: &'a OrgId) -> impl Iterator<Item = &'a DriverCandidate> {
        self.drivers.iter().filter(move |d| {
            d.organization_id == *organization
                && (d.is_driver() || (d.defect.is_some() && d.roles.is_empty()))
        })
    }
}

impl SnapshotSource for InMemoryDirectory {
    fn candidates(&self, organization: &OrgId) -> Result<Vec<DriverCandidate>, SourceError> {
        Ok(self.org_drivers(organization).cloned().collect())
    }

    fn unavailability(
        &self,
        organization: &OrgId,
        window: &TimeWindow,
    ) -> Result<UnavailabilityByDriver, SourceError> {
        let mut by_driver: UnavailabilityByDriver = HashMap::new();
        for driver in self.org_drivers(organization) {
            let entries: Vec<UnavailabilityWindow> = self
                .unavailability
                .iter()
                .filter(|entry| entry.driver_id == driver.id && entry.touches(window))
                .cloned()
                .collect();
            if !entries.is_empty() {
                by_driver.insert(driver.id.clone(), entries);
            }
        }
        Ok(by_driver)
    }

    fn rotation(
        &self,
        organization: &OrgId,
        now: NaiveDateTime,
        fairness_window_days: u32,
    ) -> Result<RotationByDriver, SourceError> {
        Ok(self
            .org_drivers(organization)
            .map(|driver| {
                let snapshot = self.ledger.snapshot(&driver.id, now, fairness_window_days);
                (driver.id.clone(), snapshot)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{test_now, SAMPLE_DIRECTORY_JSON};

    #[test]
    fn loads_sample_directory() {
        let directory = InMemoryDirectory::from_json_str(SAMPLE_DIRECTORY_JSON).expect("directory");
        let org = OrgId::new("org-1");
        let drivers = directory.candidates(&org).expect("candidates");
        // The dispatcher-only profile and the other organization's driver are filtered out.
        let ids: Vec<_> = drivers.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d-ana", "d-ben", "d-cy"]);
    }

    #[test]
    fn unavailability_is_limited_to_window_dates() {
        let directory = InMemoryDirectory::from_json_str(SAMPLE_DIRECTORY_JSON).expect("directory");
        let org = OrgId::new("org-1");
        let window = TimeWindow::new(test_now(), test_now() + chrono::Duration::hours(1));
        let time_off = directory.unavailability(&org, &window).expect("time off");
        assert!(time_off.contains_key(&crate::model::DriverId::new("d-ben")));
        assert!(!time_off.contains_key(&crate::model::DriverId::new("d-cy")));
    }

    #[test]
    fn rotation_covers_every_org_driver() {
        let directory = InMemoryDirectory::from_json_str(SAMPLE_DIRECTORY_JSON).expect("directory");
        let org = OrgId::new("org-1");
        let rotation = directory.rotation(&org, test_now(), 7).expect("rotation");
        assert_eq!(rotation.len(), 3);
        let ana = &rotation[&crate::model::DriverId::new("d-ana")];
        assert_eq!(ana.recent_ride_count, 1);
    }

    #[test]
    fn malformed_driver_record_is_salvaged() {
        let directory = InMemoryDirectory::from_json_str(
            r#"{
              "drivers": [
                { "id": "d-bad", "organization_id": "org-1", "roles": ["Driver", "Pilot"],
                  "home": { "kind": "postal", "code": "04101" },
                  "vehicles": [ { "id": "v-bad", "max_passengers": -2 } ] },
                { "organization_id": "org-1", "roles": "Chauffeur" },
                { "id": "d-staff", "first_name": "Sue", "organization_id": "org-1",
                  "roles": "Dispatcher", "vehicles": [ { "id": "v" } ] }
              ]
            }"#,
        )
        .expect("directory");

        let drivers = directory.candidates(&OrgId::new("org-1")).expect("candidates");
        let ids: Vec<_> = drivers.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d-bad", "record-1"]);
        assert!(drivers.iter().all(|d| d.defect.is_some()));
        assert_eq!(drivers[0].display_name(), "Unknown driver");
    }

    #[test]
    fn malformed_json_is_a_source_error() {
        assert!(matches!(
            InMemoryDirectory::from_json_str("{\"drivers\": 7}"),
            Err(SourceError::Json(_))
        ));
    }
}

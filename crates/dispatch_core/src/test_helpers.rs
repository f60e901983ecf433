//! Test helpers for common test setup and utilities.
//!
//! Builders start from a plain, eligible ride and driver so each test only spells out the
//! fields it cares about.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use h3o::CellIndex;

use crate::model::{
    Capabilities, DriverCandidate, DriverId, HeightClass, LocationDescriptor, OrgId, RideId,
    RideRequest, Role, TimeWindow, Vehicle, VehicleId, VehicleStatus,
};
use crate::rotation::RotationSnapshot;

/// Fine-grained H3 cell for `LocationDescriptor::Cell` tests. Only its coarse parent is ever
/// compared, so any valid cell would do.
pub const TEST_CELL: u64 = 0x8a1fb46622dffff;

pub const TEST_ORG: &str = "org-1";

/// `TEST_CELL` as a `CellIndex`.
pub fn test_cell() -> CellIndex {
    CellIndex::try_from(TEST_CELL).expect("valid H3 cell")
}

/// Monday 2026-10-19, 08:00. Evaluation instant for every test.
pub fn test_now() -> NaiveDateTime {
    at(19, 8, 0)
}

/// `test_now()` shifted back by whole days (negative values move into the future).
pub fn days_ago(days: i64) -> NaiveDateTime {
    test_now() - Duration::days(days)
}

/// A time on the given day of October 2026.
pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid test timestamp")
}

pub fn rotation_at(driver: &str, last_drove: Option<NaiveDateTime>, recent: u32) -> RotationSnapshot {
    RotationSnapshot {
        driver_id: DriverId::new(driver),
        last_drove,
        recent_ride_count: recent,
    }
}

/// Builder for ride requests. Defaults: one rider, Monday 10:00–11:00, pickup in `041`,
/// dropoff in `042`, no special needs.
#[derive(Debug, Clone)]
pub struct RideBuilder {
    ride: RideRequest,
}

impl Default for RideBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RideBuilder {
    pub fn new() -> Self {
        Self {
            ride: RideRequest {
                id: RideId::new("ride-1"),
                organization_id: OrgId::new(TEST_ORG),
                pickup: LocationDescriptor::postal("04101"),
                dropoff: LocationDescriptor::postal("04210"),
                pickup_town: "Portland".into(),
                dropoff_town: "Auburn".into(),
                window: TimeWindow::new(at(19, 10, 0), at(19, 11, 0)),
                riders: 1,
                needs_service_animal: false,
                needs_oxygen: false,
                required_height: HeightClass::Standard,
                client_allergens: BTreeSet::new(),
            },
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.ride.id = RideId::new(id);
        self
    }

    pub fn organization(mut self, org: &str) -> Self {
        self.ride.organization_id = OrgId::new(org);
        self
    }

    pub fn riders(mut self, riders: u32) -> Self {
        self.ride.riders = riders;
        self
    }

    pub fn window(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.ride.window = TimeWindow::new(start, end);
        self
    }

    pub fn pickup(mut self, location: LocationDescriptor) -> Self {
        self.ride.pickup = location;
        self
    }

    pub fn dropoff(mut self, location: LocationDescriptor) -> Self {
        self.ride.dropoff = location;
        self
    }

    pub fn pickup_town(mut self, town: &str) -> Self {
        self.ride.pickup_town = town.into();
        self
    }

    pub fn dropoff_town(mut self, town: &str) -> Self {
        self.ride.dropoff_town = town.into();
        self
    }

    pub fn service_animal(mut self) -> Self {
        self.ride.needs_service_animal = true;
        self
    }

    pub fn oxygen(mut self) -> Self {
        self.ride.needs_oxygen = true;
        self
    }

    pub fn height(mut self, height: HeightClass) -> Self {
        self.ride.required_height = height;
        self
    }

    pub fn client_allergen(mut self, allergen: &str) -> Self {
        self.ride.client_allergens.insert(allergen.into());
        self
    }

    pub fn build(self) -> RideRequest {
        self.ride
    }
}

#[derive(Debug, Clone)]
enum VehicleList {
    Default,
    Explicit(Vec<Vehicle>),
    Missing,
}

/// Builder for driver candidates. Defaults: Driver role, home in `041`, one active standard
/// four-seat vehicle, no limits or allergens.
#[derive(Debug, Clone)]
pub struct DriverBuilder {
    driver: DriverCandidate,
    vehicles: VehicleList,
}

impl DriverBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            driver: DriverCandidate {
                id: DriverId::new(id),
                first_name: "Driver".into(),
                last_name: id.into(),
                organization_id: OrgId::new(TEST_ORG),
                roles: [Role::Driver].into_iter().collect(),
                home: LocationDescriptor::postal("04101"),
                town_preference: None,
                allergens: BTreeSet::new(),
                capabilities: Capabilities::default(),
                destination_limitation: false,
                max_weekly_rides: None,
                vehicles: None,
                defect: None,
            },
            vehicles: VehicleList::Default,
        }
    }

    pub fn name(mut self, first: &str, last: &str) -> Self {
        self.driver.first_name = first.into();
        self.driver.last_name = last.into();
        self
    }

    pub fn organization(mut self, org: &str) -> Self {
        self.driver.organization_id = OrgId::new(org);
        self
    }

    pub fn roles(mut self, roles: &[Role]) -> Self {
        self.driver.roles = roles.iter().copied().collect();
        self
    }

    pub fn home(mut self, location: LocationDescriptor) -> Self {
        self.driver.home = location;
        self
    }

    pub fn destination_limited(mut self) -> Self {
        self.driver.destination_limitation = true;
        self
    }

    pub fn accepts_service_animals(mut self) -> Self {
        self.driver.capabilities.can_accept_service_animals = true;
        self
    }

    pub fn town_preference(mut self, towns: &str) -> Self {
        self.driver.town_preference = Some(towns.into());
        self
    }

    pub fn allergen(mut self, allergen: &str) -> Self {
        self.driver.allergens.insert(allergen.into());
        self
    }

    pub fn max_weekly_rides(mut self, cap: u32) -> Self {
        self.driver.max_weekly_rides = Some(cap);
        self
    }

    /// Add an active standard vehicle. The first explicit vehicle replaces the default one.
    pub fn vehicle(self, max_passengers: u32) -> Self {
        self.vehicle_with(max_passengers, HeightClass::Standard, VehicleStatus::Active)
    }

    pub fn vehicle_with(
        mut self,
        max_passengers: u32,
        height_class: HeightClass,
        status: VehicleStatus,
    ) -> Self {
        let mut list = match self.vehicles {
            VehicleList::Explicit(list) => list,
            VehicleList::Default | VehicleList::Missing => Vec::new(),
        };
        list.push(Vehicle {
            id: VehicleId::new(format!("{}-v{}", self.driver.id, list.len() + 1)),
            max_passengers,
            height_class,
            status,
        });
        self.vehicles = VehicleList::Explicit(list);
        self
    }

    /// An empty (but present) vehicle list.
    pub fn no_vehicles(mut self) -> Self {
        self.vehicles = VehicleList::Explicit(Vec::new());
        self
    }

    /// No vehicle list at all, as from a broken directory join.
    pub fn missing_vehicles(mut self) -> Self {
        self.vehicles = VehicleList::Missing;
        self
    }

    pub fn build(mut self) -> DriverCandidate {
        self.driver.vehicles = match self.vehicles {
            VehicleList::Default => Some(vec![Vehicle {
                id: VehicleId::new(format!("{}-v1", self.driver.id)),
                max_passengers: 4,
                height_class: HeightClass::Standard,
                status: VehicleStatus::Active,
            }]),
            VehicleList::Explicit(list) => Some(list),
            VehicleList::Missing => None,
        };
        self.driver
    }
}

/// Directory export used by directory and CLI tests.
///
/// `d-ben` is off Monday morning, `d-cy` is off on Saturdays, `d-dan` is a dispatcher and
/// `d-eve` belongs to another organization.
pub const SAMPLE_DIRECTORY_JSON: &str = r#"{
  "drivers": [
    {
      "id": "d-ana", "first_name": "Ana", "last_name": "Alves", "organization_id": "org-1",
      "roles": "Driver", "home": { "kind": "postal", "code": "04101" },
      "town_preference": "Portland, Auburn",
      "vehicles": [ { "id": "v-ana", "max_passengers": 4 } ]
    },
    {
      "id": "d-ben", "first_name": "Ben", "last_name": "Brooks", "organization_id": "org-1",
      "roles": ["Driver", "Volunteer"], "home": { "kind": "postal", "code": "04210" },
      "vehicles": [ { "id": "v-ben", "max_passengers": 6, "height_class": "tall" } ]
    },
    {
      "id": "d-cy", "first_name": "Cy", "last_name": "Chen", "organization_id": "org-1",
      "roles": ["driver"], "home": { "kind": "postal", "code": "03801" },
      "destination_limitation": true,
      "vehicles": [ { "id": "v-cy", "max_passengers": 4 } ]
    },
    {
      "id": "d-dan", "first_name": "Dan", "last_name": "Diaz", "organization_id": "org-1",
      "roles": "Dispatcher", "home": { "kind": "postal", "code": "04101" },
      "vehicles": []
    },
    {
      "id": "d-eve", "first_name": "Eve", "last_name": "Evans", "organization_id": "org-2",
      "roles": "Driver", "home": { "kind": "postal", "code": "04101" },
      "vehicles": [ { "id": "v-eve", "max_passengers": 4 } ]
    }
  ],
  "unavailability": [
    {
      "driver_id": "d-ben", "on": { "date": "2026-10-19" },
      "span": { "between": { "start": "09:00:00", "end": "12:00:00" } }
    },
    { "driver_id": "d-cy", "on": { "weekday": "Sat" }, "span": "all_day" }
  ],
  "rides": [
    { "driver_id": "d-ana", "ride_id": "r-100", "driven_at": "2026-10-17T09:00:00" },
    { "driver_id": "d-ben", "ride_id": "r-090", "driven_at": "2026-09-01T09:00:00" }
  ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ride_is_valid() {
        assert!(RideBuilder::new().build().validate().is_ok());
    }

    #[test]
    fn explicit_vehicle_replaces_default() {
        let driver = DriverBuilder::new("a").vehicle(2).build();
        let vehicles = driver.vehicles.expect("vehicles");
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].max_passengers, 2);
    }

    #[test]
    fn test_now_is_a_monday() {
        use chrono::{Datelike, Weekday};
        assert_eq!(test_now().weekday(), Weekday::Mon);
    }
}

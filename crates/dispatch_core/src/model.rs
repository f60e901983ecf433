//! Request-scoped inputs to a match: the ride request, driver candidates and their vehicles.
//!
//! Everything here is read-only for the duration of a match. Values are built fresh per
//! invocation from the external directory and never mutated by the engine.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Organization scope of a ride and of the driver directory.
    OrgId
);
string_id!(DriverId);
string_id!(RideId);
string_id!(VehicleId);

/// Vehicle height class. Some riders (wheelchair transfers, limited mobility) need a tall vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightClass {
    #[default]
    Standard,
    Tall,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
    Retired,
}

/// A coarse location. Only its area key is ever compared; see [`crate::area`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationDescriptor {
    /// Postal code; the area key is its leading characters.
    Postal { code: String },
    /// Raw H3 cell index; the area key is its parent at the configured resolution.
    Cell { index: u64 },
}

impl LocationDescriptor {
    pub fn postal(code: impl Into<String>) -> Self {
        Self::Postal { code: code.into() }
    }
}

/// Requested pickup window, in the organization's local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Calendar dates the window touches, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.end.date();
        self.start
            .date()
            .iter_days()
            .take_while(move |date| *date <= last)
    }

    /// Wall-clock portion of the window falling on `date`, inclusive on both ends.
    ///
    /// Returns `None` when the window does not touch `date`.
    pub fn span_on(&self, date: NaiveDate) -> Option<(NaiveTime, NaiveTime)> {
        if date < self.start.date() || date > self.end.date() {
            return None;
        }
        let from = if date == self.start.date() {
            self.start.time()
        } else {
            NaiveTime::MIN
        };
        let to = if date == self.end.date() {
            self.end.time()
        } else {
            end_of_day()
        };
        Some((from, to))
    }
}

pub(crate) fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

/// Upper bound on riders in one request. No volunteer vehicle seats more.
pub const MAX_RIDERS: u32 = 20;

/// A ride request as received from the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: RideId,
    pub organization_id: OrgId,
    pub pickup: LocationDescriptor,
    pub dropoff: LocationDescriptor,
    #[serde(default)]
    pub pickup_town: String,
    #[serde(default)]
    pub dropoff_town: String,
    pub window: TimeWindow,
    pub riders: u32,
    #[serde(default)]
    pub needs_service_animal: bool,
    #[serde(default)]
    pub needs_oxygen: bool,
    #[serde(default)]
    pub required_height: HeightClass,
    #[serde(default)]
    pub client_allergens: BTreeSet<String>,
}

impl RideRequest {
    /// Seats the vehicle must offer: one per rider plus one each for a service animal and
    /// oxygen equipment.
    pub fn seats_required(&self) -> u32 {
        self.riders
            .saturating_add(u32::from(self.needs_service_animal))
            .saturating_add(u32::from(self.needs_oxygen))
    }

    /// Structural checks that must pass before any driver is looked at.
    ///
    /// Location descriptors are checked separately when area keys are derived.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.organization_id.as_str().trim().is_empty() {
            return Err(RequestError::MissingOrganization);
        }
        if self.riders == 0 {
            return Err(RequestError::NoRiders);
        }
        if self.riders > MAX_RIDERS {
            return Err(RequestError::TooManyRiders {
                riders: self.riders,
                max: MAX_RIDERS,
            });
        }
        if self.window.end < self.window.start {
            return Err(RequestError::InvertedWindow {
                start: self.window.start,
                end: self.window.end,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub max_passengers: u32,
    #[serde(default)]
    pub height_class: HeightClass,
    #[serde(default)]
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn is_active(&self) -> bool {
        self.status == VehicleStatus::Active
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub can_accept_service_animals: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Driver,
    Volunteer,
    Dispatcher,
    Admin,
}

impl Role {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "driver" => Some(Self::Driver),
            "volunteer" => Some(Self::Volunteer),
            "dispatcher" => Some(Self::Dispatcher),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Staff roles. The directory stores either one role name or a list of them; both
/// shapes collapse into this set when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoleShape", into = "Vec<Role>")]
pub struct RoleSet(BTreeSet<Role>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RoleShape {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<RoleShape> for RoleSet {
    type Error = String;

    fn try_from(shape: RoleShape) -> Result<Self, Self::Error> {
        let names = match shape {
            RoleShape::One(name) => vec![name],
            RoleShape::Many(names) => names,
        };
        names
            .iter()
            .map(|name| Role::parse(name).ok_or_else(|| format!("unknown role `{name}`")))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(RoleSet)
    }
}

impl From<RoleSet> for Vec<Role> {
    fn from(set: RoleSet) -> Self {
        set.0.into_iter().collect()
    }
}

impl RoleSet {
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Known roles among `names`. Unknown names are dropped.
    pub fn from_names_lossy<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names.into_iter().filter_map(Role::parse).collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One driver as seen by the matcher, with the vehicles they may drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverCandidate {
    pub id: DriverId,
    pub first_name: String,
    pub last_name: String,
    pub organization_id: OrgId,
    #[serde(default)]
    pub roles: RoleSet,
    pub home: LocationDescriptor,
    /// Comma-separated list of towns the driver prefers to drive to.
    #[serde(default)]
    pub town_preference: Option<String>,
    #[serde(default)]
    pub allergens: BTreeSet<String>,
    #[serde(default)]
    pub capabilities: Capabilities,
    /// When set, the driver only takes rides starting or ending in their home area.
    #[serde(default)]
    pub destination_limitation: bool,
    /// `None` means no declared limit.
    #[serde(default)]
    pub max_weekly_rides: Option<u32>,
    /// `None` means the directory returned no vehicle list at all, which is malformed
    /// data rather than "no vehicles".
    #[serde(default)]
    pub vehicles: Option<Vec<Vehicle>>,
    /// Why the directory record could only be partly read. A candidate with a defect is
    /// always excluded with "Incomplete driver data".
    #[serde(skip)]
    pub defect: Option<String>,
}

impl DriverCandidate {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_driver(&self) -> bool {
        self.roles.contains(Role::Driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn seats_count_service_animal_and_oxygen() {
        let mut ride = crate::test_helpers::RideBuilder::new().riders(2).build();
        assert_eq!(ride.seats_required(), 2);
        ride.needs_service_animal = true;
        ride.needs_oxygen = true;
        assert_eq!(ride.seats_required(), 4);
    }

    #[test]
    fn validate_rejects_blank_organization_and_zero_riders() {
        let mut ride = crate::test_helpers::RideBuilder::new().build();
        ride.organization_id = OrgId::new("  ");
        assert!(matches!(ride.validate(), Err(RequestError::MissingOrganization)));

        let ride = crate::test_helpers::RideBuilder::new().riders(0).build();
        assert!(matches!(ride.validate(), Err(RequestError::NoRiders)));
    }

    #[test]
    fn validate_rejects_too_many_riders() {
        let ride = crate::test_helpers::RideBuilder::new().riders(MAX_RIDERS).build();
        assert!(ride.validate().is_ok());

        let ride = crate::test_helpers::RideBuilder::new()
            .riders(u32::MAX)
            .service_animal()
            .oxygen()
            .build();
        assert!(matches!(
            ride.validate(),
            Err(RequestError::TooManyRiders { riders: u32::MAX, max: MAX_RIDERS })
        ));
        // Seat math never wraps, even before validation.
        assert_eq!(ride.seats_required(), u32::MAX);
    }

    #[test]
    fn validate_rejects_inverted_window() {
        let ride = crate::test_helpers::RideBuilder::new()
            .window(at(19, 11, 0), at(19, 10, 0))
            .build();
        assert!(matches!(
            ride.validate(),
            Err(RequestError::InvertedWindow { .. })
        ));
    }

    #[test]
    fn window_crossing_midnight_splits_by_date() {
        let window = TimeWindow::new(at(19, 23, 0), at(20, 1, 0));
        let dates: Vec<_> = window.dates().collect();
        assert_eq!(dates.len(), 2);

        let (from, to) = window.span_on(dates[0]).expect("first day");
        assert_eq!(from, NaiveTime::from_hms_opt(23, 0, 0).expect("time"));
        assert!(to > NaiveTime::from_hms_opt(23, 59, 59).expect("time"));

        let (from, to) = window.span_on(dates[1]).expect("second day");
        assert_eq!(from, NaiveTime::MIN);
        assert_eq!(to, NaiveTime::from_hms_opt(1, 0, 0).expect("time"));
    }

    #[test]
    fn roles_accept_single_string_or_list() {
        let one: RoleSet = serde_json::from_str("\"Driver\"").expect("single role");
        assert!(one.contains(Role::Driver));

        let many: RoleSet =
            serde_json::from_str("[\"volunteer\", \"Driver\"]").expect("role list");
        assert!(many.contains(Role::Driver));
        assert!(many.contains(Role::Volunteer));

        assert!(serde_json::from_str::<RoleSet>("\"Pilot\"").is_err());

        let lossy = RoleSet::from_names_lossy(["Pilot", "driver"]);
        assert!(lossy.contains(Role::Driver));
        assert!(RoleSet::from_names_lossy(["Pilot"]).is_empty());
    }

    #[test]
    fn display_name_joins_first_and_last() {
        let driver = crate::test_helpers::DriverBuilder::new("d1").name("Ada", "Lovelace").build();
        assert_eq!(driver.display_name(), "Ada Lovelace");
    }
}

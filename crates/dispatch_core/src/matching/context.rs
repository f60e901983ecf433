//! Per-match derived values computed once: area keys, seat requirements, active vehicles.

use chrono::NaiveDateTime;

use crate::area::{AreaKey, AreaKeyer};
use crate::error::{IncompleteData, RequestError};
use crate::model::{DriverCandidate, RideRequest, Vehicle};
use crate::rotation::RotationSnapshot;

use super::types::Requirements;

/// A validated ride request plus its derived area keys and vehicle requirements.
#[derive(Debug, Clone)]
pub struct RideContext<'a> {
    pub request: &'a RideRequest,
    pub pickup_area: AreaKey,
    pub dropoff_area: AreaKey,
    pub requirements: Requirements,
}

impl<'a> RideContext<'a> {
    pub fn prepare(request: &'a RideRequest, keyer: &AreaKeyer) -> Result<Self, RequestError> {
        request.validate()?;
        let pickup_area = keyer
            .key_for(&request.pickup)
            .map_err(|source| RequestError::Location {
                which: "pickup",
                source,
            })?;
        let dropoff_area = keyer
            .key_for(&request.dropoff)
            .map_err(|source| RequestError::Location {
                which: "dropoff",
                source,
            })?;
        Ok(Self {
            request,
            pickup_area,
            dropoff_area,
            requirements: Requirements {
                seats: request.seats_required(),
                needs_service_animal: request.needs_service_animal,
                needs_oxygen: request.needs_oxygen,
                height_class: request.required_height,
            },
        })
    }
}

/// A candidate whose data is complete enough to evaluate.
#[derive(Debug, Clone)]
pub struct DriverContext<'a> {
    pub candidate: &'a DriverCandidate,
    pub home_area: AreaKey,
    vehicles: &'a [Vehicle],
}

impl<'a> DriverContext<'a> {
    pub fn prepare(
        candidate: &'a DriverCandidate,
        keyer: &AreaKeyer,
        rotation: Option<&RotationSnapshot>,
        now: NaiveDateTime,
    ) -> Result<Self, IncompleteData> {
        if let Some(defect) = &candidate.defect {
            return Err(IncompleteData::Malformed(defect.clone()));
        }
        let vehicles = candidate
            .vehicles
            .as_deref()
            .ok_or(IncompleteData::MissingVehicles)?;
        let home_area = keyer
            .key_for(&candidate.home)
            .map_err(IncompleteData::HomeLocation)?;
        if let Some(last_drove) = rotation.and_then(|r| r.last_drove) {
            if last_drove > now {
                return Err(IncompleteData::RotationFromFuture { last_drove, now });
            }
        }
        Ok(Self {
            candidate,
            home_area,
            vehicles,
        })
    }

    /// Vehicles with status Active; nothing else is ever offered for a ride.
    pub fn active_vehicles(&self) -> impl Iterator<Item = &'a Vehicle> {
        let vehicles: &'a [Vehicle] = self.vehicles;
        vehicles.iter().filter(|v| v.is_active())
    }
}

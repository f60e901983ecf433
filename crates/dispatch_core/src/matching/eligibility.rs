//! Hard filter: can this driver physically and legally take this ride?
//!
//! Checks run in a fixed order and stop at the first failure, so every exclusion has exactly
//! one cause and the audit trail is reproducible:
//!
//! 1. time off overlapping the ride window
//! 2. geographic coverage (only for drivers with a destination limitation)
//! 3. seat capacity of active vehicles
//! 4. service animal acceptance
//! 5. vehicle height
//! 6. allergen conflict

use crate::model::HeightClass;
use crate::schedule::{any_overlap, UnavailabilityWindow};

use super::context::{DriverContext, RideContext};
use super::types::ExclusionReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Excluded(ExclusionReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Evaluate one driver against one ride. `time_off` holds this driver's entries only.
pub fn evaluate(
    ride: &RideContext<'_>,
    driver: &DriverContext<'_>,
    time_off: &[UnavailabilityWindow],
) -> Eligibility {
    let failure = if has_schedule_conflict(ride, time_off) {
        Some(ExclusionReason::TimeOff)
    } else if !within_coverage(ride, driver) {
        Some(ExclusionReason::OutsideCoverage)
    } else if !has_capacity(ride, driver) {
        Some(ExclusionReason::CapacityTooSmall)
    } else if !accepts_service_animal(ride, driver) {
        Some(ExclusionReason::NoServiceAnimals)
    } else if !has_required_height(ride, driver) {
        Some(ExclusionReason::VehicleTooShort)
    } else if has_allergen_conflict(ride, driver) {
        Some(ExclusionReason::AllergenConflict)
    } else {
        None
    };

    match failure {
        Some(reason) => Eligibility::Excluded(reason),
        None => Eligibility::Eligible,
    }
}

fn has_schedule_conflict(ride: &RideContext<'_>, time_off: &[UnavailabilityWindow]) -> bool {
    any_overlap(time_off, &ride.request.window)
}

/// Drivers without a declared limitation serve the whole organization.
fn within_coverage(ride: &RideContext<'_>, driver: &DriverContext<'_>) -> bool {
    !driver.candidate.destination_limitation
        || driver.home_area == ride.pickup_area
        || driver.home_area == ride.dropoff_area
}

fn has_capacity(ride: &RideContext<'_>, driver: &DriverContext<'_>) -> bool {
    let seats = ride.requirements.seats;
    driver.active_vehicles().any(|v| v.max_passengers >= seats)
}

fn accepts_service_animal(ride: &RideContext<'_>, driver: &DriverContext<'_>) -> bool {
    !ride.requirements.needs_service_animal || driver.candidate.capabilities.can_accept_service_animals
}

fn has_required_height(ride: &RideContext<'_>, driver: &DriverContext<'_>) -> bool {
    match ride.requirements.height_class {
        HeightClass::Standard => true,
        HeightClass::Tall => driver
            .active_vehicles()
            .any(|v| v.height_class == HeightClass::Tall),
    }
}

fn has_allergen_conflict(ride: &RideContext<'_>, driver: &DriverContext<'_>) -> bool {
    let client: Vec<String> = ride
        .request
        .client_allergens
        .iter()
        .map(|a| normalize_allergen(a))
        .filter(|a| !a.is_empty())
        .collect();
    driver
        .candidate
        .allergens
        .iter()
        .map(|a| normalize_allergen(a))
        .any(|a| client.contains(&a))
}

fn normalize_allergen(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaKeyer;
    use crate::model::{HeightClass, LocationDescriptor, VehicleStatus};
    use crate::schedule::Recurrence;
    use crate::test_helpers::{test_now, DriverBuilder, RideBuilder};
    use chrono::NaiveTime;

    fn run(ride: &crate::model::RideRequest, driver: &crate::model::DriverCandidate) -> Eligibility {
        run_with_time_off(ride, driver, &[])
    }

    fn run_with_time_off(
        ride: &crate::model::RideRequest,
        driver: &crate::model::DriverCandidate,
        time_off: &[UnavailabilityWindow],
    ) -> Eligibility {
        let keyer = AreaKeyer::default();
        let ride_ctx = RideContext::prepare(ride, &keyer).expect("valid ride");
        let driver_ctx =
            DriverContext::prepare(driver, &keyer, None, test_now()).expect("complete driver");
        evaluate(&ride_ctx, &driver_ctx, time_off)
    }

    #[test]
    fn plain_driver_is_eligible() {
        let ride = RideBuilder::new().riders(2).build();
        let driver = DriverBuilder::new("a").vehicle(4).build();
        assert_eq!(run(&ride, &driver), Eligibility::Eligible);
    }

    #[test]
    fn capacity_boundary_is_inclusive() {
        let ride = RideBuilder::new().riders(2).service_animal().oxygen().build();
        let exact = DriverBuilder::new("a").vehicle(4).accepts_service_animals().build();
        let short = DriverBuilder::new("b").vehicle(3).accepts_service_animals().build();
        assert_eq!(run(&ride, &exact), Eligibility::Eligible);
        assert_eq!(
            run(&ride, &short),
            Eligibility::Excluded(ExclusionReason::CapacityTooSmall)
        );
    }

    #[test]
    fn inactive_vehicles_do_not_count() {
        let ride = RideBuilder::new().riders(2).build();
        let driver = DriverBuilder::new("a")
            .vehicle_with(8, HeightClass::Tall, VehicleStatus::Maintenance)
            .vehicle(1)
            .build();
        assert_eq!(
            run(&ride, &driver),
            Eligibility::Excluded(ExclusionReason::CapacityTooSmall)
        );
    }

    #[test]
    fn driver_without_vehicles_is_excluded() {
        let ride = RideBuilder::new().build();
        let driver = DriverBuilder::new("a").no_vehicles().build();
        assert_eq!(
            run(&ride, &driver),
            Eligibility::Excluded(ExclusionReason::CapacityTooSmall)
        );
    }

    #[test]
    fn limited_driver_outside_both_areas_is_excluded() {
        let ride = RideBuilder::new()
            .pickup(LocationDescriptor::postal("04101"))
            .dropoff(LocationDescriptor::postal("04210"))
            .build();
        let limited = DriverBuilder::new("a")
            .home(LocationDescriptor::postal("03801"))
            .destination_limited()
            .build();
        let unlimited = DriverBuilder::new("b")
            .home(LocationDescriptor::postal("03801"))
            .build();
        let limited_at_dropoff = DriverBuilder::new("c")
            .home(LocationDescriptor::postal("04240"))
            .destination_limited()
            .build();

        assert_eq!(
            run(&ride, &limited),
            Eligibility::Excluded(ExclusionReason::OutsideCoverage)
        );
        assert_eq!(run(&ride, &unlimited), Eligibility::Eligible);
        assert_eq!(run(&ride, &limited_at_dropoff), Eligibility::Eligible);
    }

    #[test]
    fn service_animal_requires_capability() {
        let ride = RideBuilder::new().riders(1).service_animal().build();
        let driver = DriverBuilder::new("a").vehicle(4).build();
        assert_eq!(
            run(&ride, &driver),
            Eligibility::Excluded(ExclusionReason::NoServiceAnimals)
        );
    }

    #[test]
    fn tall_requirement_needs_active_tall_vehicle() {
        let ride = RideBuilder::new().height(HeightClass::Tall).build();
        let standard = DriverBuilder::new("a").vehicle(4).build();
        let tall = DriverBuilder::new("b")
            .vehicle(4)
            .vehicle_with(4, HeightClass::Tall, VehicleStatus::Active)
            .build();
        assert_eq!(
            run(&ride, &standard),
            Eligibility::Excluded(ExclusionReason::VehicleTooShort)
        );
        assert_eq!(run(&ride, &tall), Eligibility::Eligible);
    }

    #[test]
    fn allergen_overlap_ignores_case_and_whitespace() {
        let ride = RideBuilder::new().client_allergen("Dogs ").build();
        let driver = DriverBuilder::new("a").allergen("dogs").build();
        let other = DriverBuilder::new("b").allergen("cats").build();
        assert_eq!(
            run(&ride, &driver),
            Eligibility::Excluded(ExclusionReason::AllergenConflict)
        );
        assert_eq!(run(&ride, &other), Eligibility::Eligible);
    }

    #[test]
    fn first_failing_check_wins() {
        // Fails capacity, service animal and allergens; capacity is checked first.
        let ride = RideBuilder::new()
            .riders(3)
            .service_animal()
            .client_allergen("smoke")
            .build();
        let driver = DriverBuilder::new("a").vehicle(2).allergen("smoke").build();
        assert_eq!(
            run(&ride, &driver),
            Eligibility::Excluded(ExclusionReason::CapacityTooSmall)
        );

        // Time off precedes everything.
        let time_off = [UnavailabilityWindow::all_day(
            driver.id.clone(),
            Recurrence::Date(ride.window.start.date()),
        )];
        assert_eq!(
            run_with_time_off(&ride, &driver, &time_off),
            Eligibility::Excluded(ExclusionReason::TimeOff)
        );
    }

    #[test]
    fn timed_time_off_around_window_excludes() {
        let ride = RideBuilder::new().build();
        let driver = DriverBuilder::new("b").build();
        let time_off = [UnavailabilityWindow::between(
            driver.id.clone(),
            Recurrence::Date(ride.window.start.date()),
            NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
            NaiveTime::from_hms_opt(12, 0, 0).expect("time"),
        )];
        assert_eq!(
            run_with_time_off(&ride, &driver, &time_off),
            Eligibility::Excluded(ExclusionReason::TimeOff)
        );
    }
}

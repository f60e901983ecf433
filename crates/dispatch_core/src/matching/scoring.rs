//! Weighted fairness score for eligible drivers.
//!
//! Rotation dominates (up to 100 of 160 points): the main dispatch policy is not to keep
//! drawing the same driver. Load and proximity break ties between similarly rested drivers,
//! and town preference is a small bonus. Weights are fixed.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::area::AreaKey;
use crate::rotation::RotationSnapshot;

use super::context::{DriverContext, RideContext};
use super::types::{ScoreCard, Tier};

/// Effective weekly ride cap for drivers who did not declare one.
pub const DEFAULT_WEEKLY_RIDE_CAP: u32 = 10;

pub const HIGH_ROTATION_PRIORITY: &str = "High priority in rotation queue";
pub const MEDIUM_ROTATION_PRIORITY: &str = "Medium priority in rotation queue";
pub const NEAR_WEEKLY_LIMIT: &str = "Near weekly ride limit";

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreComponents {
    /// 0–100, longer since last drive scores higher.
    pub rotation: u32,
    /// 0–30, fewer recent rides relative to the weekly cap scores higher.
    pub load: u32,
    /// 0–20, home area at pickup (20) or dropoff (10).
    pub proximity: u32,
    /// 0 or 10, dropoff town is in the driver's preference list.
    pub town_preference: u32,
}

impl ScoreComponents {
    pub fn total(&self) -> u32 {
        self.rotation + self.load + self.proximity + self.town_preference
    }
}

/// Days since the driver last drove; `None` stands for "never", i.e. infinitely long ago.
pub fn days_since(last_drove: Option<NaiveDateTime>, now: NaiveDateTime) -> Option<f64> {
    last_drove.map(|at| (now - at).num_seconds() as f64 / SECONDS_PER_DAY)
}

/// Rotation points. Monotone non-decreasing in `days_since`.
pub fn rotation_component(days_since: Option<f64>) -> u32 {
    let Some(days) = days_since else {
        return 100;
    };
    if days > 30.0 {
        100
    } else if days > 14.0 {
        75
    } else if days > 7.0 {
        50
    } else {
        // At most 35 here, so the ramp always stays under the next tier.
        (days * 5.0).floor().max(0.0) as u32
    }
}

pub fn load_component(recent_ride_count: u32, max_weekly_rides: Option<u32>) -> u32 {
    let cap = max_weekly_rides.unwrap_or(DEFAULT_WEEKLY_RIDE_CAP);
    if recent_ride_count == 0 {
        30
    } else if recent_ride_count.saturating_mul(2) < cap {
        // count < cap / 2 without integer truncation
        20
    } else if recent_ride_count < cap {
        10
    } else {
        0
    }
}

pub fn proximity_component(home: &AreaKey, pickup: &AreaKey, dropoff: &AreaKey) -> u32 {
    if home == pickup {
        20
    } else if home == dropoff {
        10
    } else {
        0
    }
}

/// True if `town` appears in a comma-separated preference list, ignoring case and padding.
pub fn prefers_town(preference: Option<&str>, town: &str) -> bool {
    let town = town.trim().to_lowercase();
    if town.is_empty() {
        return false;
    }
    preference.is_some_and(|list| {
        list.split(',')
            .any(|entry| entry.trim().to_lowercase() == town)
    })
}

pub fn town_preference_component(preference: Option<&str>, dropoff_town: &str) -> u32 {
    if prefers_town(preference, dropoff_town) {
        10
    } else {
        0
    }
}

pub fn score_components(
    ride: &RideContext<'_>,
    driver: &DriverContext<'_>,
    rotation: Option<&RotationSnapshot>,
    now: NaiveDateTime,
) -> ScoreComponents {
    let last_drove = rotation.and_then(|r| r.last_drove);
    let recent = rotation.map_or(0, |r| r.recent_ride_count);
    ScoreComponents {
        rotation: rotation_component(days_since(last_drove, now)),
        load: load_component(recent, driver.candidate.max_weekly_rides),
        proximity: proximity_component(&driver.home_area, &ride.pickup_area, &ride.dropoff_area),
        town_preference: town_preference_component(
            driver.candidate.town_preference.as_deref(),
            &ride.request.dropoff_town,
        ),
    }
}

/// Score card with reasons for every contributing component, in component order.
pub fn score_driver(
    ride: &RideContext<'_>,
    driver: &DriverContext<'_>,
    rotation: Option<&RotationSnapshot>,
    now: NaiveDateTime,
) -> ScoreCard {
    let components = score_components(ride, driver, rotation, now);
    let mut reasons = Vec::new();

    match components.rotation {
        100 => reasons.push(HIGH_ROTATION_PRIORITY.to_string()),
        75 => reasons.push(MEDIUM_ROTATION_PRIORITY.to_string()),
        _ => {}
    }
    match components.load {
        30 => reasons.push("No recent rides".to_string()),
        0 => reasons.push(NEAR_WEEKLY_LIMIT.to_string()),
        _ => {}
    }
    match components.proximity {
        20 => reasons.push("Based in pickup area".to_string()),
        10 => reasons.push("Based in dropoff area".to_string()),
        _ => {}
    }
    if components.town_preference > 0 {
        reasons.push(format!("Prefers {}", ride.request.dropoff_town.trim()));
    }

    let total = components.total();
    ScoreCard {
        total,
        tier: Tier::from_total(total),
        reasons,
        components: Some(components),
    }
}

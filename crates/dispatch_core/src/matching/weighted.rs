use chrono::NaiveDateTime;

use crate::rotation::RotationSnapshot;

use super::algorithm::RankingPolicy;
use super::context::{DriverContext, RideContext};
use super::scoring::score_driver;
use super::types::{RankingPolicyKind, ScoreCard};

/// Weighted fairness ranking: rotation (0–100) + load (0–30) + proximity (0–20) +
/// town preference (0–10), highest total first.
///
/// Drivers with equal totals keep their input order; no name or id tie-break is applied.
/// This is the default policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedRanking;

impl RankingPolicy for WeightedRanking {
    fn kind(&self) -> RankingPolicyKind {
        RankingPolicyKind::Weighted
    }

    fn score(
        &self,
        ride: &RideContext<'_>,
        driver: &DriverContext<'_>,
        rotation: Option<&RotationSnapshot>,
        now: NaiveDateTime,
    ) -> ScoreCard {
        score_driver(ride, driver, rotation, now)
    }
}

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::rotation::RotationSnapshot;

use super::algorithm::{RankingPolicy, ScoredDriver};
use super::context::{DriverContext, RideContext};
use super::scoring::prefers_town;
use super::types::{RankingPolicyKind, ScoreCard, Tier};

/// Town-preference ranking: the older, simpler dispatch rule.
///
/// Score 3 when the driver's preferred towns include both pickup and dropoff town, 2 when
/// they include one of them, 1 otherwise. Ties go to whoever drove least recently; drivers
/// who never drove come first.
///
/// It ignores load and proximity, so it is only used when configured explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct TownPreferenceRanking;

impl TownPreferenceRanking {
    fn tier(score: u32) -> Tier {
        match score {
            3 => Tier::Excellent,
            2 => Tier::Good,
            _ => Tier::Fair,
        }
    }
}

impl RankingPolicy for TownPreferenceRanking {
    fn kind(&self) -> RankingPolicyKind {
        RankingPolicyKind::TownPreference
    }

    fn score(
        &self,
        ride: &RideContext<'_>,
        driver: &DriverContext<'_>,
        _rotation: Option<&RotationSnapshot>,
        _now: NaiveDateTime,
    ) -> ScoreCard {
        let preference = driver.candidate.town_preference.as_deref();
        let pickup = prefers_town(preference, &ride.request.pickup_town);
        let dropoff = prefers_town(preference, &ride.request.dropoff_town);

        let (total, reason) = match (pickup, dropoff) {
            (true, true) => (3, Some("Prefers pickup and dropoff towns")),
            (true, false) => (2, Some("Prefers pickup town")),
            (false, true) => (2, Some("Prefers dropoff town")),
            (false, false) => (1, None),
        };
        ScoreCard {
            total,
            tier: Self::tier(total),
            reasons: reason.into_iter().map(str::to_string).collect(),
            components: None,
        }
    }

    fn compare(&self, a: &ScoredDriver<'_>, b: &ScoredDriver<'_>) -> Ordering {
        // `None < Some(_)`, so never-driven drivers sort ahead of everyone.
        b.card
            .total
            .cmp(&a.card.total)
            .then_with(|| a.last_drove.cmp(&b.last_drove))
    }
}

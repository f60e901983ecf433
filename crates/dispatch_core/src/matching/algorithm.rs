use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::rotation::RotationSnapshot;

use super::context::{DriverContext, RideContext};
use super::types::{RankingPolicyKind, ScoreCard};

/// An eligible driver after scoring, as handed to [`RankingPolicy::compare`].
#[derive(Debug, Clone)]
pub struct ScoredDriver<'a> {
    pub driver: DriverContext<'a>,
    pub card: ScoreCard,
    pub last_drove: Option<NaiveDateTime>,
    /// Position in the caller's candidate list.
    pub input_index: usize,
}

/// Trait for ranking policies that order eligible drivers for a ride.
///
/// Exactly one policy runs per match. The orchestrator sorts with a stable sort using
/// [`RankingPolicy::compare`], so drivers the policy considers equal keep their input order.
pub trait RankingPolicy: Send + Sync {
    fn kind(&self) -> RankingPolicyKind;

    /// Score a driver that already passed the eligibility filter.
    ///
    /// `now` is the single evaluation instant for the whole match; implementations must not
    /// read a clock.
    fn score(
        &self,
        ride: &RideContext<'_>,
        driver: &DriverContext<'_>,
        rotation: Option<&RotationSnapshot>,
        now: NaiveDateTime,
    ) -> ScoreCard;

    /// Ordering of two scored drivers; `Less` ranks `a` first.
    ///
    /// Default: higher total first, nothing else.
    fn compare(&self, a: &ScoredDriver<'_>, b: &ScoredDriver<'_>) -> Ordering {
        b.card.total.cmp(&a.card.total)
    }
}

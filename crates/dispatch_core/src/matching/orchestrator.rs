//! Runs the eligibility filter over every candidate, scores the survivors with the configured
//! ranking policy, and partitions the result into ranked and excluded lists.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::area::AreaKeyer;
use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::model::{DriverCandidate, DriverId, RideRequest};
use crate::rotation::RotationSnapshot;
use crate::schedule::UnavailabilityWindow;

use super::algorithm::{RankingPolicy, ScoredDriver};
use super::context::{DriverContext, RideContext};
use super::eligibility::{evaluate, Eligibility};
use super::types::{ExclusionReason, MatchOutcome, MatchReport, RankingPolicyKind};
use super::{create_ranking_policy, WeightedRanking};

/// Time off keyed by driver. Drivers without an entry have no time off.
pub type UnavailabilityByDriver = HashMap<DriverId, Vec<UnavailabilityWindow>>;

/// Rotation stats keyed by driver. Drivers without an entry have never driven.
pub type RotationByDriver = HashMap<DriverId, RotationSnapshot>;

/// Stateless matcher: a ranking policy plus the area-key heuristic.
///
/// Holds no mutable state, so one engine can serve concurrent matches for different rides.
pub struct MatchEngine {
    policy: Box<dyn RankingPolicy>,
    keyer: AreaKeyer,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(Box::new(WeightedRanking), AreaKeyer::default())
    }
}

impl MatchEngine {
    pub fn new(policy: Box<dyn RankingPolicy>, keyer: AreaKeyer) -> Self {
        Self { policy, keyer }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(create_ranking_policy(config.ranking_policy), config.area_keyer())
    }

    pub fn policy_kind(&self) -> RankingPolicyKind {
        self.policy.kind()
    }

    pub fn keyer(&self) -> &AreaKeyer {
        &self.keyer
    }

    /// Match one ride against a snapshot of candidates.
    ///
    /// Fails only on a malformed ride request. Malformed candidates are excluded with
    /// "Incomplete driver data" and the rest of the batch is still evaluated.
    pub fn match_ride(
        &self,
        request: &RideRequest,
        candidates: &[DriverCandidate],
        unavailability: &UnavailabilityByDriver,
        rotation: &RotationByDriver,
        now: NaiveDateTime,
    ) -> Result<MatchReport, MatchError> {
        let ride = RideContext::prepare(request, &self.keyer)?;
        info!(
            event = "match_start",
            ride_id = %request.id,
            candidates = candidates.len(),
            seats = ride.requirements.seats,
            policy = %self.policy.kind(),
        );

        let mut scored = Vec::new();
        let mut excluded = Vec::new();

        for (input_index, candidate) in candidates.iter().enumerate() {
            let snapshot = rotation.get(&candidate.id);
            let driver = match DriverContext::prepare(candidate, &self.keyer, snapshot, now) {
                Ok(driver) => driver,
                Err(problem) => {
                    debug!(driver_id = %candidate.id, %problem, "incomplete driver data");
                    excluded.push(MatchOutcome::excluded(
                        candidate.id.clone(),
                        candidate.display_name(),
                        ExclusionReason::IncompleteData,
                    ));
                    continue;
                }
            };

            let time_off = unavailability
                .get(&candidate.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            match evaluate(&ride, &driver, time_off) {
                Eligibility::Excluded(reason) => {
                    debug!(driver_id = %candidate.id, %reason, "driver excluded");
                    excluded.push(MatchOutcome::excluded(
                        candidate.id.clone(),
                        candidate.display_name(),
                        reason,
                    ));
                }
                Eligibility::Eligible => {
                    let card = self.policy.score(&ride, &driver, snapshot, now);
                    debug!(driver_id = %candidate.id, score = card.total, tier = %card.tier, "driver scored");
                    scored.push(ScoredDriver {
                        driver,
                        card,
                        last_drove: snapshot.and_then(|s| s.last_drove),
                        input_index,
                    });
                }
            }
        }

        // Both sorts are stable: equal keys keep input order.
        scored.sort_by(|a, b| self.policy.compare(a, b));
        excluded.sort_by_cached_key(|outcome| outcome.driver_name.to_lowercase());

        let available: Vec<MatchOutcome> = scored
            .into_iter()
            .map(|s| {
                MatchOutcome::eligible(
                    s.driver.candidate.id.clone(),
                    s.driver.candidate.display_name(),
                    s.card,
                )
            })
            .collect();

        info!(
            event = "match_end",
            ride_id = %request.id,
            available = available.len(),
            excluded = excluded.len(),
        );

        Ok(MatchReport {
            ride_id: request.id.clone(),
            policy: self.policy.kind(),
            requirements: ride.requirements,
            available,
            excluded,
        })
    }
}

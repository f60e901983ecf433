pub mod algorithm;
pub mod context;
pub mod eligibility;
pub mod orchestrator;
pub mod scoring;
pub mod town_preference;
pub mod types;
pub mod weighted;

pub use algorithm::{RankingPolicy, ScoredDriver};
pub use context::{DriverContext, RideContext};
pub use eligibility::{evaluate, Eligibility};
pub use orchestrator::{MatchEngine, RotationByDriver, UnavailabilityByDriver};
pub use scoring::{score_driver, ScoreComponents};
pub use town_preference::TownPreferenceRanking;
pub use types::{
    ExclusionReason, MatchOutcome, MatchReport, OutcomeStatus, RankingPolicyKind, Requirements,
    ScoreCard, Tier,
};
pub use weighted::WeightedRanking;

/// Build the ranking policy for a configured kind.
pub fn create_ranking_policy(kind: RankingPolicyKind) -> Box<dyn RankingPolicy> {
    match kind {
        RankingPolicyKind::Weighted => Box::new(WeightedRanking),
        RankingPolicyKind::TownPreference => Box::new(TownPreferenceRanking),
    }
}

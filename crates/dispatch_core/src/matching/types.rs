use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{DriverId, HeightClass, RideId};

use super::scoring::ScoreComponents;

/// Why a driver cannot take a ride. Only the first failing check is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExclusionReason {
    #[serde(rename = "Incomplete driver data")]
    IncompleteData,
    #[serde(rename = "Time off overlaps")]
    TimeOff,
    #[serde(rename = "Outside geographic coverage")]
    OutsideCoverage,
    #[serde(rename = "Capacity too small")]
    CapacityTooSmall,
    #[serde(rename = "Cannot accept service animals")]
    NoServiceAnimals,
    #[serde(rename = "Vehicle too short")]
    VehicleTooShort,
    #[serde(rename = "Allergen conflict")]
    AllergenConflict,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncompleteData => "Incomplete driver data",
            Self::TimeOff => "Time off overlaps",
            Self::OutsideCoverage => "Outside geographic coverage",
            Self::CapacityTooSmall => "Capacity too small",
            Self::NoServiceAnimals => "Cannot accept service animals",
            Self::VehicleTooShort => "Vehicle too short",
            Self::AllergenConflict => "Allergen conflict",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Tier {
    pub fn from_total(total: u32) -> Self {
        match total {
            90.. => Self::Excellent,
            60..=89 => Self::Good,
            30..=59 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        };
        f.write_str(label)
    }
}

/// Result of scoring one eligible driver under a ranking policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCard {
    pub total: u32,
    pub tier: Tier,
    /// Human-readable reasons, in component order.
    pub reasons: Vec<String>,
    /// Per-component breakdown; only the weighted policy has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ScoreComponents>,
}

/// Per-driver verdict. Eligible outcomes carry a score and no reason; excluded outcomes carry
/// a reason and no score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Eligible {
        score: u32,
        tier: Tier,
        score_breakdown: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        components: Option<ScoreComponents>,
    },
    Excluded {
        exclusion_reason: ExclusionReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    pub driver_id: DriverId,
    pub driver_name: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl MatchOutcome {
    pub fn eligible(driver_id: DriverId, driver_name: String, card: ScoreCard) -> Self {
        Self {
            driver_id,
            driver_name,
            status: OutcomeStatus::Eligible {
                score: card.total,
                tier: card.tier,
                score_breakdown: card.reasons,
                components: card.components,
            },
        }
    }

    pub fn excluded(driver_id: DriverId, driver_name: String, reason: ExclusionReason) -> Self {
        Self {
            driver_id,
            driver_name,
            status: OutcomeStatus::Excluded {
                exclusion_reason: reason,
            },
        }
    }

    pub fn score(&self) -> Option<u32> {
        match &self.status {
            OutcomeStatus::Eligible { score, .. } => Some(*score),
            OutcomeStatus::Excluded { .. } => None,
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        match &self.status {
            OutcomeStatus::Eligible { tier, .. } => Some(*tier),
            OutcomeStatus::Excluded { .. } => None,
        }
    }

    pub fn exclusion_reason(&self) -> Option<ExclusionReason> {
        match &self.status {
            OutcomeStatus::Eligible { .. } => None,
            OutcomeStatus::Excluded { exclusion_reason } => Some(*exclusion_reason),
        }
    }

    pub fn score_breakdown(&self) -> &[String] {
        match &self.status {
            OutcomeStatus::Eligible {
                score_breakdown, ..
            } => score_breakdown,
            OutcomeStatus::Excluded { .. } => &[],
        }
    }

    pub fn components(&self) -> Option<&ScoreComponents> {
        match &self.status {
            OutcomeStatus::Eligible { components, .. } => components.as_ref(),
            OutcomeStatus::Excluded { .. } => None,
        }
    }
}

/// What the ride needs from a vehicle, echoed back for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirements {
    pub seats: u32,
    pub needs_service_animal: bool,
    pub needs_oxygen: bool,
    pub height_class: HeightClass,
}

/// Which ranking policy produced a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicyKind {
    /// Weighted rotation / load / proximity / town-preference score.
    #[default]
    Weighted,
    /// Town-preference match (1–3), ties broken by least recent drive.
    TownPreference,
}

impl fmt::Display for RankingPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Weighted => "weighted",
            Self::TownPreference => "town_preference",
        })
    }
}

/// Output of one match: every candidate lands in exactly one of the two lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub ride_id: RideId,
    pub policy: RankingPolicyKind,
    pub requirements: Requirements,
    /// Descending by score.
    pub available: Vec<MatchOutcome>,
    /// Ascending by driver name.
    pub excluded: Vec<MatchOutcome>,
}

impl MatchReport {
    pub fn best(&self) -> Option<&MatchOutcome> {
        self.available.first()
    }

    pub fn candidate_count(&self) -> usize {
        self.available.len() + self.excluded.len()
    }
}

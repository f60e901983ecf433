//! Match configuration, loaded from TOML.
//!
//! ```
//! use dispatch_core::config::MatchConfig;
//! use dispatch_core::matching::RankingPolicyKind;
//!
//! let config = MatchConfig::from_toml_str(r#"
//!     ranking_policy = "town_preference"
//!     fairness_window_days = 14
//!
//!     [area]
//!     postal_prefix_len = 5
//! "#).unwrap();
//!
//! assert_eq!(config.ranking_policy, RankingPolicyKind::TownPreference);
//! assert_eq!(config.area.h3_resolution, 5);
//! ```
//!
//! Scoring weights are deliberately absent: they are fixed.

use std::path::Path;

use h3o::Resolution;
use serde::{Deserialize, Serialize};

use crate::area::{AreaKeyer, DEFAULT_AREA_RESOLUTION, DEFAULT_POSTAL_PREFIX_LEN};
use crate::error::ConfigError;
use crate::matching::RankingPolicyKind;
use crate::rotation::DEFAULT_FAIRNESS_WINDOW_DAYS;

/// Longest accepted fairness window, one leap year.
pub const MAX_FAIRNESS_WINDOW_DAYS: u32 = 366;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    /// Which ranking policy orders eligible drivers.
    #[serde(default)]
    pub ranking_policy: RankingPolicyKind,

    /// Trailing window (days) for the recent-ride count.
    #[serde(default = "default_fairness_window_days")]
    pub fairness_window_days: u32,

    #[serde(default)]
    pub area: AreaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AreaConfig {
    /// Leading postal-code characters that make up an area key.
    #[serde(default = "default_postal_prefix_len")]
    pub postal_prefix_len: usize,

    /// H3 resolution (0–15) of the parent cell used as an area key.
    #[serde(default = "default_h3_resolution")]
    pub h3_resolution: u8,
}

fn default_fairness_window_days() -> u32 {
    DEFAULT_FAIRNESS_WINDOW_DAYS
}

fn default_postal_prefix_len() -> usize {
    DEFAULT_POSTAL_PREFIX_LEN
}

fn default_h3_resolution() -> u8 {
    u8::from(DEFAULT_AREA_RESOLUTION)
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            postal_prefix_len: default_postal_prefix_len(),
            h3_resolution: default_h3_resolution(),
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ranking_policy: RankingPolicyKind::default(),
            fairness_window_days: default_fairness_window_days(),
            area: AreaConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid TOML, or holds invalid values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_ranking_policy(mut self, kind: RankingPolicyKind) -> Self {
        self.ranking_policy = kind;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_FAIRNESS_WINDOW_DAYS).contains(&self.fairness_window_days) {
            return Err(ConfigError::Invalid(format!(
                "fairness_window_days must be 1-{MAX_FAIRNESS_WINDOW_DAYS}, got {}",
                self.fairness_window_days
            )));
        }
        if self.area.postal_prefix_len == 0 {
            return Err(ConfigError::Invalid(
                "area.postal_prefix_len must be at least 1".into(),
            ));
        }
        Resolution::try_from(self.area.h3_resolution).map_err(|_| {
            ConfigError::Invalid(format!(
                "area.h3_resolution must be 0-15, got {}",
                self.area.h3_resolution
            ))
        })?;
        Ok(())
    }

    /// Area keyer for this configuration. Call [`MatchConfig::validate`] first; an
    /// out-of-range resolution falls back to the default.
    pub fn area_keyer(&self) -> AreaKeyer {
        let resolution =
            Resolution::try_from(self.area.h3_resolution).unwrap_or(DEFAULT_AREA_RESOLUTION);
        AreaKeyer::new(self.area.postal_prefix_len.max(1), resolution)
    }
}

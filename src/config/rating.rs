//! Rating system configuration

use crate::rating::elo::{EloConfig, DEFAULT_HISTORY_LIMIT, DEFAULT_K_FACTOR};
use crate::roster::{
    RosterSettings, DEFAULT_INITIAL_RATING, DEFAULT_RESERVED_TIER_IDS,
    DEFAULT_RESERVED_TIER_RATING,
};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Elo and baseline rating settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Maximum rating swing per match
    pub k_factor: f64,
    /// Baseline for new characters
    pub initial_rating: i32,
    /// Baseline for the reserved low tier
    pub reserved_tier_rating: i32,
    /// Match records kept per character
    pub history_limit: usize,
    /// Characters created at the reserved baseline
    pub reserved_tier_ids: Vec<String>,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: DEFAULT_K_FACTOR,
            initial_rating: DEFAULT_INITIAL_RATING,
            reserved_tier_rating: DEFAULT_RESERVED_TIER_RATING,
            history_limit: DEFAULT_HISTORY_LIMIT,
            reserved_tier_ids: DEFAULT_RESERVED_TIER_IDS
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }
}

impl RatingSettings {
    pub fn validate(&self) -> Result<()> {
        self.elo_config().validate()?;

        if self.reserved_tier_rating > self.initial_rating {
            return Err(anyhow!(
                "Reserved tier rating {} must not exceed the initial rating {}",
                self.reserved_tier_rating,
                self.initial_rating
            ));
        }

        Ok(())
    }

    pub fn elo_config(&self) -> EloConfig {
        EloConfig {
            k_factor: self.k_factor,
            history_limit: self.history_limit,
        }
    }

    pub fn roster_settings(&self) -> RosterSettings {
        RosterSettings {
            initial_rating: self.initial_rating,
            reserved_tier_rating: self.reserved_tier_rating,
            reserved_tier_ids: self.reserved_tier_ids.iter().cloned().collect(),
        }
    }
}

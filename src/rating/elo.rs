//! Fixed-K Elo rating engine
//!
//! This module applies a single "winner beat loser" vote to a pair of characters.
//! The overall rating always moves; each affected category moves independently,
//! using that category's own ratings for the expected score.

use crate::error::{RankerError, Result};
use crate::rating::history::push_record;
use crate::types::{
    CategoryChange, Character, MatchOutcome, MatchRecord, StatCategory, VoteResult,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillratings::elo::EloRating;
use std::collections::BTreeSet;

/// Default K-factor
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Default number of match records kept per character
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Configuration for the Elo engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EloConfig {
    /// Maximum possible rating swing per match
    pub k_factor: f64,
    /// Maximum match records retained per character
    pub history_limit: usize,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k_factor: DEFAULT_K_FACTOR,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EloConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(RankerError::ConfigurationError {
                message: "K-factor must be positive".to_string(),
            }
            .into());
        }

        if self.history_limit == 0 {
            return Err(RankerError::ConfigurationError {
                message: "Match history limit must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Context shared by both match records of a vote
#[derive(Debug, Clone)]
pub struct VoteContext {
    pub timestamp: DateTime<Utc>,
    pub scenario_description: Option<String>,
}

impl VoteContext {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            scenario_description: None,
        }
    }

    pub fn with_scenario(mut self, description: impl Into<String>) -> Self {
        self.scenario_description = Some(description.into());
        self
    }
}

/// Expected score of the first rating against the second, in `[0, 1]`
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    let (expected, _) = skillratings::elo::expected_score(
        &EloRating {
            rating: f64::from(rating),
        },
        &EloRating {
            rating: f64::from(opponent),
        },
    );
    expected
}

/// Rating points the winner gains (and the loser gives up)
///
/// `round(k * (1 - expected))`, rounding half away from zero. There is no
/// minimum: a heavy favourite winning can legitimately move zero points.
pub fn calculate_elo_change(winner_rating: i32, loser_rating: i32, k_factor: f64) -> i32 {
    let expected = expected_score(winner_rating, loser_rating);
    (k_factor * (1.0 - expected)).round() as i32
}

/// Pre-vote win probability of `rating` against `opponent`, as a whole percentage
pub fn win_probability(rating: i32, opponent: i32) -> u8 {
    (expected_score(rating, opponent) * 100.0).round() as u8
}

/// Elo engine applying votes with a fixed K-factor
#[derive(Debug, Clone)]
pub struct EloEngine {
    config: EloConfig,
}

impl EloEngine {
    /// Create a new engine
    pub fn new(config: EloConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &EloConfig {
        &self.config
    }

    /// Rating change for a winner/loser rating pair under this engine's K-factor
    pub fn rating_change(&self, winner_rating: i32, loser_rating: i32) -> i32 {
        calculate_elo_change(winner_rating, loser_rating, self.config.k_factor)
    }

    /// Apply a vote and return the new states of both participants
    ///
    /// The caller guarantees `winner` and `loser` are distinct characters.
    /// `Overall` inside `affected` is ignored since it always updates.
    pub fn apply_vote(
        &self,
        winner: &Character,
        loser: &Character,
        affected: &BTreeSet<StatCategory>,
        context: VoteContext,
    ) -> VoteResult {
        let mut updated_winner = winner.clone();
        let mut updated_loser = loser.clone();

        let overall_change = self.rating_change(winner.overall_rating(), loser.overall_rating());
        updated_winner
            .ratings
            .adjust(StatCategory::Overall, overall_change);
        updated_loser
            .ratings
            .adjust(StatCategory::Overall, -overall_change);

        updated_winner.wins += 1;
        updated_loser.losses += 1;

        let mut category_changes = Vec::new();
        for &category in affected {
            if category == StatCategory::Overall {
                continue;
            }

            let change = self.rating_change(winner.rating(category), loser.rating(category));
            updated_winner.ratings.adjust(category, change);
            updated_loser.ratings.adjust(category, -change);
            category_changes.push(CategoryChange { category, change });
        }

        push_record(
            &mut updated_winner.match_history,
            MatchRecord {
                opponent_id: loser.id.clone(),
                opponent_name: loser.name.clone(),
                outcome: MatchOutcome::Win,
                rating_change: overall_change,
                timestamp: context.timestamp,
                scenario_description: context.scenario_description.clone(),
            },
            self.config.history_limit,
        );
        push_record(
            &mut updated_loser.match_history,
            MatchRecord {
                opponent_id: winner.id.clone(),
                opponent_name: winner.name.clone(),
                outcome: MatchOutcome::Loss,
                rating_change: -overall_change,
                timestamp: context.timestamp,
                scenario_description: context.scenario_description,
            },
            self.config.history_limit,
        );

        VoteResult {
            winner: updated_winner,
            loser: updated_loser,
            overall_change,
            category_changes,
        }
    }
}

impl Default for EloEngine {
    fn default() -> Self {
        Self {
            config: EloConfig::default(),
        }
    }
}

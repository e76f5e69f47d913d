//! Bounded match history
//!
//! Histories are ordered most recent first. Appending prepends and evicts
//! the oldest entries beyond the configured limit.

use crate::types::{Character, MatchOutcome, MatchRecord};
use serde::{Deserialize, Serialize};

/// Prepend a record and cap the history at `limit` entries
pub fn push_record(history: &mut Vec<MatchRecord>, record: MatchRecord, limit: usize) {
    history.insert(0, record);
    history.truncate(limit);
}

/// Win tally between two characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub a_wins: u32,
    pub b_wins: u32,
    pub total: u32,
}

/// Count wins of `a` over `b` and of `b` over `a`
///
/// Only the retained (bounded) histories are inspected, so the tally covers
/// recent matches rather than the full lifetime of either character.
pub fn head_to_head(a: &Character, b: &Character) -> HeadToHead {
    let wins_against = |subject: &Character, opponent: &Character| -> u32 {
        subject
            .match_history
            .iter()
            .filter(|record| record.opponent_id == opponent.id && record.outcome == MatchOutcome::Win)
            .count() as u32
    };

    let a_wins = wins_against(a, b);
    let b_wins = wins_against(b, a);

    HeadToHead {
        a_wins,
        b_wins,
        total: a_wins + b_wins,
    }
}

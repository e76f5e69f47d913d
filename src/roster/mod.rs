//! Roster management: character lifecycle, votes and roster queries

pub mod manager;
pub mod seed;

pub use manager::{
    CharacterDraft, CharacterSummary, FactionDetail, FactionSummary, HeadToHeadReport, Matchup,
    RankedCharacter, RosterManager, RosterSettings, RosterStats, ScenarioChoice, TierGroup,
    VoteOutcome, VoteRequest, DEFAULT_FACTION_DESCRIPTION, DEFAULT_INITIAL_RATING,
    DEFAULT_RESERVED_TIER_IDS, DEFAULT_RESERVED_TIER_RATING,
};
pub use seed::{default_roster, load_roster_file, parse_roster, SeedCharacter};

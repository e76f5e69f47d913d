//! Castle Ranker - Elo rankings for character-vs-character fan votes
//!
//! This crate records pairwise votes between characters, keeps an overall
//! Elo rating plus nine scenario-driven category ratings per character, and
//! derives leaderboards, tier lists, faction summaries and head-to-head
//! records from them.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod roster;
pub mod scenario;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RankerError, Result};
pub use types::*;

// Re-export key components
pub use rating::{CharacterStore, EloEngine, Tier};
pub use roster::{RosterManager, VoteOutcome, VoteRequest};
pub use scenario::{ScenarioProvider, StaticScenarioProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Rating core: tiers, the Elo engine, match history and character storage
//!
//! The tier classifier, Elo engine and history helpers are pure and
//! infallible. Storage implementations sit behind the `CharacterStore` trait.

pub mod elo;
pub mod fallback_store;
pub mod history;
pub mod json_store;
pub mod storage;
pub mod tier;

// Re-export commonly used types
pub use elo::{calculate_elo_change, expected_score, win_probability, EloConfig, EloEngine, VoteContext};
pub use fallback_store::FallbackCharacterStore;
pub use history::{head_to_head, push_record, HeadToHead};
pub use json_store::JsonFileCharacterStore;
pub use storage::{CharacterStore, InMemoryCharacterStore, RosterSnapshot};
pub use tier::{classify_tier, tier_for_rating, Tier};

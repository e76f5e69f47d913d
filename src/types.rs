//! Common types used throughout the ranking service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Unique identifier for characters
pub type CharacterId = String;

/// Faction a character belongs to when none is given
pub const DEFAULT_FACTION: &str = "Other";

/// Version tag used when none is given
pub const DEFAULT_VERSION: &str = "Current";

/// Rating axis tracked for every character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCategory {
    Overall,
    HandToHand,
    BladedWeapons,
    Firearms,
    BattleIq,
    PhysicalStats,
    Speed,
    Durability,
    Stamina,
    Assassination,
}

impl StatCategory {
    /// Every rating axis, overall first
    pub const ALL: [StatCategory; 10] = [
        StatCategory::Overall,
        StatCategory::HandToHand,
        StatCategory::BladedWeapons,
        StatCategory::Firearms,
        StatCategory::BattleIq,
        StatCategory::PhysicalStats,
        StatCategory::Speed,
        StatCategory::Durability,
        StatCategory::Stamina,
        StatCategory::Assassination,
    ];

    /// Number of rating axes
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this axis inside a `CategoryRatings` array
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            StatCategory::Overall => "Overall",
            StatCategory::HandToHand => "Hand-to-Hand",
            StatCategory::BladedWeapons => "Bladed Weapons",
            StatCategory::Firearms => "Firearms",
            StatCategory::BattleIq => "Battle IQ",
            StatCategory::PhysicalStats => "Physical",
            StatCategory::Speed => "Speed",
            StatCategory::Durability => "Durability",
            StatCategory::Stamina => "Stamina",
            StatCategory::Assassination => "Assassination",
        }
    }

    /// Stable snake_case identifier, matching the serde representation
    pub fn as_str(self) -> &'static str {
        match self {
            StatCategory::Overall => "overall",
            StatCategory::HandToHand => "hand_to_hand",
            StatCategory::BladedWeapons => "bladed_weapons",
            StatCategory::Firearms => "firearms",
            StatCategory::BattleIq => "battle_iq",
            StatCategory::PhysicalStats => "physical_stats",
            StatCategory::Speed => "speed",
            StatCategory::Durability => "durability",
            StatCategory::Stamina => "stamina",
            StatCategory::Assassination => "assassination",
        }
    }

    /// Parse a snake_case identifier
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }
}

impl std::fmt::Display for StatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The ten ratings of a character, indexed by `StatCategory`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RatingsRepr", into = "RatingsRepr")]
pub struct CategoryRatings {
    values: [i32; StatCategory::COUNT],
}

impl CategoryRatings {
    /// All ratings set to the same baseline
    pub fn uniform(baseline: i32) -> Self {
        Self {
            values: [baseline; StatCategory::COUNT],
        }
    }

    pub fn get(&self, category: StatCategory) -> i32 {
        self.values[category.index()]
    }

    pub fn set(&mut self, category: StatCategory, rating: i32) {
        self.values[category.index()] = rating;
    }

    /// Shift one rating by a signed delta
    pub fn adjust(&mut self, category: StatCategory, delta: i32) {
        self.values[category.index()] += delta;
    }

    pub fn overall(&self) -> i32 {
        self.get(StatCategory::Overall)
    }

    /// Iterate `(category, rating)` pairs in `StatCategory::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (StatCategory, i32)> + '_ {
        StatCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }
}

impl Default for CategoryRatings {
    fn default() -> Self {
        Self::uniform(1200)
    }
}

impl Index<StatCategory> for CategoryRatings {
    type Output = i32;

    fn index(&self, category: StatCategory) -> &i32 {
        &self.values[category.index()]
    }
}

impl IndexMut<StatCategory> for CategoryRatings {
    fn index_mut(&mut self, category: StatCategory) -> &mut i32 {
        &mut self.values[category.index()]
    }
}

/// Named-field wire shape for `CategoryRatings`
#[derive(Serialize, Deserialize)]
struct RatingsRepr {
    overall: i32,
    hand_to_hand: i32,
    bladed_weapons: i32,
    firearms: i32,
    battle_iq: i32,
    physical_stats: i32,
    speed: i32,
    durability: i32,
    stamina: i32,
    assassination: i32,
}

impl From<RatingsRepr> for CategoryRatings {
    fn from(repr: RatingsRepr) -> Self {
        Self {
            values: [
                repr.overall,
                repr.hand_to_hand,
                repr.bladed_weapons,
                repr.firearms,
                repr.battle_iq,
                repr.physical_stats,
                repr.speed,
                repr.durability,
                repr.stamina,
                repr.assassination,
            ],
        }
    }
}

impl From<CategoryRatings> for RatingsRepr {
    fn from(ratings: CategoryRatings) -> Self {
        let [overall, hand_to_hand, bladed_weapons, firearms, battle_iq, physical_stats, speed, durability, stamina, assassination] =
            ratings.values;
        Self {
            overall,
            hand_to_hand,
            bladed_weapons,
            firearms,
            battle_iq,
            physical_stats,
            speed,
            durability,
            stamina,
            assassination,
        }
    }
}

/// Outcome of a match from one participant's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchOutcome {
    Win,
    Loss,
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchOutcome::Win => write!(f, "WIN"),
            MatchOutcome::Loss => write!(f, "LOSS"),
        }
    }
}

/// One entry of a character's match history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub opponent_id: CharacterId,
    /// Denormalized so the entry stays readable after the opponent is deleted
    pub opponent_name: String,
    pub outcome: MatchOutcome,
    /// Signed overall rating change applied by this match
    pub rating_change: i32,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_description: Option<String>,
}

/// A ranked competitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub version: String,
    pub faction: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_link: Option<String>,
    pub ratings: CategoryRatings,
    pub wins: u32,
    pub losses: u32,
    /// Most recent first, bounded by the configured history limit
    #[serde(default)]
    pub match_history: Vec<MatchRecord>,
}

impl Character {
    /// Build a character with baseline stats from descriptive fields
    pub fn from_profile(id: CharacterId, profile: CharacterProfile, baseline: i32) -> Self {
        Self {
            id,
            name: profile.name,
            version: profile.version,
            faction: profile.faction,
            image_url: profile.image_url,
            description: profile.description,
            wiki_link: profile.wiki_link,
            ratings: CategoryRatings::uniform(baseline),
            wins: 0,
            losses: 0,
            match_history: Vec::new(),
        }
    }

    pub fn overall_rating(&self) -> i32 {
        self.ratings.overall()
    }

    pub fn rating(&self, category: StatCategory) -> i32 {
        self.ratings.get(category)
    }

    /// Descriptive fields only
    pub fn profile(&self) -> CharacterProfile {
        CharacterProfile {
            name: self.name.clone(),
            version: self.version.clone(),
            faction: self.faction.clone(),
            image_url: self.image_url.clone(),
            description: self.description.clone(),
            wiki_link: self.wiki_link.clone(),
        }
    }

    /// Display name including the version tag, e.g. "Kim Shin (Current)"
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.version)
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }
}

/// Descriptive, non-rating fields of a character
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub faction: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_link: Option<String>,
}

/// Partial edit of descriptive fields; ratings are never touched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub version: Option<String>,
    pub faction: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub wiki_link: Option<String>,
}

/// Per-category delta applied by a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryChange {
    pub category: StatCategory,
    /// Amount added to the winner and subtracted from the loser
    pub change: i32,
}

/// Result of applying one vote to a winner/loser pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    pub winner: Character,
    pub loser: Character,
    /// Amount added to the winner's overall rating and subtracted from the loser's
    pub overall_change: i32,
    pub category_changes: Vec<CategoryChange>,
}

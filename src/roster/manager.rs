//! Roster manager orchestrating characters, votes and roster queries
//!
//! This module provides the RosterManager that wraps the pure rating core
//! with storage, scenario resolution, metrics and logging. Every vote is a
//! read-modify-write of two characters; those are serialized through lock
//! stripes keyed by character id so concurrent votes never lose updates.

use crate::error::{RankerError, Result};
use crate::metrics::MetricsCollector;
use crate::rating::elo::{win_probability, EloConfig, EloEngine, VoteContext};
use crate::rating::history::{head_to_head, HeadToHead};
use crate::rating::storage::{CharacterStore, RosterSnapshot};
use crate::rating::tier::{tier_for_rating, Tier};
use crate::roster::seed::{default_roster, SeedCharacter};
use crate::scenario::{ActiveScenario, ScenarioProvider, StaticScenarioProvider, TagKind};
use crate::types::{
    Character, CharacterId, CharacterProfile, ProfileUpdate, StatCategory, VoteResult,
    DEFAULT_FACTION, DEFAULT_VERSION,
};
use crate::utils::{current_timestamp, generate_character_id, matches_filter, non_empty_or};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Baseline rating for new characters
pub const DEFAULT_INITIAL_RATING: i32 = 1200;

/// Baseline rating for the reserved low tier
pub const DEFAULT_RESERVED_TIER_RATING: i32 = 400;

/// Characters that start in the reserved low tier
pub const DEFAULT_RESERVED_TIER_IDS: [&str; 8] = [
    "lisa",
    "oijin",
    "kim-taehoon",
    "cheon-ildo",
    "shinsuke-iwashiro",
    "lim-jong-tae",
    "riwon-lee",
    "marina",
];

/// Shown for factions nobody has described yet
pub const DEFAULT_FACTION_DESCRIPTION: &str = "An active faction within the Castle universe.";

/// Number of members previewed in a faction summary
const FACTION_PREVIEW_SIZE: usize = 5;

/// Number of per-character vote locks; ids sharing a stripe also share a lock
const LOCK_STRIPES: usize = 64;

/// Baseline ratings applied when characters are created
#[derive(Debug, Clone)]
pub struct RosterSettings {
    pub initial_rating: i32,
    pub reserved_tier_rating: i32,
    pub reserved_tier_ids: HashSet<CharacterId>,
}

impl RosterSettings {
    /// Starting rating for a character id
    pub fn baseline_for(&self, id: &str) -> i32 {
        if self.reserved_tier_ids.contains(id) {
            self.reserved_tier_rating
        } else {
            self.initial_rating
        }
    }
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            initial_rating: DEFAULT_INITIAL_RATING,
            reserved_tier_rating: DEFAULT_RESERVED_TIER_RATING,
            reserved_tier_ids: DEFAULT_RESERVED_TIER_IDS
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }
}

/// Request to add a character
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterDraft {
    /// Generated when absent
    #[serde(default)]
    pub id: Option<CharacterId>,
    #[serde(flatten)]
    pub profile: CharacterProfile,
}

impl CharacterDraft {
    pub fn new(profile: CharacterProfile) -> Self {
        Self { id: None, profile }
    }

    pub fn with_id(mut self, id: impl Into<CharacterId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Explicit scenario choices for a vote; missing or `"random"` values are drawn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioChoice {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub weapon: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

/// A single "winner beat loser" vote
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteRequest {
    pub winner_id: CharacterId,
    pub loser_id: CharacterId,
    /// Loose scenario tag ids; unknown tags are ignored
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub scenario: Option<ScenarioChoice>,
}

impl VoteRequest {
    pub fn new(winner_id: impl Into<CharacterId>, loser_id: impl Into<CharacterId>) -> Self {
        Self {
            winner_id: winner_id.into(),
            loser_id: loser_id.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scenario(mut self, scenario: ScenarioChoice) -> Self {
        self.scenario = Some(scenario);
        self
    }
}

/// Result of a recorded vote
#[derive(Debug, Clone, Serialize)]
pub struct VoteOutcome {
    #[serde(flatten)]
    pub result: VoteResult,
    pub affected_categories: BTreeSet<StatCategory>,
    pub scenario_description: Option<String>,
    /// Winner's pre-vote win probability in percent
    pub winner_probability: u8,
    /// The winner entered with the lower overall rating
    pub upset: bool,
}

/// Two characters and a scenario to vote on
#[derive(Debug, Clone, Serialize)]
pub struct Matchup {
    pub first: Character,
    pub second: Character,
    pub scenario: ActiveScenario,
    pub first_win_probability: u8,
    pub second_win_probability: u8,
}

/// Lightweight view of a character for listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterSummary {
    pub id: CharacterId,
    pub name: String,
    pub version: String,
    pub faction: String,
    pub image_url: String,
    pub overall_rating: i32,
    pub tier: Tier,
    pub wins: u32,
    pub losses: u32,
}

impl From<&Character> for CharacterSummary {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id.clone(),
            name: character.name.clone(),
            version: character.version.clone(),
            faction: character.faction.clone(),
            image_url: character.image_url.clone(),
            overall_rating: character.overall_rating(),
            tier: tier_for_rating(character.overall_rating()),
            wins: character.wins,
            losses: character.losses,
        }
    }
}

/// Leaderboard row
#[derive(Debug, Clone, Serialize)]
pub struct RankedCharacter {
    pub rank: usize,
    /// Rating in the leaderboard's category
    pub rating: i32,
    #[serde(flatten)]
    pub character: CharacterSummary,
}

/// Characters of one tier, best first
#[derive(Debug, Clone, Serialize)]
pub struct TierGroup {
    pub tier: Tier,
    pub characters: Vec<CharacterSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactionSummary {
    pub faction: String,
    pub members: usize,
    pub average_rating: i32,
    pub tier: Tier,
    /// Strongest members, best first
    pub top_members: Vec<CharacterSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactionDetail {
    pub faction: String,
    pub description: String,
    /// Rounded mean overall rating, 0 without members
    pub average_rating: i32,
    pub tier: Tier,
    pub members: Vec<CharacterSummary>,
}

/// Side-by-side rating of two characters in one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryComparison {
    pub category: StatCategory,
    pub first: i32,
    pub second: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadToHeadReport {
    pub first: CharacterSummary,
    pub second: CharacterSummary,
    pub record: HeadToHead,
    pub first_win_probability: u8,
    pub categories: Vec<CategoryComparison>,
}

/// Statistics about roster manager operations
#[derive(Debug, Clone, Default, Serialize)]
pub struct RosterStats {
    /// Characters currently stored
    pub characters: usize,
    /// Total number of votes applied
    pub votes_recorded: u64,
    /// Votes won by the lower rated character
    pub upsets: u64,
    pub characters_created: u64,
    pub characters_deleted: u64,
    pub last_vote_at: Option<DateTime<Utc>>,
}

/// The main roster manager
#[derive(Clone)]
pub struct RosterManager {
    /// Character storage
    store: Arc<dyn CharacterStore>,
    /// Elo engine applying votes
    engine: EloEngine,
    /// Scenario catalog and generator
    scenarios: Arc<dyn ScenarioProvider>,
    /// Baseline ratings
    settings: RosterSettings,
    /// Striped async mutexes guarding each character's read-modify-write
    character_locks: Arc<[Mutex<()>]>,
    /// Manager statistics
    stats: Arc<RwLock<RosterStats>>,
    /// Metrics collector for recording performance data
    metrics_collector: Arc<MetricsCollector>,
}

impl RosterManager {
    /// Create a new roster manager over the built-in scenario catalog
    pub fn new(
        store: Arc<dyn CharacterStore>,
        elo_config: EloConfig,
        settings: RosterSettings,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Result<Self> {
        Ok(Self {
            store,
            engine: EloEngine::new(elo_config)?,
            scenarios: Arc::new(StaticScenarioProvider::new()),
            settings,
            character_locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
            stats: Arc::new(RwLock::new(RosterStats::default())),
            metrics_collector,
        })
    }

    /// Replace the scenario provider
    pub fn with_scenarios(mut self, scenarios: Arc<dyn ScenarioProvider>) -> Self {
        self.scenarios = scenarios;
        self
    }

    pub fn store(&self) -> &Arc<dyn CharacterStore> {
        &self.store
    }

    pub fn engine(&self) -> &EloEngine {
        &self.engine
    }

    pub fn scenarios(&self) -> &Arc<dyn ScenarioProvider> {
        &self.scenarios
    }

    pub fn settings(&self) -> &RosterSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics_collector
    }

    /// Add a new character with baseline ratings
    pub async fn add_character(&self, draft: CharacterDraft) -> Result<Character> {
        let character = self.build_character(draft)?;
        let baseline = character.overall_rating();

        self.timed(
            "insert_character",
            self.store.insert_character(character.clone()),
        )
        .await?;

        self.metrics_collector.record_character_created();
        self.update_stats(|stats| stats.characters_created += 1)?;

        info!(
            "Added character '{}' ({}) to faction '{}' at rating {}",
            character.display_name(),
            character.id,
            character.faction,
            baseline
        );

        Ok(character)
    }

    /// Derive a new version of an existing character
    ///
    /// Descriptive fields are copied; identity, version tag and stats start fresh.
    pub async fn create_version(&self, base_id: &str, version: &str) -> Result<Character> {
        let base = self.get_character(base_id).await?;

        let mut profile = base.profile();
        profile.version = version.to_string();

        debug!(
            "Deriving version '{}' from character '{}'",
            version,
            base.display_name()
        );

        self.add_character(CharacterDraft::new(profile)).await
    }

    /// Edit descriptive fields; ratings, counters and history are untouched
    pub async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<Character> {
        let _guard = self.character_locks[lock_stripe(id)].lock().await;

        let mut character = self.get_character(id).await?;

        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(RankerError::InvalidCharacter {
                    reason: "name must not be empty".to_string(),
                }
                .into());
            }
            character.name = name.to_string();
        }
        if let Some(version) = update.version {
            character.version = non_empty_or(&version, DEFAULT_VERSION);
        }
        if let Some(faction) = update.faction {
            character.faction = non_empty_or(&faction, DEFAULT_FACTION);
        }
        if let Some(image_url) = update.image_url {
            character.image_url = image_url.trim().to_string();
        }
        if let Some(description) = update.description {
            character.description = description;
        }
        if let Some(wiki_link) = update.wiki_link {
            character.wiki_link = Some(wiki_link).filter(|link| !link.trim().is_empty());
        }

        self.timed(
            "persist_characters",
            self.store.persist_characters(vec![character.clone()]),
        )
        .await?;

        info!("Updated profile of character '{}'", character.id);
        Ok(character)
    }

    /// Delete a character
    ///
    /// Other characters' history entries keep the deleted id and name as-is.
    pub async fn delete_character(&self, id: &str) -> Result<()> {
        let removed = {
            let _guard = self.character_locks[lock_stripe(id)].lock().await;
            self.timed("remove_character", self.store.remove_character(id))
                .await?
        };

        if !removed {
            return Err(RankerError::CharacterNotFound { id: id.to_string() }.into());
        }

        self.metrics_collector.record_character_deleted();
        self.update_stats(|stats| stats.characters_deleted += 1)?;

        info!("Deleted character '{}'", id);
        Ok(())
    }

    /// Record a vote and persist both participants
    pub async fn record_vote(&self, request: VoteRequest) -> Result<VoteOutcome> {
        let start_time = Instant::now();

        info!(
            "Processing vote - winner: '{}', loser: '{}', tags: {:?}",
            request.winner_id, request.loser_id, request.tags
        );

        if request.winner_id == request.loser_id {
            warn!("Rejected self-vote for character '{}'", request.winner_id);
            return Err(RankerError::SelfMatch {
                id: request.winner_id,
            }
            .into());
        }

        let result: Result<VoteOutcome> = async {
            let (affected, scenario_description) = self.resolve_vote_scenario(&request)?;

            // Sorted acquisition keeps two opposite votes from deadlocking
            let winner_stripe = lock_stripe(&request.winner_id);
            let loser_stripe = lock_stripe(&request.loser_id);
            let (first, second) = (
                winner_stripe.min(loser_stripe),
                winner_stripe.max(loser_stripe),
            );
            let _first_guard = self.character_locks[first].lock().await;
            let _second_guard = if second != first {
                Some(self.character_locks[second].lock().await)
            } else {
                None
            };

            let winner = self.get_character(&request.winner_id).await?;
            let loser = self.get_character(&request.loser_id).await?;

            let winner_probability =
                win_probability(winner.overall_rating(), loser.overall_rating());
            let upset = winner.overall_rating() < loser.overall_rating();

            let context = match &scenario_description {
                Some(description) => VoteContext::now().with_scenario(description.clone()),
                None => VoteContext::now(),
            };
            let vote = self.engine.apply_vote(&winner, &loser, &affected, context);

            let records = [&vote.winner, &vote.loser]
                .into_iter()
                .filter_map(|c| c.match_history.first().map(|r| (c.id.clone(), r.clone())))
                .collect();
            self.timed(
                "commit_match",
                self.store.commit_match(
                    vec![vote.winner.clone(), vote.loser.clone()],
                    records,
                    self.engine.config().history_limit,
                ),
            )
            .await?;

            info!(
                "Vote applied - '{}' {} -> {}, '{}' {} -> {}, categories: {}",
                vote.winner.id,
                winner.overall_rating(),
                vote.winner.overall_rating(),
                vote.loser.id,
                loser.overall_rating(),
                vote.loser.overall_rating(),
                vote.category_changes.len()
            );

            Ok(VoteOutcome {
                result: vote,
                affected_categories: affected,
                scenario_description,
                winner_probability,
                upset,
            })
        }
        .await;

        let duration = start_time.elapsed();
        info!(
            "Vote processing completed - winner: '{}', loser: '{}', duration: {:.2}ms, result: {}",
            request.winner_id,
            request.loser_id,
            duration.as_secs_f64() * 1000.0,
            if result.is_ok() { "SUCCESS" } else { "FAILED" }
        );

        if let Ok(outcome) = &result {
            self.metrics_collector
                .record_vote(&outcome.result, outcome.upset, duration);
            let upset = outcome.upset;
            self.update_stats(|stats| {
                stats.votes_recorded += 1;
                if upset {
                    stats.upsets += 1;
                }
                stats.last_vote_at = Some(current_timestamp());
            })?;
        }

        result
    }

    /// Affected categories and match description for a vote
    fn resolve_vote_scenario(
        &self,
        request: &VoteRequest,
    ) -> Result<(BTreeSet<StatCategory>, Option<String>)> {
        let mut affected = self.scenarios.resolve(&request.tags);

        let description = match &request.scenario {
            Some(choice) => {
                let scenario = self.scenarios.build_scenario(
                    choice.location.as_deref(),
                    choice.weapon.as_deref(),
                    choice.format.as_deref(),
                )?;
                affected.extend(scenario.affected_categories.iter().copied());
                Some(scenario.description)
            }
            None => {
                let names: Vec<&str> = request
                    .tags
                    .iter()
                    .filter_map(|id| self.tag_name(id))
                    .collect();
                (!names.is_empty()).then(|| names.join(" · "))
            }
        };

        Ok((affected, description))
    }

    fn tag_name(&self, id: &str) -> Option<&'static str> {
        [TagKind::Location, TagKind::Weapon, TagKind::Format]
            .into_iter()
            .flat_map(|kind| self.scenarios.tags(kind).iter())
            .find(|tag| tag.id == id)
            .map(|tag| tag.name)
    }

    /// Two distinct random characters under a random scenario
    pub async fn random_matchup(&self) -> Result<Matchup> {
        let characters = self.list_characters().await?;
        let (first, second) = pick_pair(&characters)?;
        let scenario = self.scenarios.random_scenario()?;

        debug!(
            "Random matchup: '{}' vs '{}' ({})",
            first.id, second.id, scenario.description
        );

        Ok(Matchup {
            first_win_probability: win_probability(
                first.overall_rating(),
                second.overall_rating(),
            ),
            second_win_probability: win_probability(
                second.overall_rating(),
                first.overall_rating(),
            ),
            first,
            second,
            scenario,
        })
    }

    pub async fn get_character(&self, id: &str) -> Result<Character> {
        self.timed("load_character", self.store.load_character(id))
            .await?
            .ok_or_else(|| RankerError::CharacterNotFound { id: id.to_string() }.into())
    }

    pub async fn list_characters(&self) -> Result<Vec<Character>> {
        self.timed("list_characters", self.store.list_characters())
            .await
    }

    /// Characters ranked by one category, optionally filtered by name
    pub async fn leaderboard(
        &self,
        category: StatCategory,
        name_filter: Option<&str>,
    ) -> Result<Vec<RankedCharacter>> {
        let filter = name_filter.unwrap_or_default();
        let mut characters: Vec<Character> = self
            .list_characters()
            .await?
            .into_iter()
            .filter(|c| matches_filter(&c.name, filter))
            .collect();

        characters.sort_by(|a, b| {
            b.rating(category)
                .cmp(&a.rating(category))
                .then_with(|| a.name.cmp(&b.name))
        });

        debug!(
            "Leaderboard for {} with filter '{}': {} entries",
            category,
            filter,
            characters.len()
        );

        Ok(characters
            .iter()
            .enumerate()
            .map(|(index, character)| RankedCharacter {
                rank: index + 1,
                rating: character.rating(category),
                character: CharacterSummary::from(character),
            })
            .collect())
    }

    /// Every ranked tier with its characters, best first; empty tiers included
    pub async fn tier_list(&self) -> Result<Vec<TierGroup>> {
        let characters = sorted_by_overall(self.list_characters().await?);

        Ok(Tier::RANKED
            .into_iter()
            .map(|tier| TierGroup {
                tier,
                characters: characters
                    .iter()
                    .filter(|c| tier_for_rating(c.overall_rating()) == tier)
                    .map(CharacterSummary::from)
                    .collect(),
            })
            .collect())
    }

    /// All versions sharing a character's name, "Current" first
    pub async fn versions_of(&self, id: &str) -> Result<Vec<Character>> {
        let character = self.get_character(id).await?;
        let name = character.name.to_lowercase();

        let mut versions: Vec<Character> = self
            .list_characters()
            .await?
            .into_iter()
            .filter(|c| c.name.to_lowercase() == name)
            .collect();
        versions.sort_by_key(|c| (!is_current(c), c.version.to_lowercase()));

        Ok(versions)
    }

    /// Roster listing
    ///
    /// Without a search term each name appears once, preferring its "Current"
    /// version. A search matches name, version or faction and lists every hit.
    pub async fn roster_view(&self, search: Option<&str>) -> Result<Vec<CharacterSummary>> {
        let characters = self.list_characters().await?;

        let search = search.map(str::trim).unwrap_or_default();
        if !search.is_empty() {
            return Ok(characters
                .iter()
                .filter(|c| {
                    matches_filter(&c.name, search)
                        || matches_filter(&c.version, search)
                        || matches_filter(&c.faction, search)
                })
                .map(CharacterSummary::from)
                .collect());
        }

        let mut order: Vec<String> = Vec::new();
        let mut representatives: HashMap<String, &Character> = HashMap::new();
        for character in &characters {
            match representatives.get(&character.name) {
                None => {
                    order.push(character.name.clone());
                    representatives.insert(character.name.clone(), character);
                }
                Some(existing) if is_current(character) && !is_current(existing) => {
                    representatives.insert(character.name.clone(), character);
                }
                Some(_) => {}
            }
        }

        Ok(order
            .iter()
            .filter_map(|name| representatives.get(name))
            .map(|c| CharacterSummary::from(*c))
            .collect())
    }

    /// Summary of every faction with members, sorted by name
    pub async fn factions(&self) -> Result<Vec<FactionSummary>> {
        let mut grouped: BTreeMap<String, Vec<Character>> = BTreeMap::new();
        for character in self.list_characters().await? {
            grouped
                .entry(character.faction.clone())
                .or_default()
                .push(character);
        }

        Ok(grouped
            .into_iter()
            .map(|(faction, members)| {
                let members = sorted_by_overall(members);
                let average_rating = average_overall(&members);
                FactionSummary {
                    faction,
                    members: members.len(),
                    average_rating,
                    tier: tier_for_rating(average_rating),
                    top_members: members
                        .iter()
                        .take(FACTION_PREVIEW_SIZE)
                        .map(CharacterSummary::from)
                        .collect(),
                }
            })
            .collect())
    }

    /// One faction with its members and description
    pub async fn faction_detail(&self, faction: &str) -> Result<FactionDetail> {
        let members = sorted_by_overall(
            self.timed(
                "load_characters_by_faction",
                self.store.load_characters_by_faction(faction),
            )
            .await?,
        );

        let description = self
            .timed(
                "faction_description",
                self.store.faction_description(faction),
            )
            .await?
            .unwrap_or_else(|| DEFAULT_FACTION_DESCRIPTION.to_string());

        let average_rating = average_overall(&members);

        Ok(FactionDetail {
            faction: faction.to_string(),
            description,
            average_rating,
            tier: tier_for_rating(average_rating),
            members: members.iter().map(CharacterSummary::from).collect(),
        })
    }

    pub async fn set_faction_description(&self, faction: &str, description: &str) -> Result<()> {
        self.timed(
            "set_faction_description",
            self.store
                .set_faction_description(faction, description.trim().to_string()),
        )
        .await?;

        info!("Updated description of faction '{}'", faction);
        Ok(())
    }

    /// Compare two characters: recorded meetings, odds and category ratings
    pub async fn head_to_head(&self, first_id: &str, second_id: &str) -> Result<HeadToHeadReport> {
        if first_id == second_id {
            return Err(RankerError::SelfMatch {
                id: first_id.to_string(),
            }
            .into());
        }

        let first = self.get_character(first_id).await?;
        let second = self.get_character(second_id).await?;

        Ok(HeadToHeadReport {
            record: head_to_head(&first, &second),
            first_win_probability: win_probability(
                first.overall_rating(),
                second.overall_rating(),
            ),
            categories: StatCategory::ALL
                .into_iter()
                .map(|category| CategoryComparison {
                    category,
                    first: first.rating(category),
                    second: second.rating(category),
                })
                .collect(),
            first: CharacterSummary::from(&first),
            second: CharacterSummary::from(&second),
        })
    }

    /// Load the bundled roster if the store is empty
    ///
    /// Returns the number of characters inserted.
    pub async fn seed_default_roster(&self) -> Result<usize> {
        self.seed_roster(default_roster()?).await
    }

    /// Load roster entries if the store is empty
    ///
    /// Every entry is normalized and checked before anything is written, and
    /// the whole roster is stored in one write.
    pub async fn seed_roster(&self, entries: Vec<SeedCharacter>) -> Result<usize> {
        let mut seen = HashSet::new();
        let mut characters = Vec::with_capacity(entries.len());
        for entry in entries {
            let (id, profile) = entry.into_parts();
            let character = self.build_character(CharacterDraft::new(profile).with_id(id))?;
            if !seen.insert(character.id.clone()) {
                return Err(RankerError::DuplicateCharacter { id: character.id }.into());
            }
            characters.push(character);
        }

        let existing = self.timed("count", self.store.count()).await?;
        if existing > 0 {
            info!(
                "Roster already holds {} characters, skipping seed",
                existing
            );
            self.metrics_collector.set_roster_size(existing);
            return Ok(0);
        }

        let inserted = characters.len();
        self.timed(
            "persist_characters",
            self.store.persist_characters(characters),
        )
        .await?;

        self.metrics_collector.set_roster_size(inserted);
        info!("Seeded roster with {} characters", inserted);
        Ok(inserted)
    }

    /// Remove every character and faction description
    pub async fn reset(&self) -> Result<()> {
        self.timed("clear", self.store.clear()).await?;
        self.metrics_collector.set_roster_size(0);

        warn!("Roster reset: all characters removed");
        Ok(())
    }

    /// Full copy of the stored roster, histories and faction descriptions
    pub async fn export_roster(&self) -> Result<RosterSnapshot> {
        let snapshot = self
            .timed("export_snapshot", self.store.export_snapshot())
            .await?;

        info!(
            "Exported roster of {} characters and {} faction descriptions",
            snapshot.characters.len(),
            snapshot.faction_descriptions.len()
        );
        Ok(snapshot)
    }

    /// Get manager statistics
    pub async fn stats(&self) -> Result<RosterStats> {
        let characters = self.timed("count", self.store.count()).await?;

        let mut stats = self
            .stats
            .read()
            .map_err(|_| RankerError::InternalError {
                message: "Failed to acquire stats lock".to_string(),
            })?
            .clone();
        stats.characters = characters;

        Ok(stats)
    }

    /// Normalize a draft into a character at its baseline ratings
    fn build_character(&self, draft: CharacterDraft) -> Result<Character> {
        let name = draft.profile.name.trim().to_string();
        if name.is_empty() {
            return Err(RankerError::InvalidCharacter {
                reason: "name must not be empty".to_string(),
            }
            .into());
        }

        let id = match draft.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_character_id(),
        };

        let profile = CharacterProfile {
            name,
            version: non_empty_or(&draft.profile.version, DEFAULT_VERSION),
            faction: non_empty_or(&draft.profile.faction, DEFAULT_FACTION),
            image_url: draft.profile.image_url.trim().to_string(),
            description: draft.profile.description,
            wiki_link: draft.profile.wiki_link.filter(|link| !link.trim().is_empty()),
        };

        let baseline = self.settings.baseline_for(&id);
        Ok(Character::from_profile(id, profile, baseline))
    }

    /// Run a store operation, recording its duration and outcome
    async fn timed<T>(
        &self,
        operation: &str,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timer = self.metrics_collector.start_timer();
        let result = future.await;
        self.metrics_collector
            .record_storage_operation(operation, result.is_ok(), timer.stop());
        result
    }

    fn update_stats(&self, update: impl FnOnce(&mut RosterStats)) -> Result<()> {
        let mut stats = self
            .stats
            .write()
            .map_err(|_| RankerError::InternalError {
                message: "Failed to acquire stats lock".to_string(),
            })?;
        update(&mut stats);
        Ok(())
    }
}

/// Index of the lock guarding `id`
fn lock_stripe(id: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    (hasher.finish() % LOCK_STRIPES as u64) as usize
}

fn is_current(character: &Character) -> bool {
    character.version.eq_ignore_ascii_case(DEFAULT_VERSION)
}

fn sorted_by_overall(mut characters: Vec<Character>) -> Vec<Character> {
    characters.sort_by(|a, b| {
        b.overall_rating()
            .cmp(&a.overall_rating())
            .then_with(|| a.name.cmp(&b.name))
    });
    characters
}

fn average_overall(characters: &[Character]) -> i32 {
    if characters.is_empty() {
        return 0;
    }

    let total: i64 = characters
        .iter()
        .map(|c| i64::from(c.overall_rating()))
        .sum();
    (total as f64 / characters.len() as f64).round() as i32
}

fn pick_pair(characters: &[Character]) -> Result<(Character, Character)> {
    let mut picked = characters.choose_multiple(&mut rand::thread_rng(), 2);

    match (picked.next(), picked.next()) {
        (Some(first), Some(second)) => Ok((first.clone(), second.clone())),
        _ => Err(RankerError::NotEnoughCharacters {
            available: characters.len(),
        }
        .into()),
    }
}

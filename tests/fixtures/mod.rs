//! Test fixtures and store implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use castle_ranker::config::{AppConfig, StorageBackend};
use castle_ranker::error::{RankerError, Result};
use castle_ranker::metrics::MetricsCollector;
use castle_ranker::rating::{CharacterStore, EloConfig, InMemoryCharacterStore, RosterSnapshot};
use castle_ranker::roster::{RosterManager, RosterSettings, SeedCharacter};
use castle_ranker::types::{Character, CharacterId, MatchRecord};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory store that can be switched into a failing state
///
/// While failing, every operation returns a storage failure, the way an
/// unreachable database would.
#[derive(Default)]
pub struct FlakyCharacterStore {
    inner: InMemoryCharacterStore,
    failing: Arc<AtomicBool>,
    failures: Arc<AtomicUsize>,
}

impl FlakyCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared switch; `true` makes every call fail
    pub fn switch(&self) -> Arc<AtomicBool> {
        self.failing.clone()
    }

    /// Shared counter of rejected calls
    pub fn failure_counter(&self) -> Arc<AtomicUsize> {
        self.failures.clone()
    }

    fn check(&self, operation: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(RankerError::StorageFailure {
                message: format!("{} unavailable", operation),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl CharacterStore for FlakyCharacterStore {
    async fn load_character(&self, id: &str) -> Result<Option<Character>> {
        self.check("load_character")?;
        self.inner.load_character(id).await
    }

    async fn load_characters_by_faction(&self, faction: &str) -> Result<Vec<Character>> {
        self.check("load_characters_by_faction")?;
        self.inner.load_characters_by_faction(faction).await
    }

    async fn list_characters(&self) -> Result<Vec<Character>> {
        self.check("list_characters")?;
        self.inner.list_characters().await
    }

    async fn insert_character(&self, character: Character) -> Result<()> {
        self.check("insert_character")?;
        self.inner.insert_character(character).await
    }

    async fn persist_characters(&self, characters: Vec<Character>) -> Result<()> {
        self.check("persist_characters")?;
        self.inner.persist_characters(characters).await
    }

    async fn append_match_record(
        &self,
        id: &str,
        record: MatchRecord,
        limit: usize,
    ) -> Result<()> {
        self.check("append_match_record")?;
        self.inner.append_match_record(id, record, limit).await
    }

    async fn commit_match(
        &self,
        characters: Vec<Character>,
        records: Vec<(CharacterId, MatchRecord)>,
        limit: usize,
    ) -> Result<()> {
        self.check("commit_match")?;
        self.inner.commit_match(characters, records, limit).await
    }

    async fn remove_character(&self, id: &str) -> Result<bool> {
        self.check("remove_character")?;
        self.inner.remove_character(id).await
    }

    async fn faction_description(&self, faction: &str) -> Result<Option<String>> {
        self.check("faction_description")?;
        self.inner.faction_description(faction).await
    }

    async fn set_faction_description(&self, faction: &str, description: String) -> Result<()> {
        self.check("set_faction_description")?;
        self.inner.set_faction_description(faction, description).await
    }

    async fn clear(&self) -> Result<()> {
        self.check("clear")?;
        self.inner.clear().await
    }

    async fn count(&self) -> Result<usize> {
        self.check("count")?;
        self.inner.count().await
    }

    async fn export_snapshot(&self) -> Result<RosterSnapshot> {
        self.check("export_snapshot")?;
        self.inner.export_snapshot().await
    }
}

/// Roster manager over an empty in-memory store
pub fn create_manager() -> RosterManager {
    create_manager_with_store(Arc::new(InMemoryCharacterStore::new()))
}

pub fn create_manager_with_store(store: Arc<dyn CharacterStore>) -> RosterManager {
    RosterManager::new(
        store,
        EloConfig::default(),
        RosterSettings::default(),
        Arc::new(MetricsCollector::new().expect("Failed to create collector")),
    )
    .expect("Failed to create roster manager")
}

/// Roster manager preloaded with the bundled roster
pub async fn create_seeded_manager() -> RosterManager {
    let manager = create_manager();
    manager
        .seed_default_roster()
        .await
        .expect("Failed to seed roster");
    manager
}

/// Small roster with two factions used by the workflow tests
pub fn small_roster() -> Vec<SeedCharacter> {
    [
        ("ace", "Ace", "Red"),
        ("blade", "Blade", "Red"),
        ("cinder", "Cinder", "Blue"),
        ("dusk", "Dusk", "Blue"),
    ]
    .into_iter()
    .map(|(id, name, faction)| SeedCharacter {
        id: id.to_string(),
        name: name.to_string(),
        version: "Current".to_string(),
        faction: faction.to_string(),
        image_url: String::new(),
        description: String::new(),
        wiki_link: None,
    })
    .collect()
}

/// In-memory configuration without the bundled roster
pub fn memory_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::Memory;
    config.storage.seed_default_roster = false;
    config
}

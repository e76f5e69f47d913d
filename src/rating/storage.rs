//! Character storage interface and the in-memory implementation
//!
//! This module defines the interface for persisting and retrieving characters,
//! their bounded match histories, and faction descriptions. Rating state and
//! match history are written separately: persisting a character never replaces
//! its stored history, only `append_match_record` grows it.

use crate::error::{RankerError, Result};
use crate::rating::history::push_record;
use crate::types::{Character, CharacterId, MatchRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Trait for character storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Get a character by id
    async fn load_character(&self, id: &str) -> Result<Option<Character>>;

    /// Get every character of a faction (exact name match)
    async fn load_characters_by_faction(&self, faction: &str) -> Result<Vec<Character>>;

    /// Get all characters in insertion order
    async fn list_characters(&self) -> Result<Vec<Character>>;

    /// Add a new character; fails if the id is taken
    async fn insert_character(&self, character: Character) -> Result<()>;

    /// Upsert ratings, counters and profile fields; stored histories are kept
    async fn persist_characters(&self, characters: Vec<Character>) -> Result<()>;

    /// Prepend a match record to a character's history, capped at `limit`
    async fn append_match_record(&self, id: &str, record: MatchRecord, limit: usize)
        -> Result<()>;

    /// Persist the updated characters and append their match records as one write
    ///
    /// Every character must already be stored; otherwise nothing is written.
    async fn commit_match(
        &self,
        characters: Vec<Character>,
        records: Vec<(CharacterId, MatchRecord)>,
        limit: usize,
    ) -> Result<()>;

    /// Remove a character, returning whether it existed
    async fn remove_character(&self, id: &str) -> Result<bool>;

    /// Stored description of a faction, if one was ever set
    async fn faction_description(&self, faction: &str) -> Result<Option<String>>;

    async fn set_faction_description(&self, faction: &str, description: String) -> Result<()>;

    /// Drop every character and faction description
    async fn clear(&self) -> Result<()>;

    async fn count(&self) -> Result<usize>;

    /// Full copy of the stored roster and faction descriptions
    async fn export_snapshot(&self) -> Result<RosterSnapshot>;
}

/// Complete stored state, shared by the in-memory and file-backed stores
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub faction_descriptions: BTreeMap<String, String>,
}

impl RosterSnapshot {
    fn position(&self, id: &str) -> Option<usize> {
        self.characters.iter().position(|c| c.id == id)
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub(crate) fn by_faction(&self, faction: &str) -> Vec<Character> {
        self.characters
            .iter()
            .filter(|c| c.faction == faction)
            .cloned()
            .collect()
    }

    pub(crate) fn insert(&mut self, character: Character) -> Result<()> {
        if self.position(&character.id).is_some() {
            return Err(RankerError::DuplicateCharacter { id: character.id }.into());
        }

        self.characters.push(character);
        Ok(())
    }

    pub(crate) fn persist(&mut self, characters: Vec<Character>) {
        for character in characters {
            match self.position(&character.id) {
                Some(index) => {
                    let existing = &mut self.characters[index];
                    let history = std::mem::take(&mut existing.match_history);
                    *existing = character;
                    existing.match_history = history;
                }
                None => self.characters.push(character),
            }
        }
    }

    pub(crate) fn append(&mut self, id: &str, record: MatchRecord, limit: usize) -> Result<()> {
        let index = self
            .position(id)
            .ok_or_else(|| RankerError::CharacterNotFound { id: id.to_string() })?;

        push_record(&mut self.characters[index].match_history, record, limit);
        Ok(())
    }

    pub(crate) fn commit_match(
        &mut self,
        characters: Vec<Character>,
        records: Vec<(CharacterId, MatchRecord)>,
        limit: usize,
    ) -> Result<()> {
        let ids = characters.iter().map(|c| &c.id).chain(records.iter().map(|(id, _)| id));
        for id in ids {
            if self.position(id).is_none() {
                return Err(RankerError::CharacterNotFound { id: id.clone() }.into());
            }
        }

        self.persist(characters);
        for (id, record) in records {
            self.append(&id, record, limit)?;
        }
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.characters.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.characters.clear();
        self.faction_descriptions.clear();
    }
}

/// In-memory character storage implementation
#[derive(Debug, Default)]
pub struct InMemoryCharacterStore {
    state: RwLock<RosterSnapshot>,
}

impl InMemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot
    pub fn from_snapshot(snapshot: RosterSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Copy of the full stored state
    pub async fn snapshot(&self) -> RosterSnapshot {
        self.state.read().await.clone()
    }

    /// Ids currently stored, in insertion order
    pub async fn ids(&self) -> Vec<CharacterId> {
        self.state
            .read()
            .await
            .characters
            .iter()
            .map(|c| c.id.clone())
            .collect()
    }
}

#[async_trait]
impl CharacterStore for InMemoryCharacterStore {
    async fn load_character(&self, id: &str) -> Result<Option<Character>> {
        Ok(self.state.read().await.get(id).cloned())
    }

    async fn load_characters_by_faction(&self, faction: &str) -> Result<Vec<Character>> {
        Ok(self.state.read().await.by_faction(faction))
    }

    async fn list_characters(&self) -> Result<Vec<Character>> {
        Ok(self.state.read().await.characters.clone())
    }

    async fn insert_character(&self, character: Character) -> Result<()> {
        self.state.write().await.insert(character)
    }

    async fn persist_characters(&self, characters: Vec<Character>) -> Result<()> {
        self.state.write().await.persist(characters);
        Ok(())
    }

    async fn append_match_record(
        &self,
        id: &str,
        record: MatchRecord,
        limit: usize,
    ) -> Result<()> {
        self.state.write().await.append(id, record, limit)
    }

    async fn commit_match(
        &self,
        characters: Vec<Character>,
        records: Vec<(CharacterId, MatchRecord)>,
        limit: usize,
    ) -> Result<()> {
        self.state
            .write()
            .await
            .commit_match(characters, records, limit)
    }

    async fn remove_character(&self, id: &str) -> Result<bool> {
        Ok(self.state.write().await.remove(id))
    }

    async fn faction_description(&self, faction: &str) -> Result<Option<String>> {
        Ok(self
            .state
            .read()
            .await
            .faction_descriptions
            .get(faction)
            .cloned())
    }

    async fn set_faction_description(&self, faction: &str, description: String) -> Result<()> {
        self.state
            .write()
            .await
            .faction_descriptions
            .insert(faction.to_string(), description);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.state.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.characters.len())
    }

    async fn export_snapshot(&self) -> Result<RosterSnapshot> {
        Ok(self.snapshot().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CharacterProfile, MatchOutcome, StatCategory};
    use chrono::Utc;

    fn character(id: &str, faction: &str) -> Character {
        Character::from_profile(
            id.to_string(),
            CharacterProfile {
                name: id.to_string(),
                version: "Current".to_string(),
                faction: faction.to_string(),
                ..Default::default()
            },
            1200,
        )
    }

    fn record(opponent: &str) -> MatchRecord {
        MatchRecord {
            opponent_id: opponent.to_string(),
            opponent_name: opponent.to_string(),
            outcome: MatchOutcome::Win,
            rating_change: 16,
            timestamp: Utc::now(),
            scenario_description: None,
        }
    }

    #[tokio::test]
    async fn test_in_memory_basic_operations() {
        let store = InMemoryCharacterStore::new();

        assert!(store.load_character("gustav").await.unwrap().is_none());

        store
            .insert_character(character("gustav", "Iskra"))
            .await
            .unwrap();

        let loaded = store.load_character("gustav").await.unwrap().unwrap();
        assert_eq!(loaded.faction, "Iskra");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryCharacterStore::new();
        store.insert_character(character("a", "Other")).await.unwrap();

        let err = store
            .insert_character(character("a", "Other"))
            .await
            .unwrap_err();
        assert!(matches!(
            RankerError::find(&err),
            Some(RankerError::DuplicateCharacter { .. })
        ));
    }

    #[tokio::test]
    async fn test_persist_keeps_stored_history() {
        let store = InMemoryCharacterStore::new();
        store.insert_character(character("a", "Other")).await.unwrap();
        store
            .append_match_record("a", record("b"), 20)
            .await
            .unwrap();

        let mut updated = character("a", "Other");
        updated.ratings.set(StatCategory::Overall, 1216);
        updated.wins = 1;
        store.persist_characters(vec![updated]).await.unwrap();

        let loaded = store.load_character("a").await.unwrap().unwrap();
        assert_eq!(loaded.overall_rating(), 1216);
        assert_eq!(loaded.wins, 1);
        assert_eq!(loaded.match_history.len(), 1);
    }

    #[tokio::test]
    async fn test_append_caps_history() {
        let store = InMemoryCharacterStore::new();
        store.insert_character(character("a", "Other")).await.unwrap();

        for i in 0..25 {
            store
                .append_match_record("a", record(&format!("op{i}")), 20)
                .await
                .unwrap();
        }

        let loaded = store.load_character("a").await.unwrap().unwrap();
        assert_eq!(loaded.match_history.len(), 20);
        assert_eq!(loaded.match_history[0].opponent_id, "op24");
    }

    #[tokio::test]
    async fn test_commit_match_is_all_or_nothing() {
        let store = InMemoryCharacterStore::new();
        store.insert_character(character("a", "Other")).await.unwrap();
        store.insert_character(character("b", "Other")).await.unwrap();

        let mut a = character("a", "Other");
        a.ratings.set(StatCategory::Overall, 1216);
        a.wins = 1;

        let err = store
            .commit_match(
                vec![a.clone()],
                vec![("a".to_string(), record("b")), ("ghost".to_string(), record("a"))],
                20,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            RankerError::find(&err),
            Some(RankerError::CharacterNotFound { id }) if id == "ghost"
        ));
        let untouched = store.load_character("a").await.unwrap().unwrap();
        assert_eq!(untouched.overall_rating(), 1200);
        assert!(untouched.match_history.is_empty());

        store
            .commit_match(vec![a], vec![("a".to_string(), record("b"))], 20)
            .await
            .unwrap();
        let loaded = store.load_character("a").await.unwrap().unwrap();
        assert_eq!(loaded.overall_rating(), 1216);
        assert_eq!(loaded.wins as usize, loaded.match_history.len());
    }

    #[tokio::test]
    async fn test_append_to_missing_character() {
        let store = InMemoryCharacterStore::new();
        assert!(store.append_match_record("ghost", record("a"), 20).await.is_err());
    }

    #[tokio::test]
    async fn test_faction_queries_and_removal() {
        let store = InMemoryCharacterStore::new();
        store.insert_character(character("a", "Iskra")).await.unwrap();
        store.insert_character(character("b", "Iskra")).await.unwrap();
        store.insert_character(character("c", "Hwajin")).await.unwrap();

        assert_eq!(store.load_characters_by_faction("Iskra").await.unwrap().len(), 2);

        assert!(store.remove_character("a").await.unwrap());
        assert!(!store.remove_character("a").await.unwrap());
        assert_eq!(store.ids().await, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_faction_descriptions_and_clear() {
        let store = InMemoryCharacterStore::new();
        store.insert_character(character("a", "Iskra")).await.unwrap();
        assert!(store.faction_description("Iskra").await.unwrap().is_none());

        store
            .set_faction_description("Iskra", "Mercenary outfit".to_string())
            .await
            .unwrap();
        assert_eq!(
            store.faction_description("Iskra").await.unwrap().as_deref(),
            Some("Mercenary outfit")
        );

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.faction_description("Iskra").await.unwrap().is_none());
    }
}

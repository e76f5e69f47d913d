//! Primary store with a local cache to degrade to
//!
//! Reads try the primary store first and fall back to the cache on failure.
//! Writes go to the primary and are mirrored into the cache, so the cache
//! holds everything written through this store even while the primary is down.
//! Domain errors (unknown or duplicate ids) are returned as-is and never
//! trigger a fallback.

use crate::error::{RankerError, Result};
use crate::metrics::MetricsCollector;
use crate::rating::storage::{CharacterStore, RosterSnapshot};
use crate::types::{Character, CharacterId, MatchRecord};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Store preferring `primary`, degrading to `cache` on storage failures
pub struct FallbackCharacterStore<P, C> {
    primary: P,
    cache: C,
    metrics_collector: Option<Arc<MetricsCollector>>,
}

impl<P: CharacterStore, C: CharacterStore> FallbackCharacterStore<P, C> {
    pub fn new(primary: P, cache: C) -> Self {
        Self {
            primary,
            cache,
            metrics_collector: None,
        }
    }

    /// Count fallbacks in the given collector
    pub fn with_metrics(mut self, metrics_collector: Arc<MetricsCollector>) -> Self {
        self.metrics_collector = Some(metrics_collector);
        self
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Replace the cache contents with everything the primary holds
    pub async fn warm(&self) -> Result<usize> {
        let characters = self.primary.list_characters().await?;
        let count = characters.len();

        self.cache.clear().await?;
        for character in characters {
            self.cache.insert_character(character).await?;
        }

        info!("Warmed local roster cache with {} characters", count);
        Ok(count)
    }

    /// Decide whether a primary error may be served from the cache
    fn degrade(&self, operation: &str, error: anyhow::Error) -> Result<()> {
        match RankerError::find(&error) {
            Some(RankerError::StorageFailure { .. }) | None => {
                warn!(
                    "Primary store failed on {}, using local cache: {}",
                    operation, error
                );
                if let Some(metrics) = &self.metrics_collector {
                    metrics.record_storage_fallback(operation);
                }
                Ok(())
            }
            Some(_) => Err(error),
        }
    }

    fn mirror<T>(&self, operation: &str, result: Result<T>) {
        if let Err(e) = result {
            debug!("Local cache mirror failed on {}: {}", operation, e);
        }
    }
}

#[async_trait]
impl<P: CharacterStore, C: CharacterStore> CharacterStore for FallbackCharacterStore<P, C> {
    async fn load_character(&self, id: &str) -> Result<Option<Character>> {
        match self.primary.load_character(id).await {
            Ok(character) => Ok(character),
            Err(e) => {
                self.degrade("load_character", e)?;
                self.cache.load_character(id).await
            }
        }
    }

    async fn load_characters_by_faction(&self, faction: &str) -> Result<Vec<Character>> {
        match self.primary.load_characters_by_faction(faction).await {
            Ok(characters) => Ok(characters),
            Err(e) => {
                self.degrade("load_characters_by_faction", e)?;
                self.cache.load_characters_by_faction(faction).await
            }
        }
    }

    async fn list_characters(&self) -> Result<Vec<Character>> {
        match self.primary.list_characters().await {
            Ok(characters) => Ok(characters),
            Err(e) => {
                self.degrade("list_characters", e)?;
                self.cache.list_characters().await
            }
        }
    }

    async fn insert_character(&self, character: Character) -> Result<()> {
        match self.primary.insert_character(character.clone()).await {
            Ok(()) => {
                self.mirror(
                    "insert_character",
                    self.cache.insert_character(character).await,
                );
                Ok(())
            }
            Err(e) => {
                self.degrade("insert_character", e)?;
                self.cache.insert_character(character).await
            }
        }
    }

    async fn persist_characters(&self, characters: Vec<Character>) -> Result<()> {
        match self.primary.persist_characters(characters.clone()).await {
            Ok(()) => {
                self.mirror(
                    "persist_characters",
                    self.cache.persist_characters(characters).await,
                );
                Ok(())
            }
            Err(e) => {
                self.degrade("persist_characters", e)?;
                self.cache.persist_characters(characters).await
            }
        }
    }

    async fn append_match_record(
        &self,
        id: &str,
        record: MatchRecord,
        limit: usize,
    ) -> Result<()> {
        match self
            .primary
            .append_match_record(id, record.clone(), limit)
            .await
        {
            Ok(()) => {
                self.mirror(
                    "append_match_record",
                    self.cache.append_match_record(id, record, limit).await,
                );
                Ok(())
            }
            Err(e) => {
                self.degrade("append_match_record", e)?;
                self.cache.append_match_record(id, record, limit).await
            }
        }
    }

    async fn commit_match(
        &self,
        characters: Vec<Character>,
        records: Vec<(CharacterId, MatchRecord)>,
        limit: usize,
    ) -> Result<()> {
        match self
            .primary
            .commit_match(characters.clone(), records.clone(), limit)
            .await
        {
            Ok(()) => {
                self.mirror(
                    "commit_match",
                    self.cache.commit_match(characters, records, limit).await,
                );
                Ok(())
            }
            Err(e) => {
                self.degrade("commit_match", e)?;
                self.cache.commit_match(characters, records, limit).await
            }
        }
    }

    async fn remove_character(&self, id: &str) -> Result<bool> {
        match self.primary.remove_character(id).await {
            Ok(removed) => {
                self.mirror("remove_character", self.cache.remove_character(id).await);
                Ok(removed)
            }
            Err(e) => {
                self.degrade("remove_character", e)?;
                self.cache.remove_character(id).await
            }
        }
    }

    async fn faction_description(&self, faction: &str) -> Result<Option<String>> {
        match self.primary.faction_description(faction).await {
            Ok(description) => Ok(description),
            Err(e) => {
                self.degrade("faction_description", e)?;
                self.cache.faction_description(faction).await
            }
        }
    }

    async fn set_faction_description(&self, faction: &str, description: String) -> Result<()> {
        match self
            .primary
            .set_faction_description(faction, description.clone())
            .await
        {
            Ok(()) => {
                self.mirror(
                    "set_faction_description",
                    self.cache.set_faction_description(faction, description).await,
                );
                Ok(())
            }
            Err(e) => {
                self.degrade("set_faction_description", e)?;
                self.cache.set_faction_description(faction, description).await
            }
        }
    }

    async fn clear(&self) -> Result<()> {
        let primary = self.primary.clear().await;
        let cache = self.cache.clear().await;

        match primary {
            Ok(()) => {
                self.mirror("clear", cache);
                Ok(())
            }
            Err(e) => {
                self.degrade("clear", e)?;
                cache
            }
        }
    }

    async fn count(&self) -> Result<usize> {
        match self.primary.count().await {
            Ok(count) => Ok(count),
            Err(e) => {
                self.degrade("count", e)?;
                self.cache.count().await
            }
        }
    }

    async fn export_snapshot(&self) -> Result<RosterSnapshot> {
        match self.primary.export_snapshot().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                self.degrade("export_snapshot", e)?;
                self.cache.export_snapshot().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::storage::{InMemoryCharacterStore, MockCharacterStore};
    use crate::types::CharacterProfile;

    fn character(id: &str) -> Character {
        Character::from_profile(
            id.to_string(),
            CharacterProfile {
                name: id.to_string(),
                version: "Current".to_string(),
                faction: "Other".to_string(),
                ..Default::default()
            },
            1200,
        )
    }

    fn offline() -> anyhow::Error {
        RankerError::StorageFailure {
            message: "primary offline".to_string(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_writes_mirror_into_cache() {
        let store =
            FallbackCharacterStore::new(InMemoryCharacterStore::new(), InMemoryCharacterStore::new());

        store.insert_character(character("a")).await.unwrap();

        assert_eq!(store.primary().count().await.unwrap(), 1);
        assert_eq!(store.cache().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reads_degrade_to_cache() {
        let cache = InMemoryCharacterStore::new();
        cache.insert_character(character("a")).await.unwrap();

        let mut primary = MockCharacterStore::new();
        primary
            .expect_load_character()
            .returning(|_| Err(offline()));
        primary.expect_count().returning(|| Err(offline()));

        let metrics = Arc::new(MetricsCollector::new().unwrap());
        let store = FallbackCharacterStore::new(primary, cache).with_metrics(metrics.clone());

        let loaded = store.load_character("a").await.unwrap();
        assert_eq!(loaded.map(|c| c.id), Some("a".to_string()));
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(
            metrics
                .storage()
                .fallbacks_total
                .with_label_values(&["load_character"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_writes_land_in_cache_when_primary_fails() {
        let mut primary = MockCharacterStore::new();
        primary
            .expect_insert_character()
            .times(1)
            .returning(|_| Err(offline()));

        let store = FallbackCharacterStore::new(primary, InMemoryCharacterStore::new());

        store.insert_character(character("a")).await.unwrap();
        assert_eq!(store.cache().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_match_commit_lands_in_cache_when_primary_fails() {
        let cache = InMemoryCharacterStore::new();
        cache.insert_character(character("a")).await.unwrap();

        let mut primary = MockCharacterStore::new();
        primary
            .expect_commit_match()
            .times(1)
            .returning(|_, _, _| Err(offline()));
        primary
            .expect_export_snapshot()
            .returning(|| Err(offline()));

        let store = FallbackCharacterStore::new(primary, cache);

        let mut a = character("a");
        a.wins = 1;
        store.commit_match(vec![a], Vec::new(), 20).await.unwrap();

        let snapshot = store.export_snapshot().await.unwrap();
        assert_eq!(snapshot.characters.len(), 1);
        assert_eq!(snapshot.characters[0].wins, 1);
    }

    #[tokio::test]
    async fn test_domain_errors_do_not_fall_back() {
        let mut primary = MockCharacterStore::new();
        primary.expect_insert_character().returning(|c| {
            Err(RankerError::DuplicateCharacter { id: c.id }.into())
        });

        let store = FallbackCharacterStore::new(primary, InMemoryCharacterStore::new());

        let err = store.insert_character(character("a")).await.unwrap_err();
        assert!(matches!(
            RankerError::find(&err),
            Some(RankerError::DuplicateCharacter { .. })
        ));
        assert_eq!(store.cache().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_warm_copies_primary() {
        let primary = InMemoryCharacterStore::new();
        primary.insert_character(character("a")).await.unwrap();
        primary.insert_character(character("b")).await.unwrap();

        let cache = InMemoryCharacterStore::new();
        cache.insert_character(character("stale")).await.unwrap();

        let store = FallbackCharacterStore::new(primary, cache);
        assert_eq!(store.warm().await.unwrap(), 2);
        assert_eq!(
            store.cache().ids().await,
            vec!["a".to_string(), "b".to_string()]
        );
    }
}

//! JSON file backed character storage
//!
//! The whole roster lives in memory and is written back to disk after every
//! mutation. Each mutation is applied to a copy of the snapshot, and the copy
//! replaces the served state only once it is on disk. Writes go to a sibling
//! `.tmp` file which is then renamed over the target, so a crash mid-write
//! leaves the previous snapshot intact.

use crate::error::{RankerError, Result};
use crate::rating::storage::{CharacterStore, RosterSnapshot};
use crate::types::{Character, CharacterId, MatchRecord};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Character storage persisted as a pretty-printed JSON snapshot
#[derive(Debug)]
pub struct JsonFileCharacterStore {
    path: PathBuf,
    state: RwLock<RosterSnapshot>,
}

impl JsonFileCharacterStore {
    /// Open a store at `path`, loading the snapshot if the file exists
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let snapshot = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str::<RosterSnapshot>(&contents)
                .with_context(|| format!("Failed to parse roster file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Roster file {} not found, starting empty", path.display());
                RosterSnapshot::default()
            }
            Err(e) => {
                return Err(RankerError::StorageFailure {
                    message: format!("Failed to read {}: {}", path.display(), e),
                }
                .into())
            }
        };

        info!(
            "Opened roster file {} with {} characters",
            path.display(),
            snapshot.characters.len()
        );

        Ok(Self {
            path,
            state: RwLock::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the state and swap it in after it is saved
    async fn commit<T: Send>(
        &self,
        change: impl FnOnce(&mut RosterSnapshot) -> Result<T> + Send,
    ) -> Result<T> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let value = change(&mut next)?;
        self.save(&next).await?;
        *state = next;
        Ok(value)
    }

    async fn save(&self, snapshot: &RosterSnapshot) -> Result<()> {
        let contents = serde_json::to_string_pretty(snapshot)?;
        let temp_path = self.path.with_extension("json.tmp");

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| storage_failure(&self.path, e))?;
            }
        }

        tokio::fs::write(&temp_path, contents)
            .await
            .map_err(|e| storage_failure(&temp_path, e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| storage_failure(&self.path, e))?;

        debug!(
            "Saved {} characters to {}",
            snapshot.characters.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn storage_failure(path: &Path, e: std::io::Error) -> anyhow::Error {
    RankerError::StorageFailure {
        message: format!("Failed to write {}: {}", path.display(), e),
    }
    .into()
}

#[async_trait]
impl CharacterStore for JsonFileCharacterStore {
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
        self.commit(|state| state.insert(character)).await
    }

    async fn persist_characters(&self, characters: Vec<Character>) -> Result<()> {
        self.commit(|state| {
            state.persist(characters);
            Ok(())
        })
        .await
    }

    async fn append_match_record(
        &self,
        id: &str,
        record: MatchRecord,
        limit: usize,
    ) -> Result<()> {
        self.commit(|state| state.append(id, record, limit)).await
    }

    async fn commit_match(
        &self,
        characters: Vec<Character>,
        records: Vec<(CharacterId, MatchRecord)>,
        limit: usize,
    ) -> Result<()> {
        self.commit(|state| state.commit_match(characters, records, limit))
            .await
    }

    async fn remove_character(&self, id: &str) -> Result<bool> {
        if self.state.read().await.get(id).is_none() {
            return Ok(false);
        }
        self.commit(|state| Ok(state.remove(id))).await
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
        self.commit(|state| {
            state
                .faction_descriptions
                .insert(faction.to_string(), description);
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.commit(|state| {
            state.clear();
            Ok(())
        })
        .await
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.characters.len())
    }

    async fn export_snapshot(&self) -> Result<RosterSnapshot> {
        Ok(self.state.read().await.clone())
    }
}

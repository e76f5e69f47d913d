//! Bundled default roster
//!
//! The roster ships inside the binary as TOML and is loaded into an empty
//! store on first start.

use crate::error::{RankerError, Result};
use crate::types::{CharacterId, CharacterProfile};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_ROSTER: &str = include_str!("../../data/default_roster.toml");

/// One character entry of a roster file
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCharacter {
    pub id: CharacterId,
    pub name: String,
    pub version: String,
    pub faction: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub wiki_link: Option<String>,
}

impl SeedCharacter {
    /// Split into the id and the descriptive fields
    pub fn into_parts(self) -> (CharacterId, CharacterProfile) {
        (
            self.id,
            CharacterProfile {
                name: self.name,
                version: self.version,
                faction: self.faction,
                image_url: self.image_url,
                description: self.description,
                wiki_link: self.wiki_link,
            },
        )
    }
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    characters: Vec<SeedCharacter>,
}

/// Parse roster TOML
pub fn parse_roster(contents: &str) -> Result<Vec<SeedCharacter>> {
    let file: RosterFile = toml::from_str(contents).map_err(|e| RankerError::ConfigurationError {
        message: format!("Invalid roster file: {}", e),
    })?;

    Ok(file.characters)
}

/// The roster bundled with the service
pub fn default_roster() -> Result<Vec<SeedCharacter>> {
    parse_roster(DEFAULT_ROSTER)
}

/// Load a roster from a TOML file on disk
pub async fn load_roster_file(path: impl AsRef<Path>) -> Result<Vec<SeedCharacter>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        RankerError::ConfigurationError {
            message: format!("Failed to read roster file {}: {}", path.display(), e),
        }
    })?;

    parse_roster(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_roster_parses() {
        let roster = default_roster().unwrap();
        assert_eq!(roster.len(), 38);

        let ids: HashSet<_> = roster.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), roster.len(), "roster ids must be unique");

        for entry in &roster {
            assert!(!entry.name.is_empty());
            assert!(!entry.version.is_empty());
            assert!(!entry.faction.is_empty());
        }
    }

    #[test]
    fn test_default_roster_contains_reserved_characters() {
        let roster = default_roster().unwrap();
        for id in ["lisa", "oijin", "riwon-lee", "marina"] {
            assert!(roster.iter().any(|c| c.id == id), "missing {}", id);
        }
    }

    #[test]
    fn test_kim_shin_has_two_versions() {
        let roster = default_roster().unwrap();
        let versions: Vec<_> = roster
            .iter()
            .filter(|c| c.name == "Kim Shin")
            .map(|c| c.version.as_str())
            .collect();
        assert_eq!(versions, vec!["Current", "Peak (Amur)"]);
    }

    #[test]
    fn test_parse_roster_defaults() {
        let roster = parse_roster(
            r#"
            [[characters]]
            id = "x"
            name = "X"
            version = "Current"
            faction = "Other"
            "#,
        )
        .unwrap();

        let (id, profile) = roster.into_iter().next().unwrap().into_parts();
        assert_eq!(id, "x");
        assert!(profile.image_url.is_empty());
        assert!(profile.wiki_link.is_none());

        assert!(parse_roster("characters = 5").is_err());
        assert!(parse_roster("").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_roster_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.toml");
        tokio::fs::write(&path, DEFAULT_ROSTER).await.unwrap();

        assert_eq!(load_roster_file(&path).await.unwrap().len(), 38);
        assert!(load_roster_file(dir.path().join("missing.toml"))
            .await
            .is_err());
    }
}

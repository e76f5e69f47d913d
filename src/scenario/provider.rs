//! Scenario provider traits and implementations
//!
//! A provider exposes the scenario catalog and turns location, weapon and
//! format choices into an `ActiveScenario`. Any choice left empty or set to
//! `"random"` is drawn uniformly from its catalog.

use crate::error::{RankerError, Result};
use crate::scenario::catalog::{self, ScenarioTag, TagKind};
use crate::types::StatCategory;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::BTreeSet;

/// Choice value meaning "draw one at random"
pub const RANDOM_CHOICE: &str = "random";

/// A fully resolved fight scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveScenario {
    pub location: ScenarioTag,
    pub weapon: ScenarioTag,
    pub format: ScenarioTag,
    /// Categories updated by a vote under this scenario, `Overall` excluded
    pub affected_categories: BTreeSet<StatCategory>,
    /// Human readable summary stored on match records
    pub description: String,
}

impl ActiveScenario {
    fn new(location: ScenarioTag, weapon: ScenarioTag, format: ScenarioTag) -> Self {
        let affected_categories =
            catalog::resolve_affected_categories([location.id, weapon.id, format.id]);
        let description = format!("{} · {} · {}", location.name, weapon.name, format.name);

        Self {
            location,
            weapon,
            format,
            affected_categories,
            description,
        }
    }

    pub fn tag_ids(&self) -> [&'static str; 3] {
        [self.location.id, self.weapon.id, self.format.id]
    }
}

/// Trait for providing the scenario catalog and building scenarios
pub trait ScenarioProvider: Send + Sync {
    /// Tags of one kind, in catalog order
    fn tags(&self, kind: TagKind) -> &[ScenarioTag];

    /// Categories a single tag stresses
    fn categories_for(&self, tag: &str) -> Vec<StatCategory>;

    /// Union of the categories of all tags
    fn resolve(&self, tags: &[String]) -> BTreeSet<StatCategory>;

    /// Build a scenario; `None` or `"random"` picks at random
    fn build_scenario(
        &self,
        location: Option<&str>,
        weapon: Option<&str>,
        format: Option<&str>,
    ) -> Result<ActiveScenario>;

    fn locations(&self) -> &[ScenarioTag] {
        self.tags(TagKind::Location)
    }

    fn weapons(&self) -> &[ScenarioTag] {
        self.tags(TagKind::Weapon)
    }

    fn formats(&self) -> &[ScenarioTag] {
        self.tags(TagKind::Format)
    }

    /// Fully random scenario
    fn random_scenario(&self) -> Result<ActiveScenario> {
        self.build_scenario(None, None, None)
    }
}

/// Scenario provider backed by the static catalog
#[derive(Debug, Clone)]
pub struct StaticScenarioProvider {
    locations: &'static [ScenarioTag],
    weapons: &'static [ScenarioTag],
    formats: &'static [ScenarioTag],
}

impl StaticScenarioProvider {
    /// Create a provider over the full built-in catalog
    pub fn new() -> Self {
        Self {
            locations: catalog::LOCATIONS,
            weapons: catalog::WEAPONS,
            formats: catalog::FORMATS,
        }
    }

    /// Create with a restricted catalog
    pub fn with_catalog(
        locations: &'static [ScenarioTag],
        weapons: &'static [ScenarioTag],
        formats: &'static [ScenarioTag],
    ) -> Result<Self> {
        for (kind, tags) in [
            (TagKind::Location, locations),
            (TagKind::Weapon, weapons),
            (TagKind::Format, formats),
        ] {
            if tags.is_empty() {
                return Err(RankerError::ConfigurationError {
                    message: format!("Scenario catalog has no {} tags", kind),
                }
                .into());
            }
        }

        Ok(Self {
            locations,
            weapons,
            formats,
        })
    }

    fn pick(&self, kind: TagKind, choice: Option<&str>) -> Result<ScenarioTag> {
        let tags = self.tags(kind);

        match choice {
            None | Some(RANDOM_CHOICE) => tags.choose(&mut rand::thread_rng()).copied().ok_or_else(
                || {
                    RankerError::InternalError {
                        message: format!("Scenario catalog has no {} tags", kind),
                    }
                    .into()
                },
            ),
            Some(id) => tags.iter().find(|tag| tag.id == id).copied().ok_or_else(|| {
                RankerError::UnknownScenarioTag {
                    tag: id.to_string(),
                }
                .into()
            }),
        }
    }
}

impl Default for StaticScenarioProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioProvider for StaticScenarioProvider {
    fn tags(&self, kind: TagKind) -> &[ScenarioTag] {
        match kind {
            TagKind::Location => self.locations,
            TagKind::Weapon => self.weapons,
            TagKind::Format => self.formats,
        }
    }

    fn categories_for(&self, tag: &str) -> Vec<StatCategory> {
        catalog::categories_for(tag).to_vec()
    }

    fn resolve(&self, tags: &[String]) -> BTreeSet<StatCategory> {
        catalog::resolve_affected_categories(tags)
    }

    fn build_scenario(
        &self,
        location: Option<&str>,
        weapon: Option<&str>,
        format: Option<&str>,
    ) -> Result<ActiveScenario> {
        let location = self.pick(TagKind::Location, location)?;
        let weapon = self.pick(TagKind::Weapon, weapon)?;
        let format = self.pick(TagKind::Format, format)?;

        Ok(ActiveScenario::new(location, weapon, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatCategory::*;

    const ONE_LOCATION: &[ScenarioTag] = &[ScenarioTag {
        id: "rooftop",
        name: "Rooftop (Rain)",
        categories: &[HandToHand, Speed],
    }];

    #[test]
    fn test_explicit_scenario() {
        let provider = StaticScenarioProvider::new();
        let scenario = provider
            .build_scenario(Some("forest"), Some("no_weapons"), Some("1v1"))
            .unwrap();

        assert_eq!(
            scenario.description,
            "Dense Forest · No Weapons (Fists Only) · 1 vs 1 Duel"
        );
        assert_eq!(scenario.tag_ids(), ["forest", "no_weapons", "1v1"]);
        assert_eq!(
            scenario.affected_categories,
            [Assassination, BattleIq, HandToHand, Durability]
                .into_iter()
                .collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn test_random_choices_come_from_catalog() {
        let provider = StaticScenarioProvider::new();

        for _ in 0..50 {
            let scenario = provider
                .build_scenario(Some("random"), None, Some("sniper_duel"))
                .unwrap();
            assert!(catalog::find_tag(TagKind::Location, scenario.location.id).is_some());
            assert!(catalog::find_tag(TagKind::Weapon, scenario.weapon.id).is_some());
            assert_eq!(scenario.format.id, "sniper_duel");
            assert!(scenario.affected_categories.contains(&Firearms));
        }
    }

    #[test]
    fn test_unknown_explicit_choice_is_rejected() {
        let provider = StaticScenarioProvider::new();
        let err = provider
            .build_scenario(Some("moon_base"), None, None)
            .unwrap_err();

        assert!(matches!(
            RankerError::find(&err),
            Some(RankerError::UnknownScenarioTag { tag }) if tag == "moon_base"
        ));
    }

    #[test]
    fn test_choice_must_match_its_kind() {
        let provider = StaticScenarioProvider::new();
        assert!(provider
            .build_scenario(Some("sniper_duel"), None, None)
            .is_err());
    }

    #[test]
    fn test_restricted_catalog() {
        let provider =
            StaticScenarioProvider::with_catalog(ONE_LOCATION, catalog::WEAPONS, catalog::FORMATS)
                .unwrap();

        let scenario = provider.random_scenario().unwrap();
        assert_eq!(scenario.location.id, "rooftop");
        assert_eq!(provider.locations().len(), 1);

        assert!(
            StaticScenarioProvider::with_catalog(&[], catalog::WEAPONS, catalog::FORMATS).is_err()
        );
    }

    #[test]
    fn test_resolve_through_provider() {
        let provider = StaticScenarioProvider::new();
        let tags = vec!["full_arsenal".to_string(), "protect_vip".to_string()];

        assert_eq!(
            provider.resolve(&tags),
            [BattleIq, Firearms, BladedWeapons, Durability]
                .into_iter()
                .collect::<BTreeSet<_>>()
        );
        assert_eq!(provider.categories_for("with_minions"), vec![BattleIq]);
        assert!(provider.categories_for("unknown").is_empty());
    }
}

//! Fight scenarios: the static catalog, category resolution and scenario providers

pub mod catalog;
pub mod provider;

pub use catalog::{
    categories_for, find_tag, resolve_affected_categories, ScenarioTag, TagKind, FORMATS,
    LOCATIONS, WEAPONS,
};
pub use provider::{ActiveScenario, ScenarioProvider, StaticScenarioProvider, RANDOM_CHOICE};

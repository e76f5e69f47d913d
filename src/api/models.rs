//! Request and response bodies of the HTTP API

use crate::scenario::ScenarioTag;
use crate::types::StatCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    /// snake_case category id, `overall` when absent
    pub category: Option<String>,
    /// Case-insensitive name filter
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RosterParams {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetParams {
    /// Load the bundled roster again after wiping
    #[serde(default)]
    pub reseed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionRequest {
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FactionDescriptionRequest {
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub affected_categories: BTreeSet<StatCategory>,
}

#[derive(Debug, Serialize)]
pub struct ScenarioCatalog {
    pub locations: Vec<ScenarioTag>,
    pub weapons: Vec<ScenarioTag>,
    pub formats: Vec<ScenarioTag>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub seeded: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

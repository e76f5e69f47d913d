//! Request handlers for the roster API

use crate::api::error::ApiError;
use crate::api::models::*;
use crate::roster::{CharacterDraft, VoteRequest};
use crate::scenario::TagKind;
use crate::service::AppState;
use crate::types::{ProfileUpdate, StatCategory};
use crate::utils::current_timestamp;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

type ApiResult<T> = Result<T, ApiError>;

pub async fn list_characters(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let characters = state.roster_manager().list_characters().await?;
    Ok(Json(characters))
}

pub async fn create_character(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<CharacterDraft>,
) -> ApiResult<impl IntoResponse> {
    let character = state.roster_manager().add_character(draft).await?;
    Ok((StatusCode::CREATED, Json(character)))
}

pub async fn get_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let character = state.roster_manager().get_character(&id).await?;
    Ok(Json(character))
}

pub async fn update_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<impl IntoResponse> {
    let character = state.roster_manager().update_profile(&id, update).await?;
    Ok(Json(character))
}

pub async fn delete_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.roster_manager().delete_character(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_version(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<VersionRequest>,
) -> ApiResult<impl IntoResponse> {
    let character = state
        .roster_manager()
        .create_version(&id, &request.version)
        .await?;
    Ok((StatusCode::CREATED, Json(character)))
}

pub async fn list_versions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let versions = state.roster_manager().versions_of(&id).await?;
    Ok(Json(versions))
}

pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<impl IntoResponse> {
    let category = match params.category.as_deref() {
        None | Some("") => StatCategory::Overall,
        Some(value) => StatCategory::parse(value)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown category: {}", value)))?,
    };

    let leaderboard = state
        .roster_manager()
        .leaderboard(category, params.filter.as_deref())
        .await?;
    Ok(Json(leaderboard))
}

pub async fn get_tiers(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let tiers = state.roster_manager().tier_list().await?;
    Ok(Json(tiers))
}

pub async fn get_roster(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RosterParams>,
) -> ApiResult<impl IntoResponse> {
    let roster = state
        .roster_manager()
        .roster_view(params.search.as_deref())
        .await?;
    Ok(Json(roster))
}

pub async fn list_factions(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let factions = state.roster_manager().factions().await?;
    Ok(Json(factions))
}

pub async fn get_faction(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let detail = state.roster_manager().faction_detail(&name).await?;
    Ok(Json(detail))
}

pub async fn update_faction(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<FactionDescriptionRequest>,
) -> ApiResult<impl IntoResponse> {
    let manager = state.roster_manager();
    manager
        .set_faction_description(&name, &request.description)
        .await?;
    let detail = manager.faction_detail(&name).await?;
    Ok(Json(detail))
}

pub async fn get_scenarios(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let scenarios = state.roster_manager().scenarios().clone();

    Json(ScenarioCatalog {
        locations: scenarios.tags(TagKind::Location).to_vec(),
        weapons: scenarios.tags(TagKind::Weapon).to_vec(),
        formats: scenarios.tags(TagKind::Format).to_vec(),
    })
}

pub async fn resolve_scenario(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResolveRequest>,
) -> impl IntoResponse {
    let affected_categories = state.roster_manager().scenarios().resolve(&request.tags);
    debug!(
        "Resolved {} tags to {} categories",
        request.tags.len(),
        affected_categories.len()
    );

    Json(ResolveResponse {
        affected_categories,
    })
}

pub async fn random_matchup(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let matchup = state.roster_manager().random_matchup().await?;
    Ok(Json(matchup))
}

pub async fn submit_vote(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.roster_manager().record_vote(request).await?;
    Ok(Json(outcome))
}

pub async fn compare(
    State(state): State<Arc<AppState>>,
    Path((first, second)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let report = state.roster_manager().head_to_head(&first, &second).await?;
    Ok(Json(report))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let stats = state.roster_manager().stats().await?;
    Ok(Json(stats))
}

/// Whole roster as a downloadable JSON backup
pub async fn export_roster(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let snapshot = state.roster_manager().export_roster().await?;
    let body = serde_json::to_string_pretty(&snapshot).map_err(anyhow::Error::from)?;

    let disposition = format!(
        "attachment; filename=\"castle_ranker_backup_{}.json\"",
        current_timestamp().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn reset_roster(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResetParams>,
) -> ApiResult<impl IntoResponse> {
    info!("Roster reset requested (reseed: {})", params.reseed);

    let manager = state.roster_manager();
    manager.reset().await?;

    let seeded = if params.reseed {
        manager.seed_default_roster().await?
    } else {
        0
    };

    Ok(Json(ResetResponse { seeded }))
}

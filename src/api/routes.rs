use crate::api::handlers::*;
use crate::service::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/characters", get(list_characters).post(create_character))
        .route(
            "/api/characters/{id}",
            get(get_character)
                .put(update_character)
                .delete(delete_character),
        )
        .route(
            "/api/characters/{id}/versions",
            get(list_versions).post(create_version),
        )
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/tiers", get(get_tiers))
        .route("/api/roster", get(get_roster))
        .route("/api/factions", get(list_factions))
        .route("/api/factions/{name}", get(get_faction).put(update_faction))
        .route("/api/scenarios", get(get_scenarios))
        .route("/api/scenarios/resolve", post(resolve_scenario))
        .route("/api/matchups/random", get(random_matchup))
        .route("/api/votes", post(submit_vote))
        .route("/api/compare/{first}/{second}", get(compare))
        .route("/api/stats", get(get_stats))
        .route("/api/export", get(export_roster))
        .route("/api/admin/reset", post(reset_roster))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, StorageBackend};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn seeded_router() -> Router {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Memory;
        let state = Arc::new(AppState::new(config).await.unwrap());
        create_router(state)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_and_get_characters() {
        let app = seeded_router().await;

        let response = app.clone().oneshot(get_request("/api/characters")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 38);

        let response = app
            .clone()
            .oneshot(get_request("/api/characters/gustav"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "Gustav");

        let response = app
            .oneshot(get_request("/api/characters/nobody"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("nobody"));
    }

    #[tokio::test]
    async fn test_create_update_delete_character() {
        let app = seeded_router().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/characters",
                json!({ "id": "newcomer", "name": "Newcomer", "faction": "Independent" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/characters",
                json!({ "id": "newcomer", "name": "Again" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/characters/newcomer",
                json!({ "description": "Fresh face" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["description"], "Fresh face");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/characters/newcomer")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(get_request("/api/characters/newcomer"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_vote_and_leaderboard() {
        let app = seeded_router().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/votes",
                json!({ "winner_id": "gustav", "loser_id": "aquila", "tags": ["enclosed"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = body_json(response).await;
        assert_eq!(outcome["winner"]["ratings"]["overall"], 1216);

        let response = app
            .clone()
            .oneshot(get_request("/api/leaderboard?category=hand_to_hand"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let leaderboard = body_json(response).await;
        assert_eq!(leaderboard[0]["id"], "gustav");
        assert_eq!(leaderboard[0]["rank"], 1);
        assert_eq!(leaderboard[0]["rating"], 1216);

        let response = app
            .clone()
            .oneshot(get_request("/api/leaderboard?category=cooking"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/votes",
                json!({ "winner_id": "gustav", "loser_id": "gustav" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_scenarios_and_matchups() {
        let app = seeded_router().await;

        let response = app.clone().oneshot(get_request("/api/scenarios")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let catalog = body_json(response).await;
        assert!(!catalog["locations"].as_array().unwrap().is_empty());
        assert!(!catalog["formats"].as_array().unwrap().is_empty());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/scenarios/resolve",
                json!({ "tags": ["forest", "unknown_tag"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["affected_categories"],
            json!(["battle_iq", "assassination"])
        );

        let response = app
            .oneshot(get_request("/api/matchups/random"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let matchup = body_json(response).await;
        assert_ne!(matchup["first"]["id"], matchup["second"]["id"]);
    }

    #[tokio::test]
    async fn test_export_roster_backup() {
        let app = seeded_router().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/votes",
                json!({ "winner_id": "gustav", "loser_id": "aquila" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/factions/Iskra",
                json!({ "description": "Mercenaries" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_request("/api/export")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"castle_ranker_backup_"));
        assert!(disposition.ends_with(".json\""));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("\n  "));

        let backup: Value = serde_json::from_str(&text).unwrap();
        let characters = backup["characters"].as_array().unwrap();
        assert_eq!(characters.len(), 38);
        let gustav = characters.iter().find(|c| c["id"] == "gustav").unwrap();
        assert_eq!(gustav["wins"], 1);
        assert_eq!(gustav["match_history"].as_array().unwrap().len(), 1);
        assert_eq!(backup["faction_descriptions"]["Iskra"], "Mercenaries");
    }

    #[tokio::test]
    async fn test_reset_without_reseed() {
        let app = seeded_router().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/admin/reset")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["seeded"], 0);

        let response = app
            .clone()
            .oneshot(get_request("/api/matchups/random"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/admin/reset?reseed=true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await["seeded"], 38);
    }
}

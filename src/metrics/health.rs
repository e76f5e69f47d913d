//! Health check endpoints and Prometheus metrics server
//!
//! Serves the probes, the Prometheus scrape endpoint and, when attached,
//! the roster API on a single Axum listener.

use crate::metrics::collector::MetricsCollector;
use crate::service::app::AppState;
use crate::service::health::{HealthCheck, HealthStatus};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

const SERVICE_NAME: &str = "castle-ranker";

/// Health server configuration
#[derive(Debug, Clone)]
pub struct HealthServerConfig {
    /// Port to bind the health server to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for HealthServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Shared state for the health server
#[derive(Clone)]
pub struct HealthServerState {
    pub metrics_collector: Arc<MetricsCollector>,
    pub app_state: Option<Arc<AppState>>,
}

/// HTTP server for monitoring endpoints and any extra routes merged into it
pub struct HealthServer {
    config: HealthServerConfig,
    state: HealthServerState,
    extra_routes: Option<Router>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HealthServer {
    /// Create a new health server
    pub fn new(config: HealthServerConfig, metrics_collector: Arc<MetricsCollector>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            state: HealthServerState {
                metrics_collector,
                app_state: None,
            },
            extra_routes: None,
            shutdown_tx,
        }
    }

    /// Set the application state for health checks
    pub fn with_app_state(mut self, app_state: Arc<AppState>) -> Self {
        self.state.app_state = Some(app_state);
        self
    }

    /// Serve an additional router next to the monitoring endpoints
    pub fn with_routes(mut self, routes: Router) -> Self {
        self.extra_routes = Some(routes);
        self
    }

    /// Start the server and block until `stop` is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid health server address")?;

        let app = self.create_router();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("HTTP server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP server shutdown signal received");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    fn create_router(&self) -> Router {
        let router = Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .route("/alive", get(alive_handler))
            .route("/metrics", get(metrics_handler))
            .route("/stats", get(stats_handler))
            .with_state(self.state.clone());

        match &self.extra_routes {
            Some(routes) => router.merge(routes.clone()),
            None => router,
        }
    }

    /// Stop the server
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping HTTP server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to HTTP server: {}", e);
        }

        Ok(())
    }
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/health",
            "/ready",
            "/alive",
            "/metrics",
            "/stats",
            "/api/characters",
            "/api/leaderboard",
            "/api/matchups/random",
            "/api/votes"
        ]
    }))
}

/// Lightweight health check endpoint handler
async fn health_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Health check requested");

    let Some(app_state) = &state.app_state else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": SERVICE_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "error": "Service not initialized"
            })),
        );
    };

    let (code, status) = match HealthCheck::readiness_check(app_state.clone()).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy"),
        Ok(HealthStatus::Degraded) => (StatusCode::OK, "degraded"),
        Ok(HealthStatus::Unhealthy) | Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    (
        code,
        Json(json!({
            "status": status,
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

async fn ready_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Readiness check requested");

    match &state.app_state {
        Some(app_state) => match HealthCheck::readiness_check(app_state.clone()).await {
            Ok(HealthStatus::Healthy) => (StatusCode::OK, "Ready"),
            Ok(HealthStatus::Degraded) => (StatusCode::OK, "Degraded but ready"),
            Ok(HealthStatus::Unhealthy) => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
            Err(e) => {
                error!("Readiness check failed: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
            }
        },
        None => (StatusCode::SERVICE_UNAVAILABLE, "Service not initialized"),
    }
}

async fn alive_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    match &state.app_state {
        Some(app_state) => match HealthCheck::liveness_check(app_state.clone()).await {
            Ok(HealthStatus::Healthy) => (StatusCode::OK, "Alive"),
            _ => (StatusCode::SERVICE_UNAVAILABLE, "Not alive"),
        },
        None => (StatusCode::SERVICE_UNAVAILABLE, "Service not initialized"),
    }
}

/// Prometheus metrics endpoint handler
async fn metrics_handler(State(state): State<HealthServerState>) -> Response {
    let metric_families = state.metrics_collector.registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(body) => {
            debug!("Serving {} metric families", metric_families.len());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

/// Detailed statistics for human consumption
async fn stats_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    let error_body = |message: &str| {
        json!({
            "service": {
                "name": SERVICE_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "status": "error"
            },
            "error": message,
            "timestamp": chrono::Utc::now()
        })
    };

    let Some(app_state) = &state.app_state else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(error_body("Service not initialized")),
        );
    };

    match HealthCheck::check(app_state.clone()).await {
        Ok(health) => (
            StatusCode::OK,
            Json(json!({
                "service": {
                    "name": health.service,
                    "version": health.version,
                    "status": health.status,
                    "uptime": health.stats.uptime_info
                },
                "roster": {
                    "characters": health.stats.characters,
                    "votes_recorded": health.stats.votes_recorded,
                    "upsets": health.stats.upsets
                },
                "storage": {
                    "fallbacks": health.stats.storage_fallbacks
                },
                "components": health.checks,
                "timestamp": health.timestamp
            })),
        ),
        Err(e) => {
            error!("Failed to get stats: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(error_body("Failed to get service stats")),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, StorageBackend};
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use tower::ServiceExt;

    fn collector() -> Arc<MetricsCollector> {
        Arc::new(MetricsCollector::new().expect("Failed to create collector"))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn running_app_state() -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Memory;
        let app_state = Arc::new(AppState::new(config).await.unwrap());
        app_state.start().await.unwrap();
        app_state
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let server = HealthServer::new(HealthServerConfig::default(), collector());
        let response = server.create_router().oneshot(get_request("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let collector = collector();
        collector.record_character_created();
        collector.update_health_status(2);

        let server = HealthServer::new(HealthServerConfig::default(), collector);
        let response = server
            .create_router()
            .oneshot(get_request("/metrics"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("castle_ranker_health_status"));
    }

    #[tokio::test]
    async fn test_endpoints_without_app_state() {
        let server = HealthServer::new(HealthServerConfig::default(), collector());
        let app = server.create_router();

        for uri in ["/health", "/ready", "/alive", "/stats"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(
                response.status(),
                StatusCode::SERVICE_UNAVAILABLE,
                "unexpected status for {}",
                uri
            );
        }
    }

    #[tokio::test]
    async fn test_endpoints_with_running_app() {
        let app_state = running_app_state().await;
        let server = HealthServer::new(
            HealthServerConfig::default(),
            app_state.metrics_collector(),
        )
        .with_app_state(app_state.clone());
        let app = server.create_router();

        for uri in ["/health", "/ready", "/alive"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "unexpected status for {}", uri);
        }

        let response = app.oneshot(get_request("/stats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let stats: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(stats["roster"]["characters"], 38);

        app_state.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_merged_routes_are_served() {
        let app_state = running_app_state().await;
        let server = HealthServer::new(
            HealthServerConfig::default(),
            app_state.metrics_collector(),
        )
        .with_app_state(app_state.clone())
        .with_routes(crate::api::create_router(app_state.clone()));

        let response = server
            .create_router()
            .oneshot(get_request("/api/tiers"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        app_state.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_404_handling() {
        let server = HealthServer::new(HealthServerConfig::default(), collector());
        let response = server
            .create_router()
            .oneshot(get_request("/nonexistent"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_health_server_config() {
        let config = HealthServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
    }
}

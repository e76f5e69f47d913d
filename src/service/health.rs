//! Health check endpoints and monitoring
//!
//! This module provides health check functionality for the castle-ranker
//! service, including readiness and liveness probes.

use crate::service::app::AppState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge value exported to Prometheus
    pub fn as_metric(self) -> u8 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 0,
        }
    }

    fn worst(self, other: HealthStatus) -> HealthStatus {
        if self.as_metric() <= other.as_metric() {
            self
        } else {
            other
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional error message if unhealthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStats {
    /// Characters currently stored
    pub characters: usize,
    /// Votes applied since service start
    pub votes_recorded: u64,
    /// Votes won by the lower rated side since service start
    pub upsets: u64,
    /// Storage operations served by the local cache
    pub storage_fallbacks: u64,
    /// Service uptime information
    pub uptime_info: String,
}

impl HealthCheck {
    /// Perform a comprehensive health check of the service
    pub async fn check(app_state: Arc<AppState>) -> Result<Self> {
        let mut checks = Vec::new();

        let service_check = Self::check_service_running(&app_state).await;
        let mut overall_status = service_check.status;
        checks.push(service_check);

        let roster_check = Self::check_roster_manager(&app_state).await;
        overall_status = overall_status.worst(roster_check.status);
        checks.push(roster_check);

        let storage_check = Self::check_storage(&app_state).await;
        overall_status = overall_status.worst(storage_check.status);
        checks.push(storage_check);

        let stats = Self::gather_service_stats(&app_state).await;

        Ok(HealthCheck {
            status: overall_status,
            service: app_state.config().service.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            checks,
            stats,
        })
    }

    /// Simple liveness check - just verify service is running
    pub async fn liveness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if app_state.is_running().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }

    /// Readiness check - verify service can handle requests
    pub async fn readiness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if !app_state.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }

        let roster = Self::check_roster_manager(&app_state).await.status;
        let storage = Self::check_storage(&app_state).await.status;

        Ok(roster.worst(storage))
    }

    /// Check if service is running
    async fn check_service_running(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = if app_state.is_running().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Check roster manager health
    async fn check_roster_manager(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = match app_state.roster_manager().stats().await {
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => {
                error!("Roster manager stats check failed: {}", e);
                (
                    HealthStatus::Degraded,
                    Some(format!("Stats check failed: {}", e)),
                )
            }
        };

        ComponentCheck {
            name: "roster_manager".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Check storage reachability; cache fallbacks mark it degraded
    async fn check_storage(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let fallbacks = app_state.metrics_collector().total_storage_fallbacks();
        let (status, message) = match app_state.roster_manager().store().count().await {
            Ok(_) if fallbacks > 0 => (
                HealthStatus::Degraded,
                Some(format!(
                    "{} operations served from the local cache",
                    fallbacks
                )),
            ),
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => (
                HealthStatus::Unhealthy,
                Some(format!("Storage unavailable: {}", e)),
            ),
        };

        ComponentCheck {
            name: "storage".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Gather current service statistics
    async fn gather_service_stats(app_state: &AppState) -> ServiceStats {
        let uptime_info = format!("Up {}s", app_state.uptime().as_secs());
        let storage_fallbacks = app_state.metrics_collector().total_storage_fallbacks();

        match app_state.roster_manager().stats().await {
            Ok(roster_stats) => ServiceStats {
                characters: roster_stats.characters,
                votes_recorded: roster_stats.votes_recorded,
                upsets: roster_stats.upsets,
                storage_fallbacks,
                uptime_info,
            },
            Err(e) => {
                debug!("Failed to get roster stats for health check: {}", e);
                ServiceStats {
                    storage_fallbacks,
                    uptime_info,
                    ..Default::default()
                }
            }
        }
    }
}

/// Convert health check to JSON string
impl HealthCheck {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize health check: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, StorageBackend};

    async fn create_app_state() -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.storage.seed_default_roster = false;
        Arc::new(AppState::new(config).await.unwrap())
    }

    #[test]
    fn test_status_ordering() {
        assert_eq!(
            HealthStatus::Healthy.worst(HealthStatus::Degraded),
            HealthStatus::Degraded
        );
        assert_eq!(
            HealthStatus::Unhealthy.worst(HealthStatus::Degraded),
            HealthStatus::Unhealthy
        );
        assert_eq!(HealthStatus::Healthy.as_metric(), 2);
    }

    #[tokio::test]
    async fn test_not_running_is_unhealthy() {
        let app_state = create_app_state().await;

        let health = HealthCheck::check(app_state.clone()).await.unwrap();
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(health.checks.len(), 3);
        assert_eq!(
            HealthCheck::readiness_check(app_state).await.unwrap(),
            HealthStatus::Unhealthy
        );
    }

    #[tokio::test]
    async fn test_running_service_is_healthy() {
        let app_state = create_app_state().await;
        app_state.start().await.unwrap();

        let health = HealthCheck::check(app_state.clone()).await.unwrap();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.service, "castle-ranker");
        assert_eq!(health.stats.characters, 0);
        assert!(health.to_json().unwrap().contains("roster_manager"));

        assert_eq!(
            HealthCheck::liveness_check(app_state.clone()).await.unwrap(),
            HealthStatus::Healthy
        );

        app_state.shutdown().await.unwrap();
        assert_eq!(
            HealthCheck::liveness_check(app_state).await.unwrap(),
            HealthStatus::Unhealthy
        );
    }

    #[tokio::test]
    async fn test_fallbacks_degrade_storage() {
        let app_state = create_app_state().await;
        app_state.start().await.unwrap();
        app_state
            .metrics_collector()
            .record_storage_fallback("list_characters");

        let health = HealthCheck::check(app_state.clone()).await.unwrap();
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.stats.storage_fallbacks, 1);

        app_state.shutdown().await.unwrap();
    }
}

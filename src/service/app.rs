//! Main application state and service coordination
//!
//! This module contains the production AppState that wires configuration,
//! storage, the roster manager and metrics together and runs background tasks.

use crate::config::{validate_config, AppConfig, StorageBackend};
use crate::metrics::MetricsCollector;
use crate::rating::{
    CharacterStore, FallbackCharacterStore, InMemoryCharacterStore, JsonFileCharacterStore,
};
use crate::roster::{load_roster_file, RosterManager};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Interval of the service health metrics task
const HEALTH_METRICS_INTERVAL: Duration = Duration::from_secs(30);

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Character lifecycle and vote orchestration
    roster_manager: Arc<RosterManager>,

    /// Metrics shared by every component
    metrics_collector: Arc<MetricsCollector>,

    /// Background task handles
    background_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,

    /// When the state was created
    started_at: Instant,
}

impl AppState {
    /// Initialize the application with the storage backend named in the config
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing castle-ranker service");
        info!(
            "Configuration: service={}, storage={}, data_path={}",
            config.service.name,
            config.storage.backend,
            config.storage.data_path.display()
        );

        validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let metrics_collector = Self::initialize_metrics()?;
        let store = Self::initialize_storage(&config, metrics_collector.clone()).await?;

        Self::with_store(config, store, metrics_collector).await
    }

    /// Initialize the application over an existing store
    pub async fn with_store(
        config: AppConfig,
        store: Arc<dyn CharacterStore>,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Result<Self, ServiceError> {
        let roster_manager = RosterManager::new(
            store,
            config.rating.elo_config(),
            config.rating.roster_settings(),
            metrics_collector.clone(),
        )
        .map_err(|e| ServiceError::Initialization {
            message: format!("Failed to create roster manager: {}", e),
        })?;

        Self::seed_roster(&config, &roster_manager).await?;

        Ok(Self {
            config,
            roster_manager: Arc::new(roster_manager),
            metrics_collector,
            background_tasks: Mutex::new(Vec::new()),
            is_running: Arc::new(RwLock::new(false)),
            started_at: Instant::now(),
        })
    }

    /// Start background tasks and mark the service as running
    pub async fn start(&self) -> Result<(), ServiceError> {
        info!("Starting castle-ranker service");

        *self.is_running.write().await = true;

        self.start_background_tasks().await?;

        info!("✅ Castle-ranker service started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of castle-ranker service");

        *self.is_running.write().await = false;

        self.stop_background_tasks().await;

        let final_stats =
            self.roster_manager
                .stats()
                .await
                .map_err(|e| ServiceError::BackgroundTask {
                    message: format!("Failed to get final stats: {}", e),
                })?;

        info!("Final service statistics: {:?}", final_stats);
        info!("✅ Castle-ranker service shutdown completed");

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get roster manager for operations
    pub fn roster_manager(&self) -> Arc<RosterManager> {
        self.roster_manager.clone()
    }

    pub fn metrics_collector(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Initialize metrics collector
    fn initialize_metrics() -> Result<Arc<MetricsCollector>, ServiceError> {
        let metrics_collector =
            MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            })?;

        Ok(Arc::new(metrics_collector))
    }

    /// Build the configured storage backend
    async fn initialize_storage(
        config: &AppConfig,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Result<Arc<dyn CharacterStore>, ServiceError> {
        let path = &config.storage.data_path;

        match config.storage.backend {
            StorageBackend::Memory => {
                info!("Using in-memory character storage");
                Ok(Arc::new(InMemoryCharacterStore::new()))
            }
            StorageBackend::File => {
                info!("Using file character storage at {}", path.display());
                let store = JsonFileCharacterStore::open(path).await.map_err(|e| {
                    ServiceError::Storage {
                        message: format!("Failed to open {}: {}", path.display(), e),
                    }
                })?;
                Ok(Arc::new(store))
            }
            StorageBackend::FileWithMemoryFallback => {
                match JsonFileCharacterStore::open(path).await {
                    Ok(file_store) => {
                        info!(
                            "Using file character storage at {} with in-memory fallback",
                            path.display()
                        );
                        let store =
                            FallbackCharacterStore::new(file_store, InMemoryCharacterStore::new())
                                .with_metrics(metrics_collector);
                        if let Err(e) = store.warm().await {
                            warn!("Failed to warm local roster cache: {}", e);
                        }
                        Ok(Arc::new(store))
                    }
                    Err(e) => {
                        warn!(
                            "Character file {} unusable, serving from memory only: {}",
                            path.display(),
                            e
                        );
                        metrics_collector.record_storage_fallback("open");
                        Ok(Arc::new(InMemoryCharacterStore::new()))
                    }
                }
            }
        }
    }

    /// Seed an empty store with the configured roster
    async fn seed_roster(
        config: &AppConfig,
        roster_manager: &RosterManager,
    ) -> Result<(), ServiceError> {
        if !config.storage.seed_default_roster {
            let count = roster_manager
                .stats()
                .await
                .map_err(|e| ServiceError::Storage {
                    message: format!("Failed to count characters: {}", e),
                })?
                .characters;
            roster_manager.metrics().set_roster_size(count);
            debug!("Roster seeding disabled, {} characters stored", count);
            return Ok(());
        }

        let seeded = match &config.storage.roster_path {
            Some(path) => {
                info!("Seeding roster from {}", path.display());
                let entries =
                    load_roster_file(path)
                        .await
                        .map_err(|e| ServiceError::Configuration {
                            message: e.to_string(),
                        })?;
                roster_manager.seed_roster(entries).await
            }
            None => roster_manager.seed_default_roster().await,
        }
        .map_err(|e| ServiceError::Initialization {
            message: format!("Failed to seed roster: {}", e),
        })?;

        if seeded > 0 {
            info!("Loaded {} characters into an empty roster", seeded);
        }
        Ok(())
    }

    /// Start background maintenance tasks
    async fn start_background_tasks(&self) -> Result<(), ServiceError> {
        let mut tasks = self.background_tasks.lock().await;
        if !tasks.is_empty() {
            return Err(ServiceError::BackgroundTask {
                message: "Background tasks already running".to_string(),
            });
        }

        info!(
            "Starting health metrics task ({}s interval)...",
            HEALTH_METRICS_INTERVAL.as_secs()
        );
        let health_metrics_task = {
            let roster_manager = self.roster_manager.clone();
            let metrics_collector = self.metrics_collector.clone();
            let is_running = self.is_running.clone();
            let started_at = self.started_at;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(HEALTH_METRICS_INTERVAL);
                info!("Health metrics task started");

                while *is_running.read().await {
                    interval.tick().await;

                    let uptime_seconds = started_at.elapsed().as_secs() as i64;
                    metrics_collector
                        .service()
                        .uptime_seconds
                        .set(uptime_seconds);

                    let storage_ok = roster_manager.store().count().await.is_ok();
                    let roster_ok = match roster_manager.stats().await {
                        Ok(stats) => {
                            debug!(
                                "Updating metrics - characters: {}, votes: {}, uptime: {}s",
                                stats.characters, stats.votes_recorded, uptime_seconds
                            );
                            metrics_collector.set_roster_size(stats.characters);
                            true
                        }
                        Err(e) => {
                            warn!("Failed to get roster stats for metrics update: {}", e);
                            false
                        }
                    };

                    let status = match (storage_ok, roster_ok) {
                        (true, true) if metrics_collector.total_storage_fallbacks() == 0 => 2,
                        (true, true) => 1,
                        _ => 0,
                    };
                    metrics_collector.update_health_status(status);
                    metrics_collector.update_component_health("storage", storage_ok);
                    metrics_collector.update_component_health("roster_manager", roster_ok);
                }

                info!("Health metrics task stopped");
            })
        };

        tasks.push(health_metrics_task);

        info!("{} background tasks started successfully", tasks.len());
        Ok(())
    }

    /// Stop all background tasks
    async fn stop_background_tasks(&self) {
        let mut tasks = self.background_tasks.lock().await;
        let task_count = tasks.len();
        if task_count == 0 {
            info!("No background tasks to stop");
            return;
        }

        info!("Stopping {} background tasks...", task_count);

        for (i, task) in tasks.drain(..).enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!("Background task {} ended abnormally: {}", i + 1, e);
                }
            }
        }

        info!("✅ All {} background tasks stopped", task_count);
    }
}

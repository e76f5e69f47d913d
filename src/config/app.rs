//! Main application configuration
//!
//! This module defines the primary configuration structures for the ranking
//! service, including environment variable and TOML file loading and validation.

use crate::config::rating::RatingSettings;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingSettings,
    pub storage: StorageSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Interface the HTTP server binds to
    pub http_host: String,
    /// Port serving the API, health and metrics endpoints
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Where characters are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process memory only
    Memory,
    /// JSON snapshot on disk
    File,
    /// JSON snapshot on disk, degrading to memory when the file is unusable
    FileWithMemoryFallback,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::File => write!(f, "file"),
            StorageBackend::FileWithMemoryFallback => write!(f, "file_with_memory_fallback"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            "file_with_memory_fallback" => Ok(StorageBackend::FileWithMemoryFallback),
            other => Err(anyhow!("Invalid storage backend: {}", other)),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Snapshot file used by the file backends
    pub data_path: PathBuf,
    /// Load the default roster into an empty store on startup
    pub seed_default_roster: bool,
    /// Roster TOML used for seeding instead of the bundled one
    pub roster_path: Option<PathBuf>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "castle-ranker".to_string(),
            log_level: "info".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::FileWithMemoryFallback,
            data_path: PathBuf::from("data/roster.json"),
            seed_default_roster: true,
            roster_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Some(name) = lookup("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Some(host) = lookup("HTTP_HOST") {
            config.service.http_host = host;
        }
        if let Some(port) = lookup("HTTP_PORT") {
            config.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Some(timeout) = lookup("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Rating settings
        if let Some(k_factor) = lookup("ELO_K_FACTOR") {
            config.rating.k_factor = k_factor
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_K_FACTOR value: {}", k_factor))?;
        }
        if let Some(rating) = lookup("INITIAL_RATING") {
            config.rating.initial_rating = rating
                .parse()
                .map_err(|_| anyhow!("Invalid INITIAL_RATING value: {}", rating))?;
        }
        if let Some(rating) = lookup("RESERVED_TIER_RATING") {
            config.rating.reserved_tier_rating = rating
                .parse()
                .map_err(|_| anyhow!("Invalid RESERVED_TIER_RATING value: {}", rating))?;
        }
        if let Some(limit) = lookup("MATCH_HISTORY_LIMIT") {
            config.rating.history_limit = limit
                .parse()
                .map_err(|_| anyhow!("Invalid MATCH_HISTORY_LIMIT value: {}", limit))?;
        }

        // Storage settings
        if let Some(backend) = lookup("STORAGE_BACKEND") {
            config.storage.backend = backend.parse()?;
        }
        if let Some(path) = lookup("DATA_PATH") {
            config.storage.data_path = PathBuf::from(path);
        }
        if let Some(seed) = lookup("SEED_DEFAULT_ROSTER") {
            config.storage.seed_default_roster = seed
                .parse()
                .map_err(|_| anyhow!("Invalid SEED_DEFAULT_ROSTER value: {}", seed))?;
        }
        if let Some(path) = lookup("ROSTER_PATH") {
            config.storage.roster_path = Some(PathBuf::from(path));
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Address the HTTP server binds to
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.service.http_host, self.service.http_port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.http_host.is_empty() {
        return Err(anyhow!("HTTP host cannot be empty"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    config.rating.validate()?;

    // Validate storage settings
    if config.storage.backend != StorageBackend::Memory
        && config.storage.data_path.as_os_str().is_empty()
    {
        return Err(anyhow!(
            "Data path cannot be empty for the {} backend",
            config.storage.backend
        ));
    }

    Ok(())
}

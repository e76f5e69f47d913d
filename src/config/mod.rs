//! Configuration management for the ranking service
//!
//! This module handles all configuration loading from environment variables
//! and TOML files, validation, and default values for the service.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings, StorageBackend, StorageSettings};
pub use rating::RatingSettings;

//! Error types for the ranking service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. The rating core itself is infallible; these errors
//! come from the roster, storage, scenario and configuration layers.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ranking scenarios
#[derive(Debug, thiserror::Error)]
pub enum RankerError {
    #[error("Character not found: {id}")]
    CharacterNotFound { id: String },

    #[error("Character already exists: {id}")]
    DuplicateCharacter { id: String },

    #[error("A character cannot be matched against itself: {id}")]
    SelfMatch { id: String },

    #[error("Invalid character: {reason}")]
    InvalidCharacter { reason: String },

    #[error("Unknown scenario tag: {tag}")]
    UnknownScenarioTag { tag: String },

    #[error("Not enough characters for a matchup: {available} available")]
    NotEnoughCharacters { available: usize },

    #[error("Storage failure: {message}")]
    StorageFailure { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl RankerError {
    /// Find a `RankerError` anywhere in an anyhow error chain
    pub fn find(error: &anyhow::Error) -> Option<&RankerError> {
        error.chain().find_map(|cause| cause.downcast_ref::<RankerError>())
    }
}

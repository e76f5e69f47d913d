//! Utility functions for the ranking service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique character ID
pub fn generate_character_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Case-insensitive substring match used by the name filters
pub fn matches_filter(haystack: &str, filter: &str) -> bool {
    filter.is_empty() || haystack.to_lowercase().contains(&filter.to_lowercase())
}

/// Trim a value and fall back to a default when it ends up empty
pub fn non_empty_or(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_character_id();
        let id2 = generate_character_id();
        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(&id1).is_ok());
    }

    #[test]
    fn test_matches_filter() {
        assert!(matches_filter("Kim Shin", "shin"));
        assert!(matches_filter("Kim Shin", ""));
        assert!(!matches_filter("Gustav", "shin"));
    }

    #[test]
    fn test_non_empty_or() {
        assert_eq!(non_empty_or("  ", "Other"), "Other");
        assert_eq!(non_empty_or(" Iskra ", "Other"), "Iskra");
    }
}

//! Tier classification
//!
//! Maps a rating to a discrete tier label by scanning strictly descending
//! thresholds from the top. Tiers are always derived on demand and never stored.

use serde::{Deserialize, Serialize};

/// Discrete tier label, declared from highest to lowest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "EX")]
    Ex,
    #[serde(rename = "SSS")]
    Sss,
    #[serde(rename = "SS")]
    Ss,
    #[serde(rename = "S")]
    S,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "E")]
    E,
    /// Reserved lowest band
    #[serde(rename = "F")]
    F,
    /// Sentinel for ratings that cannot be classified
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Tier {
    /// Every classifiable tier, highest first
    pub const RANKED: [Tier; 11] = [
        Tier::Ex,
        Tier::Sss,
        Tier::Ss,
        Tier::S,
        Tier::Aa,
        Tier::A,
        Tier::B,
        Tier::C,
        Tier::D,
        Tier::E,
        Tier::F,
    ];

    /// Inclusive lower bound of the tier band
    pub fn threshold(self) -> f64 {
        match self {
            Tier::Ex => 2400.0,
            Tier::Sss => 2200.0,
            Tier::Ss => 2000.0,
            Tier::S => 1800.0,
            Tier::Aa => 1600.0,
            Tier::A => 1400.0,
            Tier::B => 1200.0,
            Tier::C => 1000.0,
            Tier::D => 800.0,
            Tier::E => 600.0,
            Tier::F => 0.0,
            Tier::Unknown => f64::NEG_INFINITY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Ex => "EX",
            Tier::Sss => "SSS",
            Tier::Ss => "SS",
            Tier::S => "S",
            Tier::Aa => "AA",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
            Tier::E => "E",
            Tier::F => "F",
            Tier::Unknown => "UNKNOWN",
        }
    }

    /// EX through S
    pub fn is_high_tier(self) -> bool {
        matches!(self, Tier::Ex | Tier::Sss | Tier::Ss | Tier::S)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify a rating into its tier
///
/// Non-finite input yields `Tier::Unknown`. Finite ratings below the F
/// threshold still land in F, which is the floor band, so every finite
/// rating maps to exactly one ranked tier.
pub fn classify_tier(rating: f64) -> Tier {
    if !rating.is_finite() {
        return Tier::Unknown;
    }

    Tier::RANKED
        .into_iter()
        .find(|tier| rating >= tier.threshold())
        .unwrap_or(Tier::F)
}

/// Convenience wrapper for integral ratings
pub fn tier_for_rating(rating: i32) -> Tier {
    classify_tier(f64::from(rating))
}

//! Quality score post-processing
//!
//! The regressor emits a continuous score. Clients see the score rounded to a
//! tenth plus two derived labels: a category from fixed thresholds and a
//! coarse confidence label. Thresholds match the training notebook's
//! documentation of the 3-9 quality scale.

use serde::{Deserialize, Serialize};

/// Round a raw score to the nearest tenth, the resolution reported to clients
#[must_use]
pub fn round_score(score: f32) -> f32 {
    (score * 10.0).round() / 10.0
}

/// Discrete quality band derived from the rounded score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityCategory {
    /// Rounded score <= 4.0
    Poor,
    /// Rounded score in (4.0, 5.0]
    Fair,
    /// Rounded score in (5.0, 6.0]
    Good,
    /// Rounded score in (6.0, 7.0]
    VeryGood,
    /// Rounded score > 7.0
    Excellent,
}

impl QualityCategory {
    /// Categorize a rounded score
    ///
    /// Thresholds are inclusive on the upper edge: a score of exactly 6.0 is
    /// still "Good", matching the documented sample responses.
    #[must_use]
    pub fn from_score(score: f32) -> Self {
        // Work in tenths to keep the band edges exact
        let tenths = (score * 10.0).round() as i32;
        if tenths <= 40 {
            Self::Poor
        } else if tenths <= 50 {
            Self::Fair
        } else if tenths <= 60 {
            Self::Good
        } else if tenths <= 70 {
            Self::VeryGood
        } else {
            Self::Excellent
        }
    }

    /// Human-readable label used in API responses
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::VeryGood => "Very Good",
            Self::Excellent => "Excellent",
        }
    }
}

/// Coarse confidence label attached to each prediction
///
/// Whole-number scores inside the observed 3-8 training range get "High";
/// everything else gets "Medium". This mirrors the behavior the training
/// pipeline documented, quirks included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    /// Rounded score is a whole number in 3..=8
    High,
    /// Any fractional or out-of-band score
    Medium,
}

impl Confidence {
    /// Derive the confidence label from a rounded score
    #[must_use]
    pub fn from_score(score: f32) -> Self {
        let tenths = (score * 10.0).round() as i32;
        if tenths % 10 == 0 && (30..=80).contains(&tenths) {
            Self::High
        } else {
            Self::Medium
        }
    }

    /// Human-readable label used in API responses
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
        }
    }
}

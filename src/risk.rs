//! Health risk assessment from air quality and user attributes
//!
//! The assessment accumulates an integer score from the AQI band, a single
//! vulnerability step and a nationality adjustment, then clamps it into the
//! four risk categories.

use crate::models::UserProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest score a category can be mapped from
pub const MIN_SCORE: i32 = 0;
/// Highest score a category can be mapped from
pub const MAX_SCORE: i32 = 3;

/// Ordered risk levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    /// Score 0
    Low,
    /// Score 1
    Medium,
    /// Score 2
    High,
    /// Score 3
    VeryHigh,
}

impl RiskCategory {
    /// Clamp a raw score into range and map it to a category
    #[must_use]
    pub fn from_score(score: i32) -> Self {
        match score.clamp(MIN_SCORE, MAX_SCORE) {
            0 => RiskCategory::Low,
            1 => RiskCategory::Medium,
            2 => RiskCategory::High,
            _ => RiskCategory::VeryHigh,
        }
    }

    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "低リスク",
            RiskCategory::Medium => "中リスク",
            RiskCategory::High => "高リスク",
            RiskCategory::VeryHigh => "非常に高リスク",
        }
    }

    /// Short symbol shown next to the label
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            RiskCategory::Low => "✅",
            RiskCategory::Medium => "⚠️",
            RiskCategory::High => "🔴",
            RiskCategory::VeryHigh => "❗❗",
        }
    }

    #[must_use]
    pub fn score(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.marker())
    }
}

/// Score contributed by the AQI band alone
#[must_use]
pub fn base_score(aqi: i32) -> i32 {
    if aqi <= 50 {
        0
    } else if aqi <= 100 {
        1
    } else {
        2
    }
}

fn nationality_adjustment(nationality: &str) -> i32 {
    match nationality.to_lowercase().as_str() {
        "thai" => -1,
        "japanese" => 1,
        _ => 0,
    }
}

/// Assess the risk category for the given AQI and user attributes
#[must_use]
pub fn assess_risk(aqi: i32, age: i32, is_pregnant: bool, nationality: &str) -> RiskCategory {
    RiskBreakdown::compute(aqi, &UserProfile::new(age, is_pregnant, nationality)).category
}

/// Individual contributions to a risk assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    /// Score from the AQI band (0-2)
    pub base: i32,
    /// 1 if the profile is vulnerable, otherwise 0
    pub vulnerability: i32,
    /// -1, 0 or +1
    pub nationality: i32,
    /// Sum before clamping
    pub raw_score: i32,
    /// Final category after clamping
    pub category: RiskCategory,
}

impl RiskBreakdown {
    /// Compute the breakdown for a profile
    #[must_use]
    pub fn compute(aqi: i32, profile: &UserProfile) -> Self {
        let base = base_score(aqi);
        let vulnerability = i32::from(profile.is_vulnerable());
        let nationality = nationality_adjustment(&profile.nationality);
        let raw_score = base + vulnerability + nationality;

        Self {
            base,
            vulnerability,
            nationality,
            raw_score,
            category: RiskCategory::from_score(raw_score),
        }
    }
}

impl UserProfile {
    /// Assess this profile's risk at the given AQI
    #[must_use]
    pub fn assess(&self, aqi: i32) -> RiskCategory {
        RiskBreakdown::compute(aqi, self).category
    }
}

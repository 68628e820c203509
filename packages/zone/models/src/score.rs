//! Score breakdown and safety level types.
//!
//! These are derived values produced by the scorer. They are attached to a
//! [`Zone`] as a [`ScoredZone`] and never persisted on their own.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::Zone;

/// The six factors that make up a zone's safety score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
pub enum ScoreFactor {
    /// Exposure to climate risks, offset by protective infrastructure.
    #[strum(serialize = "Climate Resilience")]
    ClimateResilience,
    /// Renewable energy, water management and green space.
    #[strum(serialize = "Green Infrastructure")]
    GreenInfrastructure,
    /// Recycling access and waste processing capability.
    #[strum(serialize = "Waste Management")]
    WasteManagement,
    /// Shelter capacity.
    #[strum(serialize = "Emergency Capacity")]
    EmergencyCapacity,
    /// User-submitted rating.
    #[strum(serialize = "Community Rating")]
    CommunityRating,
    /// Reported air quality.
    #[strum(serialize = "Air Quality")]
    AirQuality,
}

impl ScoreFactor {
    /// Returns all factors in breakdown order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ClimateResilience,
            Self::GreenInfrastructure,
            Self::WasteManagement,
            Self::EmergencyCapacity,
            Self::CommunityRating,
            Self::AirQuality,
        ]
    }
}

/// A single factor's sub-score, its weight, and the weighted contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScore {
    /// Sub-score in `0..=100`.
    pub score: u8,
    /// Factor weight in `0.0..=1.0`.
    pub weight: f64,
    /// `score * weight`, unrounded.
    pub weighted_score: f64,
}

impl FactorScore {
    /// Builds a factor score, computing the weighted contribution.
    #[must_use]
    pub fn new(score: u8, weight: f64) -> Self {
        Self {
            score,
            weight,
            weighted_score: f64::from(score) * weight,
        }
    }
}

/// Per-factor breakdown of a zone's safety score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Climate resilience factor.
    pub climate_resilience: FactorScore,
    /// Green infrastructure factor.
    pub green_infrastructure: FactorScore,
    /// Waste management factor.
    pub waste_management: FactorScore,
    /// Emergency capacity factor.
    pub emergency_capacity: FactorScore,
    /// Community rating factor.
    pub community_rating: FactorScore,
    /// Air quality factor.
    pub air_quality: FactorScore,
}

impl ScoreBreakdown {
    /// Returns the score for one factor.
    #[must_use]
    pub const fn get(&self, factor: ScoreFactor) -> &FactorScore {
        match factor {
            ScoreFactor::ClimateResilience => &self.climate_resilience,
            ScoreFactor::GreenInfrastructure => &self.green_infrastructure,
            ScoreFactor::WasteManagement => &self.waste_management,
            ScoreFactor::EmergencyCapacity => &self.emergency_capacity,
            ScoreFactor::CommunityRating => &self.community_rating,
            ScoreFactor::AirQuality => &self.air_quality,
        }
    }

    /// Iterates `(factor, score)` pairs in breakdown order.
    pub fn iter(&self) -> impl Iterator<Item = (ScoreFactor, &FactorScore)> {
        ScoreFactor::all().iter().map(|f| (*f, self.get(*f)))
    }

    /// Sum of the weighted contributions, unrounded.
    #[must_use]
    pub fn weighted_total(&self) -> f64 {
        self.iter().map(|(_, s)| s.weighted_score).sum()
    }
}

/// Qualitative safety level derived from a safety score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SafetyLevel {
    /// Score below 50.
    Limited,
    /// Score 50-69.
    Moderate,
    /// Score 70-84.
    Good,
    /// Score 85 and above.
    Excellent,
}

impl SafetyLevel {
    /// Maps a 0-100 safety score to its level.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            85.. => Self::Excellent,
            70..=84 => Self::Good,
            50..=69 => Self::Moderate,
            _ => Self::Limited,
        }
    }

    /// Display color (hex) for this level.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Excellent => "#4CAF50",
            Self::Good => "#FF9800",
            Self::Moderate => "#FFC107",
            Self::Limited => "#F44336",
        }
    }

    /// One-sentence description of this level.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Excellent => {
                "Very safe with comprehensive climate resilience and green infrastructure"
            }
            Self::Good => "Safe with good climate resilience and waste management capabilities",
            Self::Moderate => "Moderately safe with basic climate protection features",
            Self::Limited => "Limited safety features - consider alternative locations",
        }
    }
}

/// A zone annotated with its safety score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredZone {
    /// The underlying zone record.
    #[serde(flatten)]
    pub zone: Zone,
    /// Composite safety score in `0..=100`.
    pub safety_score: u8,
    /// Per-factor breakdown. `None` for degraded placeholder zones whose
    /// score was not computed from attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
    /// Level derived from `safety_score`.
    pub safety_level: SafetyLevel,
}

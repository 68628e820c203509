//! Factor weights and their validation.

use safe_zone_models::ScoreFactor;
use serde::{Deserialize, Serialize};

use crate::ScoringError;

/// Maximum allowed distance between the weight sum and `1.0`.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Relative weight of each factor in the composite safety score.
///
/// Weights must be finite, non-negative, and sum to `1.0` (within
/// [`WEIGHT_SUM_TOLERANCE`]). Fields missing from a config file fall back to
/// the defaults, and the result is validated as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Climate resilience weight.
    pub climate_resilience: f64,
    /// Green infrastructure weight.
    pub green_infrastructure: f64,
    /// Waste management weight.
    pub waste_management: f64,
    /// Emergency capacity weight.
    pub emergency_capacity: f64,
    /// Community rating weight.
    pub community_rating: f64,
    /// Air quality weight.
    pub air_quality: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            climate_resilience: 0.25,
            green_infrastructure: 0.25,
            waste_management: 0.20,
            emergency_capacity: 0.15,
            community_rating: 0.10,
            air_quality: 0.05,
        }
    }
}

impl ScoreWeights {
    /// Returns the weight of one factor.
    #[must_use]
    pub const fn get(&self, factor: ScoreFactor) -> f64 {
        match factor {
            ScoreFactor::ClimateResilience => self.climate_resilience,
            ScoreFactor::GreenInfrastructure => self.green_infrastructure,
            ScoreFactor::WasteManagement => self.waste_management,
            ScoreFactor::EmergencyCapacity => self.emergency_capacity,
            ScoreFactor::CommunityRating => self.community_rating,
            ScoreFactor::AirQuality => self.air_quality,
        }
    }

    /// Sum of all weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        ScoreFactor::all().iter().map(|f| self.get(*f)).sum()
    }

    /// Checks that every weight is usable and that they sum to `1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::InvalidWeight`] for a negative or non-finite
    /// weight, and [`ScoringError::WeightSum`] if the weights do not sum to
    /// `1.0`.
    pub fn validate(&self) -> Result<(), ScoringError> {
        for factor in ScoreFactor::all() {
            let value = self.get(*factor);
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidWeight {
                    factor: *factor,
                    value,
                });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::WeightSum { sum });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let weights = ScoreWeights::default();
        assert!((weights.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let weights = ScoreWeights {
            air_quality: 0.10,
            ..ScoreWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ScoringError::WeightSum { sum }) if (sum - 1.05).abs() < 1e-9
        ));
    }

    #[test]
    fn rejects_negative_and_nan_weights() {
        let negative = ScoreWeights {
            climate_resilience: 0.35,
            air_quality: -0.05,
            ..ScoreWeights::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ScoringError::InvalidWeight {
                factor: ScoreFactor::AirQuality,
                ..
            })
        ));

        let nan = ScoreWeights {
            community_rating: f64::NAN,
            ..ScoreWeights::default()
        };
        assert!(matches!(
            nan.validate(),
            Err(ScoringError::InvalidWeight {
                factor: ScoreFactor::CommunityRating,
                ..
            })
        ));
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let weights: ScoreWeights = toml::from_str(
            "climate_resilience = 0.30\ngreen_infrastructure = 0.20\n",
        )
        .unwrap();
        assert!((weights.climate_resilience - 0.30).abs() < f64::EPSILON);
        assert!((weights.waste_management - 0.20).abs() < f64::EPSILON);
        assert!(weights.validate().is_ok());
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weighted multi-factor safety scoring for climate safe zones.
//!
//! A zone's safety score is the rounded weighted sum of six sub-scores
//! (see [`ScoreFactor`]), each in `0..=100`. The scorer is a pure
//! function of the zone record and the configured [`ScoreWeights`].
//!
//! Besides the score itself this crate derives improvement
//! [`Recommendation`]s, a climate [`RiskAssessment`], and the
//! [`distance_decay`] used when ranking zones by proximity.

pub mod factors;
pub mod report;
pub mod weights;

use safe_zone_models::{FactorScore, SafetyLevel, ScoreBreakdown, ScoreFactor, ScoredZone, Zone};

pub use report::{
    Priority, Recommendation, RiskAssessment, RiskCategory, RiskFactor, RiskLevel,
    assess_climate_risk, distance_decay, recommendations_for,
};
pub use weights::{ScoreWeights, WEIGHT_SUM_TOLERANCE};

/// Errors produced while configuring the scorer.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// Weights do not add up to `1.0`.
    #[error("Score weights must sum to 1.0, got {sum}")]
    WeightSum {
        /// Actual sum of the configured weights.
        sum: f64,
    },

    /// A single weight is negative or not a number.
    #[error("Invalid weight for {factor}: {value}")]
    InvalidWeight {
        /// Offending factor.
        factor: ScoreFactor,
        /// Offending value.
        value: f64,
    },
}

/// Computes safety scores with a fixed, validated set of weights.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scorer {
    weights: ScoreWeights,
}

impl Scorer {
    /// Creates a scorer with the default weights.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scorer with custom weights.
    ///
    /// # Errors
    ///
    /// * If the weights fail [`ScoreWeights::validate`]
    pub fn with_weights(weights: ScoreWeights) -> Result<Self, ScoringError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// Weights this scorer applies.
    #[must_use]
    pub const fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Computes every sub-score for a zone.
    #[must_use]
    pub fn breakdown(&self, zone: &Zone) -> ScoreBreakdown {
        let w = &self.weights;
        ScoreBreakdown {
            climate_resilience: FactorScore::new(
                factors::climate_resilience(zone),
                w.climate_resilience,
            ),
            green_infrastructure: FactorScore::new(
                factors::green_infrastructure(zone),
                w.green_infrastructure,
            ),
            waste_management: FactorScore::new(
                factors::waste_management(zone),
                w.waste_management,
            ),
            emergency_capacity: FactorScore::new(
                factors::emergency_capacity(zone),
                w.emergency_capacity,
            ),
            community_rating: FactorScore::new(
                factors::community_rating(zone),
                w.community_rating,
            ),
            air_quality: FactorScore::new(factors::air_quality(zone), w.air_quality),
        }
    }

    /// Rounds a breakdown's weighted total to the composite score.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn composite(breakdown: &ScoreBreakdown) -> u8 {
        let total = breakdown.weighted_total().round();
        if !total.is_finite() {
            return 0;
        }
        total.clamp(0.0, 100.0) as u8
    }

    /// Computes a zone's composite safety score.
    #[must_use]
    pub fn score(&self, zone: &Zone) -> u8 {
        Self::composite(&self.breakdown(zone))
    }

    /// Maps a score to its safety level.
    #[must_use]
    pub const fn safety_level(score: u8) -> SafetyLevel {
        SafetyLevel::from_score(score)
    }

    /// Scores a zone and attaches the result.
    #[must_use]
    pub fn annotate(&self, zone: Zone) -> ScoredZone {
        let breakdown = self.breakdown(&zone);
        let safety_score = Self::composite(&breakdown);
        log::trace!(
            "annotate: zone={} score={safety_score} weighted_total={}",
            zone.id,
            breakdown.weighted_total()
        );
        ScoredZone {
            zone,
            safety_score,
            score_breakdown: Some(breakdown),
            safety_level: Self::safety_level(safety_score),
        }
    }

    /// Improvement recommendations for a zone.
    #[must_use]
    pub fn recommendations(&self, zone: &Zone) -> Vec<Recommendation> {
        recommendations_for(&self.breakdown(zone))
    }

    /// Climate risk assessment for a zone.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn climate_risk_assessment(&self, zone: &Zone) -> RiskAssessment {
        assess_climate_risk(zone)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use safe_zone_models::{AirQuality, Coordinates};

    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn moderate_zone() -> Zone {
        let mut zone = Zone::new("a", "Riverside Hall");
        zone.coords = Some(Coordinates::new(-1.95, 30.06));
        zone.climate_risks = strings(&["Low flood risk"]);
        zone.green_infrastructure = strings(&["Solar panels", "Rainwater harvesting"]);
        zone.recycling_centers = 5;
        zone.air_quality = AirQuality::Excellent;
        zone.emergency_capacity = 200;
        zone.community_rating = 4.5;
        zone
    }

    #[test]
    fn scores_moderate_zone() {
        let scorer = Scorer::new();
        let zone = moderate_zone();
        let breakdown = scorer.breakdown(&zone);

        assert_eq!(breakdown.climate_resilience.score, 95);
        assert_eq!(breakdown.green_infrastructure.score, 35);
        assert_eq!(breakdown.waste_management.score, 30);
        assert_eq!(breakdown.emergency_capacity.score, 100);
        assert_eq!(breakdown.community_rating.score, 90);
        assert_eq!(breakdown.air_quality.score, 100);
        assert!((breakdown.weighted_total() - 67.5).abs() < 1e-9);

        // 67.5 rounds up; 68 sits below the Good threshold of 70.
        let scored = scorer.annotate(zone);
        assert_eq!(scored.safety_score, 68);
        assert_eq!(scored.safety_level, SafetyLevel::Moderate);
    }

    #[test]
    fn breakdown_carries_configured_weights() {
        let scorer = Scorer::new();
        let breakdown = scorer.breakdown(&moderate_zone());
        for (factor, score) in breakdown.iter() {
            assert!((score.weight - scorer.weights().get(factor)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn custom_weights_change_the_score() {
        let weights = ScoreWeights {
            climate_resilience: 0.0,
            green_infrastructure: 0.0,
            waste_management: 0.0,
            emergency_capacity: 1.0,
            community_rating: 0.0,
            air_quality: 0.0,
        };
        let scorer = Scorer::with_weights(weights).unwrap();
        assert_eq!(scorer.score(&moderate_zone()), 100);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let weights = ScoreWeights {
            climate_resilience: 0.5,
            ..ScoreWeights::default()
        };
        assert!(matches!(
            Scorer::with_weights(weights),
            Err(ScoringError::WeightSum { .. })
        ));
    }

    #[test]
    fn empty_zone_scores_from_floors() {
        let scorer = Scorer::new();
        let breakdown = scorer.breakdown(&Zone::new("e", "Empty"));
        // climate 100, emergency floor 30, unknown air 50
        assert_eq!(breakdown.climate_resilience.score, 100);
        assert_eq!(breakdown.emergency_capacity.score, 30);
        assert_eq!(breakdown.air_quality.score, 50);
        assert_eq!(Scorer::composite(&breakdown), 32);
    }

    #[test]
    fn recommendations_for_moderate_zone() {
        let recs = Scorer::new().recommendations(&moderate_zone());
        let categories: Vec<ScoreFactor> = recs.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![ScoreFactor::GreenInfrastructure, ScoreFactor::WasteManagement]
        );
    }

    #[test]
    fn adding_infrastructure_never_lowers_the_score() {
        let scorer = Scorer::new();
        let mut zone = moderate_zone();
        let before = scorer.score(&zone);
        zone.green_infrastructure.push("Flood barriers".to_string());
        zone.green_infrastructure.push("Waste-to-energy".to_string());
        assert!(scorer.score(&zone) >= before);
    }

    #[test]
    fn any_single_infrastructure_tag_never_lowers_an_untagged_zone() {
        let scorer = Scorer::new();
        let empty = Zone::new("g", "Bare");
        let bare_green = factors::green_infrastructure(&empty);
        let bare_score = scorer.score(&empty);

        let tags = factors::GREEN_INFRASTRUCTURE_POINTS
            .iter()
            .chain(factors::WASTE_INFRASTRUCTURE_POINTS)
            .map(|(tag, _)| *tag);
        for tag in tags {
            let mut tagged = empty.clone();
            tagged.green_infrastructure.push(tag.to_string());
            assert!(factors::green_infrastructure(&tagged) >= bare_green, "{tag}");
            assert!(scorer.score(&tagged) >= bare_score, "{tag}");
        }
    }

    #[test]
    fn adding_high_risk_never_raises_the_score() {
        let scorer = Scorer::new();
        let mut zone = moderate_zone();
        let before = scorer.score(&zone);
        zone.climate_risks.push("High heat risk".to_string());
        assert!(scorer.score(&zone) <= before);
    }

    const RISK_TEXT: &[&str] = &[
        "Low flood risk",
        "Moderate heat risk",
        "High flood risk",
        "Low rainfall",
        "Landslides",
    ];

    const INFRA_TEXT: &[&str] = &[
        "Solar panels",
        "Wind turbines",
        "Waste-to-energy",
        "Rainwater harvesting",
        "Green roof",
        "Flood barriers",
        "Composting facilities",
        "Recycling facilities",
        "Urban forest",
    ];

    fn arb_zone() -> impl Strategy<Value = Zone> {
        (
            prop::sample::subsequence(RISK_TEXT, 0..=RISK_TEXT.len()),
            prop::sample::subsequence(INFRA_TEXT, 0..=INFRA_TEXT.len()),
            0_u32..20,
            0_u32..2000,
            -2.0_f64..8.0,
            prop::sample::select(vec![
                AirQuality::Excellent,
                AirQuality::Good,
                AirQuality::Moderate,
                AirQuality::Poor,
                AirQuality::VeryPoor,
                AirQuality::Unknown,
            ]),
        )
            .prop_map(|(risks, infra, centers, capacity, rating, air)| {
                let mut zone = Zone::new("p", "Generated");
                zone.coords = Some(Coordinates::new(-1.95, 30.06));
                zone.climate_risks = strings(&risks);
                zone.green_infrastructure = strings(&infra);
                zone.recycling_centers = centers;
                zone.emergency_capacity = capacity;
                zone.community_rating = rating;
                zone.air_quality = air;
                zone
            })
    }

    proptest! {
        #[test]
        fn scores_stay_in_range(zone in arb_zone()) {
            let scorer = Scorer::new();
            let breakdown = scorer.breakdown(&zone);
            for (_, factor) in breakdown.iter() {
                prop_assert!(factor.score <= 100);
            }
            let score = Scorer::composite(&breakdown);
            prop_assert!(score <= 100);
            prop_assert_eq!(Scorer::safety_level(score), SafetyLevel::from_score(score));
        }

        #[test]
        fn more_capacity_never_lowers_the_score(zone in arb_zone(), extra in 0_u32..500) {
            let scorer = Scorer::new();
            let before = scorer.score(&zone);
            let mut bigger = zone;
            bigger.emergency_capacity += extra;
            prop_assert!(scorer.score(&bigger) >= before);
        }

        #[test]
        fn one_infrastructure_tag_never_lowers_an_untagged_zone(
            tag in prop::sample::select(INFRA_TEXT),
        ) {
            let empty = Zone::new("g", "Bare");
            let mut tagged = empty.clone();
            tagged.green_infrastructure.push(tag.to_string());
            prop_assert!(
                factors::green_infrastructure(&tagged) >= factors::green_infrastructure(&empty)
            );
            prop_assert!(Scorer::new().score(&tagged) >= Scorer::new().score(&empty));
        }

        #[test]
        fn decay_never_increases_with_distance(
            base in 0.0_f64..100.0,
            near in 0.0_f64..20.0,
            delta in 0.0_f64..20.0,
        ) {
            prop_assert!(distance_decay(base, near + delta) <= distance_decay(base, near));
            prop_assert!(distance_decay(base, near) <= base);
        }
    }
}

//! Human-readable reports derived from a zone's score: improvement
//! recommendations and climate risk assessment.

use safe_zone_models::{ScoreBreakdown, ScoreFactor, Zone};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::factors::RiskSeverity;

/// Urgency of an improvement recommendation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum Priority {
    /// Address soon.
    Medium,
    /// Address first.
    High,
}

/// A block of suggestions for one under-performing factor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// The factor that fell below its floor.
    pub category: ScoreFactor,
    /// How urgent the improvements are.
    pub priority: Priority,
    /// Concrete improvement suggestions.
    pub suggestions: Vec<String>,
}

struct RecommendationRule {
    factor: ScoreFactor,
    floor: u8,
    priority: Priority,
    suggestions: &'static [&'static str],
}

/// Rules in emission order.
const RECOMMENDATION_RULES: &[RecommendationRule] = &[
    RecommendationRule {
        factor: ScoreFactor::ClimateResilience,
        floor: 70,
        priority: Priority::High,
        suggestions: &[
            "Install flood barriers and drainage systems",
            "Add cooling systems for heatwave protection",
            "Implement early warning systems",
            "Create elevated emergency shelters",
        ],
    },
    RecommendationRule {
        factor: ScoreFactor::GreenInfrastructure,
        floor: 60,
        priority: Priority::High,
        suggestions: &[
            "Install solar panels for renewable energy",
            "Implement rainwater harvesting systems",
            "Create community gardens and green spaces",
            "Add waste-to-energy facilities",
        ],
    },
    RecommendationRule {
        factor: ScoreFactor::WasteManagement,
        floor: 50,
        priority: Priority::Medium,
        suggestions: &[
            "Establish recycling centers nearby",
            "Implement composting facilities",
            "Add waste processing capabilities",
            "Create waste reduction education programs",
        ],
    },
    RecommendationRule {
        factor: ScoreFactor::EmergencyCapacity,
        floor: 60,
        priority: Priority::Medium,
        suggestions: &[
            "Expand emergency shelter capacity",
            "Add medical facilities and supplies",
            "Improve communication systems",
            "Create backup power systems",
        ],
    },
];

/// Builds recommendations for every factor below its floor.
#[must_use]
pub fn recommendations_for(breakdown: &ScoreBreakdown) -> Vec<Recommendation> {
    RECOMMENDATION_RULES
        .iter()
        .filter(|rule| breakdown.get(rule.factor).score < rule.floor)
        .map(|rule| Recommendation {
            category: rule.factor,
            priority: rule.priority,
            suggestions: rule.suggestions.iter().map(ToString::to_string).collect(),
        })
        .collect()
}

/// Overall climate risk level of a zone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum RiskLevel {
    /// Risk points below 3.
    Low,
    /// Risk points 3-5.
    Moderate,
    /// Risk points 6 and above.
    High,
}

impl RiskLevel {
    /// Maps accumulated risk points to a level.
    #[must_use]
    pub const fn from_points(points: u32) -> Self {
        match points {
            6.. => Self::High,
            3..=5 => Self::Moderate,
            _ => Self::Low,
        }
    }
}

/// Hazard type detected in a zone's climate risks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum RiskCategory {
    /// Flooding.
    #[strum(serialize = "Flood Risk")]
    Flood,
    /// Heat waves.
    #[strum(serialize = "Heat Risk")]
    Heat,
    /// Air pollution.
    #[strum(serialize = "Air Quality Risk")]
    AirQuality,
}

impl RiskCategory {
    /// Categories in report order.
    const ALL: &[Self] = &[Self::Flood, Self::Heat, Self::AirQuality];

    /// Lowercase keyword that identifies this category in risk text.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Flood => "flood",
            Self::Heat => "heat",
            Self::AirQuality => "air",
        }
    }

    /// Mitigation measures for this hazard.
    #[must_use]
    pub const fn mitigation(self) -> &'static str {
        match self {
            Self::Flood => "Elevated structures, flood barriers, drainage systems",
            Self::Heat => "Cooling centers, green roofs, shade structures",
            Self::AirQuality => "Air purification systems, indoor facilities",
        }
    }
}

/// A detected hazard and how to mitigate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    /// The hazard.
    pub category: RiskCategory,
    /// Recommended mitigation measures.
    pub mitigation: String,
}

/// Climate risk summary for a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Overall risk level.
    pub overall_risk: RiskLevel,
    /// Accumulated severity points.
    pub risk_points: u32,
    /// Detected hazards in flood, heat, air order.
    pub risk_factors: Vec<RiskFactor>,
}

/// Assesses a zone's climate risks.
#[must_use]
pub fn assess_climate_risk(zone: &Zone) -> RiskAssessment {
    let risk_points = zone
        .climate_risks
        .iter()
        .filter_map(|risk| RiskSeverity::classify(risk))
        .map(RiskSeverity::risk_points)
        .sum();

    let lowered: Vec<String> = zone
        .climate_risks
        .iter()
        .map(|risk| risk.to_lowercase())
        .collect();

    let risk_factors = RiskCategory::ALL
        .iter()
        .filter(|category| lowered.iter().any(|risk| risk.contains(category.keyword())))
        .map(|category| RiskFactor {
            category: *category,
            mitigation: category.mitigation().to_string(),
        })
        .collect();

    RiskAssessment {
        overall_risk: RiskLevel::from_points(risk_points),
        risk_points,
        risk_factors,
    }
}

/// Discounts a score for a zone surfaced by proximity search.
///
/// The discount grows with distance in fixed bands. Callers apply it at
/// presentation time; the canonical score is not changed.
#[must_use]
pub fn distance_decay(base_score: f64, distance_km: f64) -> f64 {
    if distance_km <= 1.0 {
        base_score
    } else if distance_km <= 3.0 {
        base_score * 0.9
    } else if distance_km <= 5.0 {
        base_score * 0.8
    } else if distance_km <= 10.0 {
        base_score * 0.7
    } else {
        base_score * 0.6
    }
}

#[cfg(test)]
mod tests {
    use safe_zone_models::FactorScore;

    use super::*;

    fn breakdown(climate: u8, green: u8, waste: u8, emergency: u8) -> ScoreBreakdown {
        ScoreBreakdown {
            climate_resilience: FactorScore::new(climate, 0.25),
            green_infrastructure: FactorScore::new(green, 0.25),
            waste_management: FactorScore::new(waste, 0.20),
            emergency_capacity: FactorScore::new(emergency, 0.15),
            community_rating: FactorScore::new(0, 0.10),
            air_quality: FactorScore::new(0, 0.05),
        }
    }

    #[test]
    fn no_recommendations_when_all_floors_clear() {
        assert!(recommendations_for(&breakdown(70, 60, 50, 60)).is_empty());
    }

    #[test]
    fn recommendations_follow_fixed_order() {
        let recs = recommendations_for(&breakdown(69, 59, 49, 59));
        let order: Vec<ScoreFactor> = recs.iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![
                ScoreFactor::ClimateResilience,
                ScoreFactor::GreenInfrastructure,
                ScoreFactor::WasteManagement,
                ScoreFactor::EmergencyCapacity,
            ]
        );
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[1].priority, Priority::High);
        assert_eq!(recs[2].priority, Priority::Medium);
        assert_eq!(recs[3].priority, Priority::Medium);
        assert!(recs.iter().all(|r| r.suggestions.len() == 4));
    }

    #[test]
    fn only_failing_factors_are_reported() {
        let recs = recommendations_for(&breakdown(95, 35, 30, 100));
        let order: Vec<ScoreFactor> = recs.iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![ScoreFactor::GreenInfrastructure, ScoreFactor::WasteManagement]
        );
    }

    #[test]
    fn risk_level_thresholds() {
        assert_eq!(RiskLevel::from_points(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_points(2), RiskLevel::Low);
        assert_eq!(RiskLevel::from_points(3), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_points(5), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_points(6), RiskLevel::High);
    }

    #[test]
    fn assesses_mixed_risks() {
        let mut zone = Zone::new("z", "Zone");
        zone.climate_risks = vec![
            "High flood risk".to_string(),
            "Moderate Heat risk".to_string(),
            "Low landslide risk".to_string(),
        ];
        let assessment = assess_climate_risk(&zone);
        assert_eq!(assessment.risk_points, 6);
        assert_eq!(assessment.overall_risk, RiskLevel::High);
        let categories: Vec<RiskCategory> =
            assessment.risk_factors.iter().map(|f| f.category).collect();
        assert_eq!(categories, vec![RiskCategory::Flood, RiskCategory::Heat]);
        assert_eq!(
            assessment.risk_factors[0].mitigation,
            "Elevated structures, flood barriers, drainage systems"
        );
    }

    #[test]
    fn air_keyword_is_case_insensitive() {
        let mut zone = Zone::new("z", "Zone");
        zone.climate_risks = vec!["Low AIR pollution".to_string()];
        let assessment = assess_climate_risk(&zone);
        assert_eq!(assessment.overall_risk, RiskLevel::Low);
        assert_eq!(assessment.risk_factors.len(), 1);
        assert_eq!(assessment.risk_factors[0].category, RiskCategory::AirQuality);
    }

    #[test]
    fn no_risks_means_low_and_no_factors() {
        let assessment = assess_climate_risk(&Zone::new("z", "Zone"));
        assert_eq!(assessment.overall_risk, RiskLevel::Low);
        assert!(assessment.risk_factors.is_empty());
    }

    #[test]
    fn distance_decay_bands() {
        assert!((distance_decay(100.0, 0.5) - 100.0).abs() < f64::EPSILON);
        assert!((distance_decay(100.0, 1.0) - 100.0).abs() < f64::EPSILON);
        assert!((distance_decay(100.0, 2.0) - 90.0).abs() < 1e-9);
        assert!((distance_decay(100.0, 5.0) - 80.0).abs() < 1e-9);
        assert!((distance_decay(100.0, 7.5) - 70.0).abs() < 1e-9);
        assert!((distance_decay(100.0, 25.0) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn distance_decay_is_non_increasing() {
        let mut previous = f64::INFINITY;
        for step in 0..=300 {
            let distance = f64::from(step) * 0.05;
            let decayed = distance_decay(80.0, distance);
            assert!(decayed <= previous, "decay increased at {distance} km");
            previous = decayed;
        }
    }
}

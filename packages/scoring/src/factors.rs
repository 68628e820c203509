//! Sub-score algorithms for each scoring factor.
//!
//! Every function returns a value clamped to `0..=100`. Clamping happens
//! after all additions and deductions, so intermediate totals may leave the
//! range.
//!
//! Tags are matched by case-sensitive substring: a tag is present when any
//! entry of the list contains the vocabulary term. Severity keywords in
//! climate risk text are matched the same way, so `"Low rainfall"` counts as
//! a low-severity risk.

use safe_zone_models::{AirQuality, Zone};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Severity keyword embedded in a climate risk description.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum RiskSeverity {
    /// `"Low"`.
    Low,
    /// `"Moderate"`.
    Moderate,
    /// `"High"`.
    High,
}

impl RiskSeverity {
    /// Keywords in match priority order. The first one found wins.
    const BY_PRIORITY: &[Self] = &[Self::High, Self::Moderate, Self::Low];

    /// Finds the severity keyword in a risk description, if any.
    #[must_use]
    pub fn classify(risk: &str) -> Option<Self> {
        Self::BY_PRIORITY
            .iter()
            .copied()
            .find(|severity| {
                let keyword: &str = severity.as_ref();
                risk.contains(keyword)
            })
    }

    /// Points deducted from climate resilience for one risk of this severity.
    #[must_use]
    pub const fn resilience_penalty(self) -> i32 {
        match self {
            Self::High => 30,
            Self::Moderate => 15,
            Self::Low => 5,
        }
    }

    /// Points added to the risk assessment total for one risk of this severity.
    #[must_use]
    pub const fn risk_points(self) -> u32 {
        match self {
            Self::High => 3,
            Self::Moderate => 2,
            Self::Low => 1,
        }
    }
}

/// Infrastructure that protects against floods and heat.
pub const RESILIENCE_BONUS_TAGS: &[&str] = &[
    "Flood barriers",
    "Elevated structures",
    "Green roof",
    "Cooling systems",
];

/// Bonus per protective infrastructure tag.
pub const RESILIENCE_BONUS: i32 = 10;

/// Points per green infrastructure tag.
pub const GREEN_INFRASTRUCTURE_POINTS: &[(&str, i32)] = &[
    // Renewable energy
    ("Solar panels", 20),
    ("Wind turbines", 15),
    ("Waste-to-energy", 25),
    // Water management
    ("Rainwater harvesting", 15),
    ("Water recycling", 15),
    ("Water purification", 10),
    // Green spaces
    ("Community garden", 10),
    ("Urban forest", 15),
    ("Biodiversity garden", 10),
    ("Vertical gardens", 10),
    ("Green roof", 10),
    ("Natural ventilation", 5),
];

/// Recycling center count tiers, highest threshold first.
pub const RECYCLING_CENTER_TIERS: &[(u32, i32)] = &[(5, 30), (3, 20), (1, 10)];

/// Waste processing infrastructure points.
pub const WASTE_INFRASTRUCTURE_POINTS: &[(&str, i32)] = &[
    ("Waste-to-energy", 25),
    ("Composting facilities", 15),
    ("Recycling facilities", 20),
];

/// Waste reduction feature points.
pub const WASTE_FEATURE_POINTS: &[(&str, i32)] =
    &[("Waste processing", 10), ("Community education", 5)];

/// Running waste total at which the comprehensive-management bonus applies.
pub const COMPREHENSIVE_WASTE_THRESHOLD: i32 = 60;

/// Comprehensive waste management bonus.
pub const COMPREHENSIVE_WASTE_BONUS: i32 = 10;

/// Emergency capacity tiers, highest threshold first.
pub const EMERGENCY_CAPACITY_TIERS: &[(u32, u8)] = &[(200, 100), (150, 85), (100, 70), (50, 50)];

/// Emergency capacity score below the lowest tier.
pub const EMERGENCY_CAPACITY_FLOOR: u8 = 30;

/// Returns `true` if any tag contains `term`.
#[must_use]
pub fn has_tag(tags: &[String], term: &str) -> bool {
    tags.iter().any(|tag| tag.contains(term))
}

fn tag_points(tags: &[String], table: &[(&str, i32)]) -> i32 {
    table
        .iter()
        .filter(|(term, _)| has_tag(tags, term))
        .map(|(_, points)| points)
        .sum()
}

fn clamp_score(raw: i32) -> u8 {
    u8::try_from(raw.clamp(0, 100)).unwrap_or(0)
}

/// Climate resilience: starts at 100, loses points per climate risk, gains
/// points per protective infrastructure tag.
#[must_use]
pub fn climate_resilience(zone: &Zone) -> u8 {
    let penalty: i32 = zone
        .climate_risks
        .iter()
        .filter_map(|risk| RiskSeverity::classify(risk))
        .map(RiskSeverity::resilience_penalty)
        .sum();

    let bonus: i32 = RESILIENCE_BONUS_TAGS
        .iter()
        .filter(|term| has_tag(&zone.green_infrastructure, term))
        .map(|_| RESILIENCE_BONUS)
        .sum();

    clamp_score(100 - penalty + bonus)
}

/// Green infrastructure: sum of points for each recognised tag.
#[must_use]
pub fn green_infrastructure(zone: &Zone) -> u8 {
    clamp_score(tag_points(
        &zone.green_infrastructure,
        GREEN_INFRASTRUCTURE_POINTS,
    ))
}

/// Waste management: recycling center tier, processing infrastructure,
/// waste reduction features, and a bonus for comprehensive coverage.
#[must_use]
pub fn waste_management(zone: &Zone) -> u8 {
    let tier = RECYCLING_CENTER_TIERS
        .iter()
        .find(|(min, _)| zone.recycling_centers >= *min)
        .map_or(0, |(_, points)| *points);

    let mut total = tier
        + tag_points(&zone.green_infrastructure, WASTE_INFRASTRUCTURE_POINTS)
        + tag_points(&zone.features, WASTE_FEATURE_POINTS);

    if total >= COMPREHENSIVE_WASTE_THRESHOLD {
        total += COMPREHENSIVE_WASTE_BONUS;
    }

    clamp_score(total)
}

/// Emergency capacity: tiered on shelter capacity.
#[must_use]
pub fn emergency_capacity(zone: &Zone) -> u8 {
    EMERGENCY_CAPACITY_TIERS
        .iter()
        .find(|(min, _)| zone.emergency_capacity >= *min)
        .map_or(EMERGENCY_CAPACITY_FLOOR, |(_, score)| *score)
}

/// Community rating: a 0-5 star rating scaled to 0-100.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn community_rating(zone: &Zone) -> u8 {
    let scaled = (zone.community_rating * 20.0).round();
    if !scaled.is_finite() {
        return 0;
    }
    scaled.clamp(0.0, 100.0) as u8
}

/// Air quality: fixed lookup per quality level.
#[must_use]
pub const fn air_quality(zone: &Zone) -> u8 {
    match zone.air_quality {
        AirQuality::Excellent => 100,
        AirQuality::Good => 80,
        AirQuality::Moderate => 60,
        AirQuality::Poor => 30,
        AirQuality::VeryPoor => 10,
        AirQuality::Unknown => 50,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> Zone {
        Zone::new("t", "Test")
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn first_severity_keyword_wins() {
        assert_eq!(
            RiskSeverity::classify("High heat, Low flood"),
            Some(RiskSeverity::High)
        );
        assert_eq!(
            RiskSeverity::classify("Moderate flood risk"),
            Some(RiskSeverity::Moderate)
        );
        assert_eq!(RiskSeverity::classify("Low heat risk"), Some(RiskSeverity::Low));
        assert_eq!(RiskSeverity::classify("high heat risk"), None);
    }

    #[test]
    fn climate_resilience_deducts_and_rewards() {
        let mut z = zone();
        z.climate_risks = tags(&["High flood risk", "Moderate heat risk", "Low air risk"]);
        assert_eq!(climate_resilience(&z), 50);

        z.green_infrastructure = tags(&["Flood barriers", "Cooling systems"]);
        assert_eq!(climate_resilience(&z), 70);
    }

    #[test]
    fn climate_resilience_clamps_both_ends() {
        let mut z = zone();
        z.green_infrastructure = tags(RESILIENCE_BONUS_TAGS);
        assert_eq!(climate_resilience(&z), 100);

        z.green_infrastructure.clear();
        z.climate_risks = tags(&["High a", "High b", "High c", "High d"]);
        assert_eq!(climate_resilience(&z), 0);
    }

    #[test]
    fn unrelated_risk_text_is_ignored() {
        let mut z = zone();
        z.climate_risks = tags(&["Landslides nearby"]);
        assert_eq!(climate_resilience(&z), 100);
    }

    #[test]
    fn green_infrastructure_caps_at_100() {
        let mut z = zone();
        let all: Vec<&str> = GREEN_INFRASTRUCTURE_POINTS.iter().map(|(t, _)| *t).collect();
        z.green_infrastructure = tags(&all);
        assert_eq!(green_infrastructure(&z), 100);
    }

    #[test]
    fn green_infrastructure_matches_substrings() {
        let mut z = zone();
        z.green_infrastructure = tags(&["Rooftop Solar panels (50kW)"]);
        assert_eq!(green_infrastructure(&z), 20);
    }

    #[test]
    fn waste_management_tiers() {
        let mut z = zone();
        assert_eq!(waste_management(&z), 0);
        z.recycling_centers = 1;
        assert_eq!(waste_management(&z), 10);
        z.recycling_centers = 3;
        assert_eq!(waste_management(&z), 20);
        z.recycling_centers = 8;
        assert_eq!(waste_management(&z), 30);
    }

    #[test]
    fn waste_management_comprehensive_bonus() {
        let mut z = zone();
        z.recycling_centers = 5;
        z.green_infrastructure = tags(&["Waste-to-energy"]);
        z.features = tags(&["Community education"]);
        // 30 + 25 + 5 = 60, bonus applies
        assert_eq!(waste_management(&z), 70);

        z.features.clear();
        // 30 + 25 = 55, no bonus
        assert_eq!(waste_management(&z), 55);
    }

    #[test]
    fn waste_management_caps_at_100() {
        let mut z = zone();
        z.recycling_centers = 10;
        z.green_infrastructure = tags(&[
            "Waste-to-energy",
            "Composting facilities",
            "Recycling facilities",
        ]);
        z.features = tags(&["Waste processing", "Community education"]);
        assert_eq!(waste_management(&z), 100);
    }

    #[test]
    fn emergency_capacity_tiers() {
        let mut z = zone();
        for (capacity, expected) in [
            (0, 30),
            (49, 30),
            (50, 50),
            (100, 70),
            (150, 85),
            (199, 85),
            (200, 100),
            (5000, 100),
        ] {
            z.emergency_capacity = capacity;
            assert_eq!(emergency_capacity(&z), expected, "capacity {capacity}");
        }
    }

    #[test]
    fn community_rating_scales_and_clamps() {
        let mut z = zone();
        z.community_rating = 4.5;
        assert_eq!(community_rating(&z), 90);
        z.community_rating = 5.0;
        assert_eq!(community_rating(&z), 100);
        z.community_rating = 4.83;
        assert_eq!(community_rating(&z), 97);
        z.community_rating = 7.0;
        assert_eq!(community_rating(&z), 100);
        z.community_rating = -1.0;
        assert_eq!(community_rating(&z), 0);
        z.community_rating = f64::NAN;
        assert_eq!(community_rating(&z), 0);
    }

    #[test]
    fn air_quality_lookup() {
        let mut z = zone();
        for (quality, expected) in [
            (AirQuality::Excellent, 100),
            (AirQuality::Good, 80),
            (AirQuality::Moderate, 60),
            (AirQuality::Poor, 30),
            (AirQuality::VeryPoor, 10),
            (AirQuality::Unknown, 50),
        ] {
            z.air_quality = quality;
            assert_eq!(air_quality(&z), expected);
        }
    }
}

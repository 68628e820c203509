//! Search, proximity, and insight views over scored zones.

use safe_zone_models::{Coordinates, ScoredZone};
use safe_zone_scoring::{Recommendation, RiskAssessment, distance_decay};
use serde::{Deserialize, Serialize};

/// Minimum score matched by [`ZoneFilter::HighScore`].
pub const HIGH_SCORE_THRESHOLD: u8 = 85;

/// Structured filter applied on top of a text search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum ZoneFilter {
    /// No filtering.
    #[default]
    All,
    /// Score of at least [`HIGH_SCORE_THRESHOLD`].
    HighScore,
    /// Any climate risk mentioning `"Low"`.
    LowRisk,
    /// Exact district name.
    District(String),
}

impl ZoneFilter {
    /// Returns `true` if `zone` passes this filter.
    #[must_use]
    pub fn matches(&self, zone: &ScoredZone) -> bool {
        match self {
            Self::All => true,
            Self::HighScore => zone.safety_score >= HIGH_SCORE_THRESHOLD,
            Self::LowRisk => zone.zone.climate_risks.iter().any(|r| r.contains("Low")),
            Self::District(district) => zone.zone.district == *district,
        }
    }
}

/// Text plus filter. An empty text matches every zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneQuery {
    /// Case-insensitive text to find. Blank matches everything.
    #[serde(default)]
    pub text: String,
    /// Structured filter applied on top of the text match.
    #[serde(default)]
    pub filter: ZoneFilter,
}

impl ZoneQuery {
    /// Creates a query from search text and a filter.
    #[must_use]
    pub fn new(text: impl Into<String>, filter: ZoneFilter) -> Self {
        Self {
            text: text.into(),
            filter,
        }
    }

    /// Case-insensitive match of the text against name, address, and
    /// district, combined with the filter.
    #[must_use]
    pub fn matches(&self, zone: &ScoredZone) -> bool {
        self.filter.matches(zone) && self.text_matches(zone)
    }

    fn text_matches(&self, zone: &ScoredZone) -> bool {
        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&zone.zone.name, &zone.zone.address, &zone.zone.district]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// A zone found by proximity, with its distance-discounted score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyZone {
    /// The scored zone.
    #[serde(flatten)]
    pub zone: ScoredZone,
    /// Great-circle distance from the search origin.
    pub distance_km: f64,
    /// `safetyScore` after distance decay, rounded. Presentation only.
    pub adjusted_score: u8,
}

impl NearbyZone {
    /// Pairs `zone` with its distance and decayed score.
    #[must_use]
    pub fn new(zone: ScoredZone, distance_km: f64) -> Self {
        let adjusted = distance_decay(f64::from(zone.safety_score), distance_km)
            .round()
            .clamp(0.0, 100.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let adjusted_score = adjusted as u8;
        Self {
            zone,
            distance_km,
            adjusted_score,
        }
    }
}

/// Everything known about a single zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInsights {
    /// The scored zone.
    pub zone: ScoredZone,
    /// Improvement suggestions for weak factors.
    pub recommendations: Vec<Recommendation>,
    /// Climate risk summary.
    pub risk_assessment: RiskAssessment,
}

/// Zones within `radius_km` of `origin`, nearest first.
///
/// Zones without valid coordinates are skipped.
#[must_use]
pub fn nearby_zones(
    zones: Vec<ScoredZone>,
    origin: Coordinates,
    radius_km: f64,
) -> Vec<NearbyZone> {
    safe_zone_spatial::sort_by_distance(origin, zones, |zone| {
        zone.zone.coords.filter(Coordinates::is_valid)
    })
    .into_iter()
    .take_while(|(_, distance)| *distance <= radius_km)
    .map(|(zone, distance)| NearbyZone::new(zone, distance))
    .collect()
}

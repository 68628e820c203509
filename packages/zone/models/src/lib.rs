#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Safe zone data model.
//!
//! Defines the zone, alert, recycling center, air quality, and issue report
//! types shared by the scorer, the remote sources, and the data service.
//! Field names serialize as `camelCase` so the same types round-trip through
//! the remote API and the local key-value store.

pub mod alert;
pub mod facility;
pub mod report;
pub mod score;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use alert::{AlertSeverity, ClimateAlert};
pub use facility::{AirQualityReading, RecyclingCenter};
pub use report::{IssueReport, MutationResult, ReportResult, ReportStatus};
pub use score::{FactorScore, ScoreBreakdown, ScoreFactor, ScoredZone, SafetyLevel};

/// Identifier of a zone, alert, or recycling center.
///
/// The remote API hands out both numeric and string ids. Both deserialize
/// into the same string-backed id, and ids always serialize as strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawRecordId", into = "String")]
pub struct RecordId(String);

/// Zone identifier.
pub type ZoneId = RecordId;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawRecordId> for RecordId {
    fn from(raw: RawRecordId) -> Self {
        match raw {
            RawRecordId::Text(s) => Self(s),
            RawRecordId::Signed(n) => Self(n.to_string()),
            RawRecordId::Unsigned(n) => Self(n.to_string()),
        }
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl RecordId {
    /// Creates an id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if both components are finite and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Operational status of a zone.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZoneStatus {
    /// Open and accepting people.
    #[default]
    Active,
    /// Closed or out of service.
    Inactive,
}

/// Reported air quality at a zone.
///
/// Parsing is case-insensitive and never fails: anything unrecognised
/// becomes [`AirQuality::Unknown`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum AirQuality {
    /// Clean air.
    Excellent,
    /// Satisfactory.
    Good,
    /// Acceptable, sensitive groups may be affected.
    Moderate,
    /// Unhealthy.
    Poor,
    /// Very unhealthy.
    #[strum(serialize = "Very Poor")]
    VeryPoor,
    /// No reading available.
    #[default]
    Unknown,
}

impl AirQuality {
    /// Parses an air quality label, falling back to [`AirQuality::Unknown`].
    #[must_use]
    pub fn parse(label: &str) -> Self {
        label.trim().parse().unwrap_or_default()
    }
}

impl From<String> for AirQuality {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<AirQuality> for String {
    fn from(quality: AirQuality) -> Self {
        quality.to_string()
    }
}

/// A physical location evaluated as a climate safe zone.
///
/// Everything except `id` defaults when absent so partially populated
/// upstream records still deserialize. A zone is only scoreable when
/// `coords` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Stable identifier.
    pub id: ZoneId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// Administrative district.
    #[serde(default)]
    pub district: String,
    /// Administrative sector within the district.
    #[serde(default)]
    pub sector: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Location of the zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Coordinates>,
    /// Climate risks, each carrying a severity keyword in its text
    /// (e.g. `"Low flood risk"`).
    #[serde(default)]
    pub climate_risks: Vec<String>,
    /// Green infrastructure tags (e.g. `"Solar panels"`).
    #[serde(default)]
    pub green_infrastructure: Vec<String>,
    /// Number of nearby recycling facilities.
    #[serde(default)]
    pub recycling_centers: u32,
    /// Reported air quality.
    #[serde(default)]
    pub air_quality: AirQuality,
    /// Emergency shelter capacity in people.
    #[serde(default)]
    pub emergency_capacity: u32,
    /// Community rating on a 0-5 scale.
    #[serde(default)]
    pub community_rating: f64,
    /// Capability tags (e.g. `"Waste processing"`).
    #[serde(default)]
    pub features: Vec<String>,
    /// Operational status.
    #[serde(default)]
    pub status: ZoneStatus,
}

impl Zone {
    /// Creates an empty zone with the given id and name. All scoring
    /// attributes start at their defaults.
    #[must_use]
    pub fn new(id: impl Into<ZoneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            district: String::new(),
            sector: String::new(),
            description: None,
            coords: None,
            climate_risks: Vec::new(),
            green_infrastructure: Vec::new(),
            recycling_centers: 0,
            air_quality: AirQuality::Unknown,
            emergency_capacity: 0,
            community_rating: 0.0,
            features: Vec::new(),
            status: ZoneStatus::Active,
        }
    }

    /// Returns `true` if the zone carries valid coordinates and can be scored.
    #[must_use]
    pub fn is_scoreable(&self) -> bool {
        self.coords.is_some_and(|c| c.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_accepts_numbers_and_strings() {
        let numeric: RecordId = serde_json::from_str("42").unwrap();
        let text: RecordId = serde_json::from_str("\"zone-7\"").unwrap();
        assert_eq!(numeric.as_str(), "42");
        assert_eq!(text.as_str(), "zone-7");
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "\"42\"");
    }

    #[test]
    fn air_quality_parses_case_insensitively() {
        assert_eq!(AirQuality::parse("excellent"), AirQuality::Excellent);
        assert_eq!(AirQuality::parse("VERY POOR"), AirQuality::VeryPoor);
        assert_eq!(AirQuality::parse(" Good "), AirQuality::Good);
        assert_eq!(AirQuality::parse("smoky"), AirQuality::Unknown);
        assert_eq!(AirQuality::VeryPoor.to_string(), "Very Poor");
    }

    #[test]
    fn zone_defaults_missing_fields() {
        let zone: Zone = serde_json::from_str(r#"{"id": 3, "name": "Depot"}"#).unwrap();
        assert_eq!(zone.id, RecordId::from(3_u64));
        assert!(zone.climate_risks.is_empty());
        assert_eq!(zone.air_quality, AirQuality::Unknown);
        assert_eq!(zone.status, ZoneStatus::Active);
        assert!(!zone.is_scoreable());
    }

    #[test]
    fn zone_reads_camel_case_fields() {
        let zone: Zone = serde_json::from_str(
            r#"{
                "id": "a",
                "coords": {"latitude": -1.95, "longitude": 30.05},
                "greenInfrastructure": ["Solar panels"],
                "recyclingCenters": 4,
                "airQuality": "moderate",
                "emergencyCapacity": 120,
                "communityRating": 4.2,
                "status": "inactive"
            }"#,
        )
        .unwrap();
        assert!(zone.is_scoreable());
        assert_eq!(zone.green_infrastructure, vec!["Solar panels"]);
        assert_eq!(zone.recycling_centers, 4);
        assert_eq!(zone.air_quality, AirQuality::Moderate);
        assert_eq!(zone.status, ZoneStatus::Inactive);
    }

    #[test]
    fn out_of_range_coordinates_are_not_scoreable() {
        let mut zone = Zone::new("x", "X");
        zone.coords = Some(Coordinates::new(95.0, 30.0));
        assert!(!zone.is_scoreable());
        zone.coords = Some(Coordinates::new(-1.9, f64::NAN));
        assert!(!zone.is_scoreable());
    }
}

//! Recycling center and air quality reading types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{AirQuality, Coordinates, RecordId};

/// A recycling or waste management facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecyclingCenter {
    /// Facility identifier.
    pub id: RecordId,
    /// Facility name.
    #[serde(default)]
    pub name: String,
    /// Facility location.
    pub coords: Coordinates,
    /// Accepted material types (e.g. `"Plastic"`, `"Glass"`).
    #[serde(default)]
    pub types: Vec<String>,
    /// Opening hours.
    #[serde(default)]
    pub hours: String,
    /// Contact phone number.
    #[serde(default)]
    pub contact: String,
    /// Capacity label (e.g. `"High"`).
    #[serde(default)]
    pub capacity: String,
    /// Operational status label (e.g. `"Operational"`).
    #[serde(default)]
    pub status: String,
}

/// Air quality at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityReading {
    /// Qualitative air quality.
    #[serde(default)]
    pub quality: AirQuality,
    /// Air quality index value.
    #[serde(default, deserialize_with = "lenient_aqi")]
    pub aqi: u32,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// When the reading was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAqi {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

/// Reads an AQI sent as an integer, a float, or numeric text. Values are
/// rounded and clamped to the `u32` range; non-numeric text reads as 0.
fn lenient_aqi<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = match RawAqi::deserialize(deserializer)? {
        RawAqi::Unsigned(n) => return Ok(u32::try_from(n).unwrap_or(u32::MAX)),
        RawAqi::Signed(n) => return Ok(u32::try_from(n.max(0)).unwrap_or(u32::MAX)),
        RawAqi::Float(f) => f,
        RawAqi::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
    };
    if !value.is_finite() {
        return Ok(0);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let aqi = value.round().clamp(0.0, f64::from(u32::MAX)) as u32;
    Ok(aqi)
}

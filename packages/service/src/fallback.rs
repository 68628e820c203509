//! Fixed data served when neither a fetch nor the cache can answer.

use chrono::{DateTime, Utc};
use safe_zone_models::{
    AirQuality, AirQualityReading, AlertSeverity, ClimateAlert, Coordinates, RecordId,
    SafetyLevel, ScoredZone, Zone,
};

/// Score assigned to the placeholder zone.
pub const FALLBACK_SAFETY_SCORE: u8 = 60;

/// The single degraded zone served when zones are unavailable.
///
/// Its score is fixed rather than computed, so it carries no breakdown.
#[must_use]
pub fn fallback_safe_zones() -> Vec<ScoredZone> {
    let zone = Zone {
        address: "Kigali, Rwanda".to_string(),
        district: "Kigali".to_string(),
        sector: "City".to_string(),
        description: Some("Emergency safe zone with basic facilities.".to_string()),
        coords: Some(Coordinates::new(-1.9403, 29.8739)),
        ..Zone::new(RecordId::from(1_u64), "Emergency Safe Zone")
    };
    vec![ScoredZone {
        zone,
        safety_score: FALLBACK_SAFETY_SCORE,
        score_breakdown: None,
        safety_level: SafetyLevel::from_score(FALLBACK_SAFETY_SCORE),
    }]
}

/// The generic alert served when alerts are unavailable.
#[must_use]
pub fn fallback_climate_alerts(now: DateTime<Utc>) -> Vec<ClimateAlert> {
    vec![ClimateAlert {
        id: RecordId::from(1_u64),
        alert_type: "General Alert".to_string(),
        severity: AlertSeverity::Low,
        text: "General climate information available.".to_string(),
        timestamp: Some(now),
        affected_areas: Vec::new(),
        safe_zones: Vec::new(),
        duration: None,
        recommendations: Vec::new(),
    }]
}

/// Placeholder reading for when air quality cannot be fetched.
#[must_use]
pub fn unavailable_air_quality() -> AirQualityReading {
    AirQualityReading {
        quality: AirQuality::Unknown,
        aqi: 0,
        description: "Data unavailable".to_string(),
        timestamp: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_zone_is_degraded_but_usable() {
        let zones = fallback_safe_zones();
        assert_eq!(zones.len(), 1);
        let zone = &zones[0];
        assert_eq!(zone.safety_score, 60);
        assert_eq!(zone.safety_level, SafetyLevel::Moderate);
        assert!(zone.score_breakdown.is_none());
        assert!(zone.zone.is_scoreable());
    }

    #[test]
    fn fallback_alert_is_low_severity() {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        let alerts = fallback_climate_alerts(now);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Low);
        assert_eq!(alerts[0].timestamp, Some(now));
    }

    #[test]
    fn unavailable_reading() {
        let reading = unavailable_air_quality();
        assert_eq!(reading.quality, AirQuality::Unknown);
        assert_eq!(reading.aqi, 0);
    }
}

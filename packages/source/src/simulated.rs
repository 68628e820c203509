//! In-process source backed by a fixed Kigali dataset.
//!
//! Used for offline mode and tests. Fetches can be delayed with an
//! artificial latency and forced to fail, and every call is counted so
//! callers can assert how often the network would have been hit.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safe_zone_models::{
    AirQuality, AirQualityReading, AlertSeverity, ClimateAlert, Coordinates, IssueReport,
    RecyclingCenter, Zone,
};

use crate::{SafeZoneSource, SourceError};

/// A [`SafeZoneSource`] that serves canned data.
#[derive(Debug)]
pub struct SimulatedSource {
    zones: Vec<Zone>,
    alerts: Vec<ClimateAlert>,
    centers: Vec<RecyclingCenter>,
    air_quality: AirQualityReading,
    latency: Duration,
    fail_fetches: AtomicBool,
    fail_reports: AtomicBool,
    zone_fetches: AtomicUsize,
    alert_fetches: AtomicUsize,
    center_fetches: AtomicUsize,
    air_fetches: AtomicUsize,
    submitted: Mutex<Vec<IssueReport>>,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSource {
    /// Creates a source seeded with the Kigali dataset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zones: kigali_zones(),
            alerts: kigali_alerts(),
            centers: kigali_recycling_centers(),
            air_quality: kigali_air_quality(),
            latency: Duration::ZERO,
            fail_fetches: AtomicBool::new(false),
            fail_reports: AtomicBool::new(false),
            zone_fetches: AtomicUsize::new(0),
            alert_fetches: AtomicUsize::new(0),
            center_fetches: AtomicUsize::new(0),
            air_fetches: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the zone records.
    #[must_use]
    pub fn with_zones(mut self, zones: Vec<Zone>) -> Self {
        self.zones = zones;
        self
    }

    /// Replaces the alert records.
    #[must_use]
    pub fn with_alerts(mut self, alerts: Vec<ClimateAlert>) -> Self {
        self.alerts = alerts;
        self
    }

    /// Replaces the recycling center catalog.
    #[must_use]
    pub fn with_centers(mut self, centers: Vec<RecyclingCenter>) -> Self {
        self.centers = centers;
        self
    }

    /// Delays every call by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes every fetch fail (or succeed again).
    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Makes report submission fail (or succeed again).
    pub fn set_fail_reports(&self, fail: bool) {
        self.fail_reports.store(fail, Ordering::SeqCst);
    }

    /// Number of zone fetch attempts so far, including failed ones.
    #[must_use]
    pub fn zone_fetches(&self) -> usize {
        self.zone_fetches.load(Ordering::SeqCst)
    }

    /// Number of alert fetch attempts so far.
    #[must_use]
    pub fn alert_fetches(&self) -> usize {
        self.alert_fetches.load(Ordering::SeqCst)
    }

    /// Number of recycling center fetch attempts so far.
    #[must_use]
    pub fn center_fetches(&self) -> usize {
        self.center_fetches.load(Ordering::SeqCst)
    }

    /// Number of air quality fetch attempts so far.
    #[must_use]
    pub fn air_fetches(&self) -> usize {
        self.air_fetches.load(Ordering::SeqCst)
    }

    /// Reports accepted by this source.
    #[must_use]
    pub fn submitted_reports(&self) -> Vec<IssueReport> {
        self.submitted
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    async fn call(&self, counter: &AtomicUsize, what: &str) -> Result<(), SourceError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.fail_fetches.load(Ordering::SeqCst) {
            log::debug!("simulated {what} fetch failure");
            return Err(SourceError::Unavailable {
                message: format!("simulated {what} fetch failure"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SafeZoneSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn fetch_safe_zones(&self) -> Result<Vec<Zone>, SourceError> {
        self.call(&self.zone_fetches, "safe zone").await?;
        Ok(self.zones.clone())
    }

    async fn fetch_climate_alerts(&self) -> Result<Vec<ClimateAlert>, SourceError> {
        self.call(&self.alert_fetches, "climate alert").await?;
        Ok(self.alerts.clone())
    }

    async fn fetch_recycling_centers(&self) -> Result<Vec<RecyclingCenter>, SourceError> {
        self.call(&self.center_fetches, "recycling center").await?;
        Ok(self.centers.clone())
    }

    async fn fetch_air_quality(
        &self,
        _location: Coordinates,
    ) -> Result<AirQualityReading, SourceError> {
        self.call(&self.air_fetches, "air quality").await?;
        Ok(AirQualityReading {
            timestamp: Some(Utc::now()),
            ..self.air_quality.clone()
        })
    }

    async fn submit_report(&self, report: &IssueReport) -> Result<(), SourceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.fail_reports.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable {
                message: "simulated report submission failure".to_string(),
            });
        }
        if let Ok(mut submitted) = self.submitted.lock() {
            submitted.push(report.clone());
        }
        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn timestamp(value: &str) -> Option<DateTime<Utc>> {
    value.parse().ok()
}

#[allow(clippy::too_many_arguments)]
fn kigali_zone(
    id: u64,
    name: &str,
    coords: (f64, f64),
    address: &str,
    description: &str,
    sector: &str,
    risks: &[&str],
    infrastructure: &[&str],
    recycling_centers: u32,
    air_quality: AirQuality,
    emergency_capacity: u32,
    community_rating: f64,
    features: &[&str],
) -> Zone {
    Zone {
        address: address.to_string(),
        district: "Kigali City".to_string(),
        sector: sector.to_string(),
        description: Some(description.to_string()),
        coords: Some(Coordinates::new(coords.0, coords.1)),
        climate_risks: strings(risks),
        green_infrastructure: strings(infrastructure),
        recycling_centers,
        air_quality,
        emergency_capacity,
        community_rating,
        features: strings(features),
        ..Zone::new(id, name)
    }
}

/// Safe zones around central Kigali.
#[must_use]
pub fn kigali_zones() -> Vec<Zone> {
    vec![
        kigali_zone(
            1,
            "Kigali Convention Center Safe Zone",
            (-1.9501, 30.0588),
            "KG 2 Roundabout, Kigali",
            "Major convention center with solar power and emergency facilities.",
            "Nyarugenge",
            &["Low flood risk", "Low heat risk"],
            &["Solar panels", "Green roof", "Rainwater harvesting", "Waste-to-energy"],
            8,
            AirQuality::Excellent,
            500,
            4.8,
            &["Emergency shelter", "Medical aid", "Food storage", "Communication hub", "Conference facilities"],
        ),
        kigali_zone(
            2,
            "Amahoro Stadium Climate Refuge",
            (-1.9439, 30.0594),
            "Remera, Kigali",
            "National stadium converted into a mass climate refuge.",
            "Gasabo",
            &["Low flood risk", "Low heat risk"],
            &["Solar panels", "Rainwater harvesting", "Biodiversity garden", "Waste processing"],
            6,
            AirQuality::Excellent,
            1000,
            4.6,
            &["Mass shelter", "Medical center", "Food distribution", "Sports facilities", "Parking"],
        ),
        kigali_zone(
            3,
            "Kigali Genocide Memorial Safe Zone",
            (-1.9486, 30.0556),
            "KG 14 Ave, Kigali",
            "Memorial site with gardens, counseling, and emergency shelter.",
            "Gasabo",
            &["Low flood risk", "Moderate heat risk"],
            &["Solar panels", "Memorial gardens", "Water conservation", "Green spaces"],
            4,
            AirQuality::Good,
            200,
            4.7,
            &["Emergency shelter", "Counseling services", "Medical aid", "Community support", "Educational facilities"],
        ),
        kigali_zone(
            4,
            "Kigali Heights Mall Safe Zone",
            (-1.9447, 30.0619),
            "KG 7 Ave, Kigali",
            "Shopping center with medical aid and secure parking.",
            "Nyarugenge",
            &["Low flood risk", "Low heat risk"],
            &["Solar panels", "Green building design", "Waste management", "Energy efficiency"],
            5,
            AirQuality::Good,
            300,
            4.3,
            &["Shopping facilities", "Medical aid", "Food courts", "Parking", "Security"],
        ),
        kigali_zone(
            5,
            "Kigali Public Library Safe Zone",
            (-1.9497, 30.0575),
            "KG 6 Ave, Kigali",
            "Public library with educational facilities and climate resilience.",
            "Nyarugenge",
            &["Low flood risk", "Moderate heat risk"],
            &["Solar panels", "Green spaces", "Water conservation", "Natural ventilation"],
            3,
            AirQuality::Good,
            150,
            4.2,
            &["Educational facilities", "Emergency shelter", "Medical aid", "Study spaces", "Internet access"],
        ),
        kigali_zone(
            6,
            "Kigali Community Center",
            (-1.9472, 30.0625),
            "KG 8 Ave, Kigali",
            "Community center focused on local support and climate resilience.",
            "Kicukiro",
            &["Low flood risk", "Moderate heat risk"],
            &["Community gardens", "Solar panels", "Water harvesting", "Green spaces"],
            2,
            AirQuality::Good,
            120,
            4.6,
            &["Community facilities", "Emergency shelter", "Medical aid", "Local support", "Educational programs"],
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn kigali_alert(
    id: u64,
    alert_type: &str,
    severity: AlertSeverity,
    text: &str,
    affected_areas: &[&str],
    duration: &str,
    recommendations: &[&str],
    safe_zones: &[&str],
    issued_at: &str,
) -> ClimateAlert {
    ClimateAlert {
        id: id.into(),
        alert_type: alert_type.to_string(),
        severity,
        text: text.to_string(),
        timestamp: timestamp(issued_at),
        affected_areas: strings(affected_areas),
        safe_zones: strings(safe_zones),
        duration: Some(duration.to_string()),
        recommendations: strings(recommendations),
    }
}

/// Active climate alerts for Kigali.
#[must_use]
pub fn kigali_alerts() -> Vec<ClimateAlert> {
    vec![
        kigali_alert(
            1,
            "Flood Warning",
            AlertSeverity::High,
            "Heavy rainfall expected in Gasabo district. Safe zones with waste management facilities are open for shelter.",
            &["Nyarugenge", "Kicukiro", "Gasabo"],
            "24 hours",
            &[
                "Visit safe zones with proper waste disposal facilities",
                "Avoid areas near waste collection points during flooding",
                "Use designated recycling centers for emergency shelter",
                "Report any waste-related environmental hazards",
            ],
            &["Gasabo Green Refuge", "Remera Sustainable Hub"],
            "2024-01-22T10:30:00Z",
        ),
        kigali_alert(
            2,
            "Heatwave Alert",
            AlertSeverity::Moderate,
            "Extreme heat expected across all districts. Cooling centers with sustainable energy systems available.",
            &["All districts"],
            "48 hours",
            &[
                "Visit cooling centers with solar-powered systems",
                "Stay hydrated and avoid outdoor waste disposal activities",
                "Use air-conditioned recycling centers",
                "Reduce waste generation during heatwave",
            ],
            &["Nyarugenge Eco-Safe Zone", "Kimironko Eco-Sanctuary"],
            "2024-01-22T08:15:00Z",
        ),
        kigali_alert(
            3,
            "Air Quality Alert",
            AlertSeverity::Low,
            "Moderate air pollution in central areas. Use air-purified safe zones and avoid outdoor waste burning.",
            &["Central districts"],
            "12 hours",
            &[
                "Use safe zones with air purification systems",
                "Avoid outdoor waste burning activities",
                "Use indoor recycling facilities",
                "Report illegal waste disposal activities",
            ],
            &["Gasabo Green Refuge", "Remera Sustainable Hub"],
            "2024-01-22T09:45:00Z",
        ),
        kigali_alert(
            4,
            "Waste Management Alert",
            AlertSeverity::Moderate,
            "Temporary disruption in waste collection services. Alternative recycling centers available.",
            &["Nyarugenge", "Kicukiro"],
            "6 hours",
            &[
                "Use alternative recycling centers",
                "Store waste properly until collection resumes",
                "Visit safe zones with waste processing facilities",
                "Report overflowing waste bins",
            ],
            &["Kicukiro Climate Haven", "Kimironko Eco-Sanctuary"],
            "2024-01-22T11:20:00Z",
        ),
    ]
}

/// Recycling centers in Kigali.
#[must_use]
pub fn kigali_recycling_centers() -> Vec<RecyclingCenter> {
    vec![
        RecyclingCenter {
            id: 1_u64.into(),
            name: "Nyarugenge Recycling Center".to_string(),
            coords: Coordinates::new(-1.9477, 30.0567),
            types: strings(&["Plastic", "Paper", "Metal", "Glass"]),
            hours: "Mon-Sat: 7:00 AM - 6:00 PM".to_string(),
            contact: "+250 123 456 789".to_string(),
            capacity: "High".to_string(),
            status: "Operational".to_string(),
        },
        RecyclingCenter {
            id: 2_u64.into(),
            name: "Gasabo Waste Management Hub".to_string(),
            coords: Coordinates::new(-1.9333, 30.0800),
            types: strings(&["Organic", "Electronic", "Hazardous"]),
            hours: "Mon-Fri: 8:00 AM - 5:00 PM".to_string(),
            contact: "+250 987 654 321".to_string(),
            capacity: "Medium".to_string(),
            status: "Operational".to_string(),
        },
    ]
}

/// Typical air quality reading for Kigali.
#[must_use]
pub fn kigali_air_quality() -> AirQualityReading {
    AirQualityReading {
        quality: AirQuality::Good,
        aqi: 45,
        description: "Air quality is satisfactory, and air pollution poses little or no risk."
            .to_string(),
        timestamp: None,
    }
}

#[cfg(test)]
mod tests {
    use safe_zone_models::ReportStatus;

    use super::*;

    fn report() -> IssueReport {
        IssueReport {
            id: "r-1".to_string(),
            zone_id: "1".into(),
            issue_type: "Overflowing bins".to_string(),
            description: "Bins have not been emptied".to_string(),
            user_location: None,
            timestamp: Utc::now(),
            status: ReportStatus::Pending,
        }
    }

    #[test]
    fn dataset_is_well_formed() {
        let zones = kigali_zones();
        assert_eq!(zones.len(), 6);
        assert!(zones.iter().all(Zone::is_scoreable));
        assert_eq!(kigali_alerts().len(), 4);
        assert!(kigali_alerts().iter().all(|a| a.timestamp.is_some()));
        assert!(kigali_recycling_centers().iter().all(|c| c.coords.is_valid()));
    }

    #[tokio::test]
    async fn serves_dataset_and_counts_calls() {
        let source = SimulatedSource::new();
        let zones = source.fetch_safe_zones().await.unwrap();
        assert_eq!(zones.len(), 6);
        source.fetch_safe_zones().await.unwrap();
        assert_eq!(source.zone_fetches(), 2);
        assert_eq!(source.alert_fetches(), 0);

        let air = source
            .fetch_air_quality(Coordinates::new(-1.95, 30.06))
            .await
            .unwrap();
        assert_eq!(air.aqi, 45);
        assert_eq!(air.quality, AirQuality::Good);
        assert!(air.timestamp.is_some());
    }

    #[tokio::test]
    async fn failure_switch_fails_fetches_but_counts_them() {
        let source = SimulatedSource::new();
        source.set_fail_fetches(true);
        assert!(matches!(
            source.fetch_climate_alerts().await,
            Err(SourceError::Unavailable { .. })
        ));
        assert_eq!(source.alert_fetches(), 1);

        source.set_fail_fetches(false);
        assert_eq!(source.fetch_climate_alerts().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn report_submission_can_fail_independently() {
        let source = SimulatedSource::new();
        source.set_fail_reports(true);
        assert!(source.submit_report(&report()).await.is_err());
        assert!(source.submitted_reports().is_empty());
        assert!(source.fetch_safe_zones().await.is_ok());

        source.set_fail_reports(false);
        source.submit_report(&report()).await.unwrap();
        assert_eq!(source.submitted_reports().len(), 1);
    }
}

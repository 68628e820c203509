//! The safe zone data service.

use std::sync::Arc;

use safe_zone_database::KeyValueStore;
use safe_zone_models::{
    AirQualityReading, ClimateAlert, Coordinates, IssueReport, MutationResult, RecyclingCenter,
    ReportResult, ReportStatus, ScoredZone, Zone, ZoneId,
};
use safe_zone_scoring::Scorer;
use safe_zone_source::SafeZoneSource;

use crate::cache::CacheStore;
use crate::clock::{Clock, SystemClock};
use crate::config::ServiceConfig;
use crate::fallback::{fallback_climate_alerts, fallback_safe_zones, unavailable_air_quality};
use crate::favorites::FavoritesStore;
use crate::query::{NearbyZone, ZoneInsights, ZoneQuery, nearby_zones};
use crate::reports::ReportStore;
use crate::ServiceError;

/// Cache key of the scored zone list.
pub const SAFE_ZONES_KEY: &str = "safeZones";
/// Cache key of the climate alert list.
pub const CLIMATE_ALERTS_KEY: &str = "climateAlerts";

/// Serves scored safe zones and related data under unreliable network
/// conditions.
///
/// Lookups go memory cache, then persistent cache, then the remote source,
/// then fixed fallback data. No operation returns an error: failures are
/// logged and turned into fallback values or unsuccessful results.
pub struct SafeZoneService {
    source: Arc<dyn SafeZoneSource>,
    cache: CacheStore,
    favorites: FavoritesStore,
    reports: ReportStore,
    scorer: Scorer,
    clock: Arc<dyn Clock>,
    default_radius_km: f64,
}

impl std::fmt::Debug for SafeZoneService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeZoneService")
            .field("source", &self.source.name())
            .field("scorer", &self.scorer)
            .field("default_radius_km", &self.default_radius_km)
            .finish_non_exhaustive()
    }
}

impl SafeZoneService {
    /// Creates a service reading the wall clock.
    ///
    /// # Errors
    ///
    /// * If `config` holds invalid weights
    pub fn new(
        source: Arc<dyn SafeZoneSource>,
        store: Arc<dyn KeyValueStore>,
        config: &ServiceConfig,
    ) -> Result<Self, ServiceError> {
        Self::with_clock(source, store, config, Arc::new(SystemClock))
    }

    /// Creates a service reading time from `clock`.
    ///
    /// # Errors
    ///
    /// * If `config` holds invalid weights
    pub fn with_clock(
        source: Arc<dyn SafeZoneSource>,
        store: Arc<dyn KeyValueStore>,
        config: &ServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServiceError> {
        let scorer = config.scorer()?;
        log::debug!(
            "safe zone service: source={} ttl={:?}",
            source.name(),
            config.cache_ttl()
        );
        Ok(Self {
            cache: CacheStore::new(store.clone(), clock.clone(), config.cache_ttl()),
            favorites: FavoritesStore::new(store.clone()),
            reports: ReportStore::new(store, clock.clone()),
            source,
            scorer,
            clock,
            default_radius_km: config.nearby.default_radius_km,
        })
    }

    /// Scorer built from the configured weights.
    #[must_use]
    pub const fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Name of the remote source.
    #[must_use]
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// All safe zones, scored.
    ///
    /// Serves a fresh cache entry if there is one. Otherwise fetches,
    /// drops zones without valid coordinates, scores, and caches. If the
    /// fetch fails, serves the last cached list regardless of age, or the
    /// fallback zone if nothing was ever cached.
    pub async fn get_safe_zones(&self) -> Vec<ScoredZone> {
        if let Some(zones) = self.cache.get::<Vec<ScoredZone>>(SAFE_ZONES_KEY).await {
            return zones;
        }

        match self.fetch_scored_zones().await {
            Ok(zones) => {
                self.cache.set(SAFE_ZONES_KEY, &zones).await;
                zones
            }
            Err(e) => {
                log::warn!("Failed to fetch safe zones: {e}");
                let stale = self.cache.get_stale::<Vec<ScoredZone>>(SAFE_ZONES_KEY).await;
                if let Some(stale) = stale {
                    log::warn!("Serving stale safe zones");
                    return stale;
                }
                log::warn!("Serving fallback safe zones");
                fallback_safe_zones()
            }
        }
    }

    /// Active climate alerts, cached like [`Self::get_safe_zones`].
    pub async fn get_climate_alerts(&self) -> Vec<ClimateAlert> {
        let cached = self.cache.get::<Vec<ClimateAlert>>(CLIMATE_ALERTS_KEY).await;
        if let Some(alerts) = cached {
            return alerts;
        }

        match self.source.fetch_climate_alerts().await {
            Ok(alerts) => {
                log::info!("Fetched {} climate alerts", alerts.len());
                self.cache.set(CLIMATE_ALERTS_KEY, &alerts).await;
                alerts
            }
            Err(e) => {
                log::warn!("Failed to fetch climate alerts: {e}");
                let stale = self.cache.get_stale::<Vec<ClimateAlert>>(CLIMATE_ALERTS_KEY).await;
                if let Some(stale) = stale {
                    log::warn!("Serving stale climate alerts");
                    return stale;
                }
                log::warn!("Serving fallback climate alerts");
                fallback_climate_alerts(self.clock.now())
            }
        }
    }

    /// Recycling centers within `radius_km` (default from config) of the
    /// given point. Not cached. Empty on failure.
    pub async fn get_nearby_recycling_centers(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: Option<f64>,
    ) -> Vec<RecyclingCenter> {
        let origin = Coordinates::new(latitude, longitude);
        if !origin.is_valid() {
            log::warn!("Invalid origin for recycling center search: {latitude}, {longitude}");
            return Vec::new();
        }
        let radius_km = radius_km.unwrap_or(self.default_radius_km);

        match self.source.fetch_recycling_centers().await {
            Ok(centers) => centers
                .into_iter()
                .filter(|center| {
                    center.coords.is_valid()
                        && safe_zone_spatial::within_radius(origin, center.coords, radius_km)
                })
                .collect(),
            Err(e) => {
                log::warn!("Failed to fetch recycling centers: {e}");
                Vec::new()
            }
        }
    }

    /// Current air quality at the given point. Not cached.
    pub async fn get_air_quality_data(&self, latitude: f64, longitude: f64) -> AirQualityReading {
        let location = Coordinates::new(latitude, longitude);
        if !location.is_valid() {
            log::warn!("Invalid location for air quality: {latitude}, {longitude}");
            return unavailable_air_quality();
        }

        match self.source.fetch_air_quality(location).await {
            Ok(reading) => reading,
            Err(e) => {
                log::warn!("Failed to fetch air quality: {e}");
                unavailable_air_quality()
            }
        }
    }

    /// Files an issue report.
    ///
    /// The report is submitted remotely and then saved locally whatever the
    /// remote outcome. The result is successful only if both steps were.
    pub async fn report_issue(
        &self,
        zone_id: ZoneId,
        issue_type: &str,
        description: &str,
        user_location: Option<Coordinates>,
    ) -> ReportResult {
        let report = IssueReport {
            id: uuid::Uuid::new_v4().to_string(),
            zone_id,
            issue_type: issue_type.to_string(),
            description: description.to_string(),
            user_location,
            timestamp: self.clock.now(),
            status: ReportStatus::Pending,
        };
        let report_id = report.id.clone();

        let remote = self.source.submit_report(&report).await;
        let local = self.reports.append(report).await;

        let mut errors = Vec::new();
        if let Err(e) = remote {
            log::warn!("Failed to submit report {report_id}: {e}");
            errors.push(format!("Remote submission failed: {e}"));
        }
        if let Err(e) = local {
            log::error!("Failed to save report {report_id} locally: {e}");
            errors.push(format!("Local save failed: {e}"));
        }

        if errors.is_empty() {
            log::info!("Submitted report {report_id}");
            ReportResult::submitted(report_id)
        } else {
            ReportResult::failed(errors.join("; "))
        }
    }

    /// Reports filed from this device, oldest first.
    pub async fn get_user_reports(&self) -> Vec<IssueReport> {
        self.reports.list().await.unwrap_or_else(|e| {
            log::warn!("Failed to read user reports: {e}");
            Vec::new()
        })
    }

    /// Adds a zone to the favorites. Adding an existing favorite succeeds
    /// without changing anything.
    pub async fn add_to_favorites(&self, zone_id: &ZoneId) -> MutationResult {
        match self.favorites.add(zone_id).await {
            Ok(_) => MutationResult::ok(),
            Err(e) => {
                log::error!("Failed to add favorite {zone_id}: {e}");
                MutationResult::failed(e.to_string())
            }
        }
    }

    /// Removes a zone from the favorites. Removing a missing favorite
    /// succeeds without changing anything.
    pub async fn remove_from_favorites(&self, zone_id: &ZoneId) -> MutationResult {
        match self.favorites.remove(zone_id).await {
            Ok(_) => MutationResult::ok(),
            Err(e) => {
                log::error!("Failed to remove favorite {zone_id}: {e}");
                MutationResult::failed(e.to_string())
            }
        }
    }

    /// Favorite zone ids in the order they were added.
    pub async fn get_favorite_safe_zones(&self) -> Vec<ZoneId> {
        self.favorite_ids().await.unwrap_or_else(|e| {
            log::warn!("Failed to read favorites: {e}");
            Vec::new()
        })
    }

    /// Favorite zones resolved against the current zone list. Ids with no
    /// matching zone are skipped.
    pub async fn get_favorite_zone_details(&self) -> Vec<ScoredZone> {
        let ids = self.get_favorite_safe_zones().await;
        if ids.is_empty() {
            return Vec::new();
        }
        let zones = self.get_safe_zones().await;
        ids.iter()
            .filter_map(|id| zones.iter().find(|zone| zone.zone.id == *id).cloned())
            .collect()
    }

    /// Drops every cached value, filed reports included. Favorites are kept.
    pub async fn clear_cache(&self) -> MutationResult {
        match self.cache.clear().await {
            Ok(()) => MutationResult::ok(),
            Err(e) => {
                log::error!("Failed to clear cache: {e}");
                MutationResult::failed(e.to_string())
            }
        }
    }

    /// Whether any cache write happened within the TTL.
    #[must_use]
    pub fn has_fresh_data(&self) -> bool {
        self.cache.has_fresh_data()
    }

    /// Safe zones within `radius_km` (default from config) of `origin`,
    /// nearest first, with distance-decayed scores.
    pub async fn find_nearby_safe_zones(
        &self,
        origin: Coordinates,
        radius_km: Option<f64>,
    ) -> Vec<NearbyZone> {
        if !origin.is_valid() {
            log::warn!(
                "Invalid origin for safe zone search: {}, {}",
                origin.latitude,
                origin.longitude
            );
            return Vec::new();
        }
        let radius_km = radius_km.unwrap_or(self.default_radius_km);
        nearby_zones(self.get_safe_zones().await, origin, radius_km)
    }

    /// Safe zones matching `query`, in list order.
    pub async fn search_safe_zones(&self, query: &ZoneQuery) -> Vec<ScoredZone> {
        self.get_safe_zones()
            .await
            .into_iter()
            .filter(|zone| query.matches(zone))
            .collect()
    }

    /// Score, recommendations, and risk assessment for one zone.
    pub async fn get_zone_insights(&self, zone_id: &ZoneId) -> Option<ZoneInsights> {
        let zone = self
            .get_safe_zones()
            .await
            .into_iter()
            .find(|zone| zone.zone.id == *zone_id)?;
        Some(ZoneInsights {
            recommendations: self.scorer.recommendations(&zone.zone),
            risk_assessment: self.scorer.climate_risk_assessment(&zone.zone),
            zone,
        })
    }

    async fn fetch_scored_zones(&self) -> Result<Vec<ScoredZone>, ServiceError> {
        let zones = self.source.fetch_safe_zones().await?;
        let total = zones.len();
        let scored: Vec<ScoredZone> = zones
            .into_iter()
            .filter(is_well_formed)
            .map(|zone| self.scorer.annotate(zone))
            .collect();
        log::info!(
            "Fetched {total} safe zones from {}, scored {}",
            self.source.name(),
            scored.len()
        );
        Ok(scored)
    }

    async fn favorite_ids(&self) -> Result<Vec<ZoneId>, ServiceError> {
        Ok(self.favorites.list().await?)
    }
}

fn is_well_formed(zone: &Zone) -> bool {
    if zone.is_scoreable() {
        return true;
    }
    log::warn!("Dropping zone {} ({}): missing or invalid coords", zone.id, zone.name);
    false
}

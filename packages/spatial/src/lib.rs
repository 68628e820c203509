#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Great-circle distance helpers for proximity search.
//!
//! Zones and recycling centers are few enough that a linear scan with
//! haversine distance is all the spatial machinery the service needs.

use geo::{Distance, Haversine, Point};
use safe_zone_models::Coordinates;

/// Converts [`Coordinates`] into a `geo` point (x = longitude, y = latitude).
#[must_use]
pub fn to_point(coords: Coordinates) -> Point<f64> {
    Point::new(coords.longitude, coords.latitude)
}

/// Great-circle distance between two coordinates in kilometers.
#[must_use]
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    Haversine.distance(to_point(a), to_point(b)) / 1000.0
}

/// Returns `true` if `point` lies within `radius_km` of `origin` (inclusive).
#[must_use]
pub fn within_radius(origin: Coordinates, point: Coordinates, radius_km: f64) -> bool {
    distance_km(origin, point) <= radius_km
}

/// Pairs each item with its distance from `origin` and sorts ascending.
///
/// Items for which `coords_of` returns `None` are dropped.
pub fn sort_by_distance<T, F>(origin: Coordinates, items: Vec<T>, coords_of: F) -> Vec<(T, f64)>
where
    F: Fn(&T) -> Option<Coordinates>,
{
    let mut ranked: Vec<(T, f64)> = items
        .into_iter()
        .filter_map(|item| {
            let coords = coords_of(&item)?;
            let distance = distance_km(origin, coords);
            Some((item, distance))
        })
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

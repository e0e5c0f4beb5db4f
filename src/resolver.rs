//! Address resolution: geocode free text, then rank nearby stations by
//! great-circle distance.
//!
//! Walking time is estimated from straight-line distance at a fixed pace;
//! it ignores the street grid but is good enough to rank suggestions.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::graph::{LineId, StationId, TransitGraph};
use crate::traits::{GeocodedLocation, Geocoder};

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two (lat, lng) points in kilometers.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Maximum suggestions per address.
    pub max_results: usize,
    /// Search radius around the geocoded point.
    pub max_distance_km: f64,
    /// Walking pace used for the time estimate.
    pub walking_minutes_per_km: f64,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_results: 3,
            max_distance_km: 1.0,
            walking_minutes_per_km: 13.0,
        }
    }
}

/// A nearby-station suggestion for a resolved address. Ephemeral, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSuggestion {
    pub station: StationId,
    pub station_name: String,
    pub distance_km: f64,
    pub walking_minutes: u32,
    pub lines: Vec<LineId>,
}

/// An address resolved to coordinates plus its ranked station suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub query: String,
    pub location: GeocodedLocation,
    /// Nearest first; never empty (resolution fails instead).
    pub suggestions: Vec<StationSuggestion>,
}

impl ResolvedAddress {
    /// The nearest suggested station.
    pub fn nearest(&self) -> &StationSuggestion {
        &self.suggestions[0]
    }
}

/// Rank stations by distance from a point, nearest first, capped by the
/// option radius and result count.
pub fn nearest_stations(
    graph: &TransitGraph,
    lat: f64,
    lng: f64,
    options: &ResolverOptions,
) -> Vec<StationSuggestion> {
    let mut suggestions: Vec<StationSuggestion> = graph
        .stations()
        .filter_map(|station| {
            let distance = haversine_km((lat, lng), (station.lat, station.lng));
            if distance > options.max_distance_km {
                return None;
            }
            Some(StationSuggestion {
                station: station.id.clone(),
                station_name: station.name.clone(),
                distance_km: (distance * 100.0).round() / 100.0,
                walking_minutes: ((distance * options.walking_minutes_per_km) as u32).max(1),
                lines: station.lines.clone(),
            })
        })
        .collect();

    suggestions.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.station.cmp(&b.station))
    });
    suggestions.truncate(options.max_results);
    suggestions
}

/// Full resolution pipeline: geocode, then rank nearby stations.
///
/// Distinguishes a bad address ([`Error::AddressNotResolved`]) from a valid
/// but remote one ([`Error::NoStationsNearby`]).
pub fn resolve(
    geocoder: &dyn Geocoder,
    graph: &TransitGraph,
    address: &str,
    options: &ResolverOptions,
) -> Result<ResolvedAddress, Error> {
    let location = geocoder
        .geocode(address)?
        .ok_or_else(|| Error::AddressNotResolved(address.to_string()))?;

    let suggestions = nearest_stations(graph, location.lat, location.lng, options);
    if suggestions.is_empty() {
        return Err(Error::NoStationsNearby {
            address: address.to_string(),
            radius_km: options.max_distance_km,
        });
    }

    tracing::debug!(
        address,
        lat = location.lat,
        lng = location.lng,
        suggestions = suggestions.len(),
        "address resolved"
    );

    Ok(ResolvedAddress {
        query: address.to_string(),
        location,
        suggestions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point_is_zero() {
        let dist = haversine_km((40.758, -73.9855), (40.758, -73.9855));
        assert!(dist < 0.001, "same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Times Square (40.758, -73.9855) to Grand Central (40.7527, -73.9772)
        // Roughly 0.9 km apart.
        let dist = haversine_km((40.758, -73.9855), (40.7527, -73.9772));
        assert!(dist > 0.8 && dist < 1.0, "expected ~0.9 km, got {dist}");
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = (40.7074, -74.0113);
        let b = (40.7527, -73.9772);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_walking_time_has_a_one_minute_floor() {
        let options = ResolverOptions::default();
        // 0.02 km at 13 min/km is well under a minute.
        let minutes = ((0.02 * options.walking_minutes_per_km) as u32).max(1);
        assert_eq!(minutes, 1);
    }
}

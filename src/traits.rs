//! Collaborator seams for the recommendation engine.
//!
//! These are intentionally minimal. The surrounding application implements
//! them for its own providers (geocoding service, text-generation service,
//! cache store, reference-data pipeline); the engine only depends on the
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::error::Error;
use crate::graph::{LineId, StationId};
use crate::score::{RouteScores, ScoredRoute};

/// A geocoded address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedLocation {
    /// Provider's canonical form of the address.
    pub display_name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Free-text address to coordinates.
///
/// `Ok(None)` means the provider answered but found nothing (bad address);
/// `Err` means the provider itself failed (transport, timeout).
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Option<GeocodedLocation>, Error>;
}

/// Everything the text-generation collaborator needs to narrate one route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    pub criterion_name: String,
    pub origin: String,
    pub destination: String,
    pub lines: Vec<LineId>,
    pub total_minutes: f64,
    pub transfers: u32,
    pub scores: RouteScores,
    /// Citywide mean incidents per station, for context.
    pub baseline_mean_incidents: f64,
    /// Citywide mean on-time percentage, for context.
    pub baseline_mean_on_time: f64,
}

/// Natural-language route explanation. Failures are non-fatal; the engine
/// falls back to a templated explanation.
pub trait Explainer {
    fn explain(&self, summary: &RouteSummary) -> Result<String, Error>;
}

/// Keyed store with TTL-based expiry for scored routes.
///
/// An expired entry must never be returned. Writes overwrite
/// unconditionally; concurrent writers to one key race to the last write,
/// which is acceptable because values are derived deterministically from
/// the same inputs.
pub trait CacheStore {
    fn get(&self, key: &CacheKey) -> Result<Option<ScoredRoute>, Error>;
    fn put(&self, key: CacheKey, value: ScoredRoute, ttl: Duration) -> Result<(), Error>;
}

/// Raw metric samples for the baseline recompute batch.
pub trait BaselineSource {
    /// Incident counts per station.
    fn incident_samples(&self) -> Result<Vec<(StationId, f64)>, Error>;
    /// On-time percentages per line.
    fn on_time_samples(&self) -> Result<Vec<(LineId, f64)>, Error>;
}

//! Test fixtures for transit-planner.
//!
//! Provides realistic test data including:
//! - A downtown-Manhattan network slice with real station coordinates
//! - Baseline sample sets with a known incident distribution
//! - Mock collaborator implementations (geocoder, explainer, cache)

#![allow(dead_code)]

pub mod manhattan;

pub use manhattan::*;

use std::collections::HashMap;
use std::time::Duration;

use transit_planner::cache::CacheKey;
use transit_planner::error::Error;
use transit_planner::graph::{LineId, StationId};
use transit_planner::score::ScoredRoute;
use transit_planner::traits::{
    BaselineSource, CacheStore, Explainer, GeocodedLocation, Geocoder, RouteSummary,
};

/// Geocoder backed by a fixed address table. Unknown addresses resolve to
/// nothing, like a provider returning an empty result set.
pub struct FixtureGeocoder {
    places: HashMap<String, GeocodedLocation>,
}

impl FixtureGeocoder {
    pub fn new() -> Self {
        Self {
            places: HashMap::new(),
        }
    }

    pub fn with_place(mut self, address: &str, lat: f64, lng: f64) -> Self {
        self.places.insert(
            address.to_string(),
            GeocodedLocation {
                display_name: format!("{address} (geocoded)"),
                lat,
                lng,
            },
        );
        self
    }
}

impl Geocoder for FixtureGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<GeocodedLocation>, Error> {
        Ok(self.places.get(address).cloned())
    }
}

/// Explainer that always fails, to exercise the templated fallback.
pub struct FailingExplainer;

impl Explainer for FailingExplainer {
    fn explain(&self, _summary: &RouteSummary) -> Result<String, Error> {
        Err(Error::Explainer("model endpoint unavailable".into()))
    }
}

/// Explainer that answers with a recognizable marker.
pub struct EchoExplainer;

impl Explainer for EchoExplainer {
    fn explain(&self, summary: &RouteSummary) -> Result<String, Error> {
        Ok(format!("narrated: {}", summary.criterion_name))
    }
}

/// Baseline source serving a fixed recompute batch: Rector Street turns
/// incident-heavy, line 1 turns unreliable. Fails on demand to exercise
/// the keep-prior-snapshot path.
pub struct FixtureBaselineSource {
    pub fail: bool,
}

impl BaselineSource for FixtureBaselineSource {
    fn incident_samples(&self) -> Result<Vec<(StationId, f64)>, Error> {
        if self.fail {
            return Err(Error::InvalidNetwork("aggregator offline".into()));
        }
        Ok(vec![
            (StationId::new("rector"), 12.0),
            (StationId::new("chambers"), 6.0),
        ])
    }

    fn on_time_samples(&self) -> Result<Vec<(LineId, f64)>, Error> {
        Ok(vec![(LineId::new("1"), 70.0), (LineId::new("A"), 82.0)])
    }
}

/// Cache store that fails every call, to exercise degradation.
pub struct FailingCache;

impl CacheStore for FailingCache {
    fn get(&self, _key: &CacheKey) -> Result<Option<ScoredRoute>, Error> {
        Err(Error::Cache("store unreachable".into()))
    }

    fn put(&self, _key: CacheKey, _value: ScoredRoute, _ttl: Duration) -> Result<(), Error> {
        Err(Error::Cache("store unreachable".into()))
    }
}

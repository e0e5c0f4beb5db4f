//! Error taxonomy for the recommendation engine.

use thiserror::Error;

use crate::graph::StationId;

/// Errors surfaced by graph construction, pathfinding, resolution and the
/// request orchestrator.
///
/// Provider failures (`Geocoder`, `Cache`, `Explainer`) are caught at the
/// engine boundary and degrade the response rather than abort it; only
/// resolution and pathfinding failures end a request.
#[derive(Debug, Error)]
pub enum Error {
    /// A station id was referenced that is not present in the transit graph.
    #[error("unknown station: {0}")]
    UnknownStation(StationId),

    /// The search frontier was exhausted without reaching the destination.
    #[error("no route found between {origin} and {destination}")]
    NoRouteFound {
        origin: StationId,
        destination: StationId,
    },

    /// The geocoding provider returned no match for the address.
    #[error("could not resolve address: {0:?}")]
    AddressNotResolved(String),

    /// The address geocoded successfully but no station lies within the
    /// search radius. Distinct from [`Error::AddressNotResolved`] so callers
    /// can tell a bad address from a valid-but-remote one.
    #[error("no stations within {radius_km} km of {address:?}")]
    NoStationsNearby { address: String, radius_km: f64 },

    /// No baseline snapshot has ever been published. Scoring degrades to
    /// neutral defaults instead of raising this on the request path.
    #[error("baseline statistics not yet loaded")]
    BaselineUnavailable,

    /// Geocoding provider failure (transport, timeout, malformed payload).
    #[error("geocoding provider error: {0}")]
    Geocoder(String),

    /// Cache store failure. Treated as a miss on read and skipped on write.
    #[error("cache store error: {0}")]
    Cache(String),

    /// Text-generation provider failure. The engine falls back to a
    /// templated explanation.
    #[error("explanation provider error: {0}")]
    Explainer(String),

    /// Reference data could not be parsed or is internally inconsistent.
    #[error("invalid network data: {0}")]
    InvalidNetwork(String),
}

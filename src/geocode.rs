//! Nominatim HTTP adapter for the geocoding seam.

use serde::Deserialize;

use crate::error::Error;
use crate::traits::{GeocodedLocation, Geocoder};

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Appended to every query to bias results toward the service area
    /// (e.g. "New York, NY, USA").
    pub region_bias: Option<String>,
    pub country_codes: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org/search".to_string(),
            region_bias: None,
            country_codes: "us".to_string(),
            user_agent: "transit-planner/0.2".to_string(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    config: GeocoderConfig,
    client: reqwest::blocking::Client,
}

impl NominatimGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Geocoder(e.to_string()))?;

        Ok(Self { config, client })
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<GeocodedLocation>, Error> {
        let query = match &self.config.region_bias {
            Some(bias) => format!("{address}, {bias}"),
            None => address.to_string(),
        };

        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", self.config.country_codes.as_str()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())
            .map_err(|e| Error::Geocoder(e.to_string()))?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let (Ok(lat), Ok(lng)) = (place.lat.parse::<f64>(), place.lon.parse::<f64>()) else {
            // Provider answered with unparseable coordinates; treat the
            // address as unresolved rather than failing the request.
            tracing::warn!(address, "geocoder returned malformed coordinates");
            return Ok(None);
        };

        Ok(Some(GeocodedLocation {
            display_name: place.display_name,
            lat,
            lng,
        }))
    }
}

// Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

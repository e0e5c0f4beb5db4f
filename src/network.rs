//! Reference-data records for building the transit graph.
//!
//! The shapes mirror what the external reference-data loader supplies:
//! stations with coordinates and serving lines, undirected line segments
//! with nominal ride times, optional per-segment incident history, and
//! explicit transfer connections with platform walking times.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Incident count assumed for segments with no recorded history.
pub const DEFAULT_SEGMENT_INCIDENTS: f64 = 5.0;

/// On-time percentage assumed for lines with no performance record.
pub const DEFAULT_ON_TIME_PERCENT: f64 = 85.0;

/// Nominal ride time between adjacent stations when unspecified.
pub const DEFAULT_SEGMENT_MINUTES: f64 = 2.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_on_time")]
    pub on_time_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub from: String,
    pub to: String,
    pub line: String,
    #[serde(default = "default_minutes")]
    pub minutes: f64,
    /// Incident history attributed to the segment; defaults to
    /// [`DEFAULT_SEGMENT_INCIDENTS`] at graph build when absent.
    #[serde(default)]
    pub incidents: Option<f64>,
}

/// An explicit in-station (or between co-located stations) line change with
/// its platform walking time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub station: String,
    pub from_line: String,
    pub to_line: String,
    pub minutes: f64,
}

/// Everything the graph builder needs, as one deserializable document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkData {
    pub stations: Vec<StationRecord>,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
    pub segments: Vec<SegmentRecord>,
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
}

impl NetworkData {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::InvalidNetwork(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::open(path.as_ref())
            .map_err(|e| Error::InvalidNetwork(e.to_string()))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::InvalidNetwork(e.to_string()))
    }
}

fn default_on_time() -> f64 {
    DEFAULT_ON_TIME_PERCENT
}

fn default_minutes() -> f64 {
    DEFAULT_SEGMENT_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_document() {
        let json = r#"{
            "stations": [
                {"id": "canal", "name": "Canal Street", "lat": 40.717, "lng": -73.9933, "lines": ["1", "A"]},
                {"id": "chambers", "name": "Chambers Street", "lat": 40.7134, "lng": -74.0055, "lines": ["1"]}
            ],
            "segments": [
                {"from": "canal", "to": "chambers", "line": "1"}
            ]
        }"#;

        let data = NetworkData::from_json_str(json).unwrap();
        assert_eq!(data.stations.len(), 2);
        assert_eq!(data.segments[0].minutes, DEFAULT_SEGMENT_MINUTES);
        assert!(data.segments[0].incidents.is_none());
        assert!(data.transfers.is_empty());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            NetworkData::from_json_str("{\"stations\": 3}"),
            Err(Error::InvalidNetwork(_))
        ));
    }
}

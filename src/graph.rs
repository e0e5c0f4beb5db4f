//! Static transit graph: stations, line segments and transfer walk times.
//!
//! Built once from reference data and read-only afterwards. The only
//! mutation path is [`TransitGraph::from_network`]; metric refreshes produce
//! a new graph via [`TransitGraph::refreshed`] rather than editing in place.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::baseline::BaselineSnapshot;
use crate::error::Error;
use crate::network::NetworkData;

/// Unique station identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transit line identifier (e.g. "4", "A").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId(String);

impl LineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station node. Immutable after graph construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Lines serving this station, sorted for deterministic iteration.
    pub lines: Vec<LineId>,
}

/// A directed line segment to an adjacent station.
///
/// Numeric attributes are fixed at build time; a baseline recompute swaps in
/// a whole new graph ([`TransitGraph::refreshed`]) instead of mutating them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub to: StationId,
    pub line: LineId,
    /// Nominal ride time in minutes.
    pub minutes: f64,
    /// Historical incident count attributed to this segment.
    pub incidents: f64,
    /// On-time percentage of the line on this segment.
    pub on_time_percent: f64,
}

/// Display metadata for a line, carried through to response payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineInfo {
    pub id: LineId,
    pub name: String,
    pub color: String,
    pub on_time_percent: f64,
}

/// Adjacency-list transit graph.
#[derive(Debug, Clone)]
pub struct TransitGraph {
    stations: HashMap<StationId, Station>,
    adjacency: HashMap<StationId, Vec<Edge>>,
    lines: HashMap<LineId, LineInfo>,
    /// Platform walking minutes for (station, from line, to line) pairs
    /// that reference data describes explicitly.
    transfer_minutes: HashMap<(StationId, LineId, LineId), f64>,
}

impl TransitGraph {
    /// Build the graph from reference data. Ride segments are undirected;
    /// an edge is materialized in both directions.
    pub fn from_network(data: &NetworkData) -> Result<Self, Error> {
        let mut stations: HashMap<StationId, Station> = HashMap::new();
        for record in &data.stations {
            let id = StationId::new(&record.id);
            let mut lines: Vec<LineId> =
                record.lines.iter().map(LineId::new).collect();
            lines.sort();
            lines.dedup();
            stations.insert(
                id.clone(),
                Station {
                    id,
                    name: record.name.clone(),
                    lat: record.lat,
                    lng: record.lng,
                    lines,
                },
            );
        }

        let mut lines: HashMap<LineId, LineInfo> = HashMap::new();
        for record in &data.lines {
            let id = LineId::new(&record.id);
            lines.insert(
                id.clone(),
                LineInfo {
                    id,
                    name: record.name.clone(),
                    color: record.color.clone(),
                    on_time_percent: record.on_time_percent,
                },
            );
        }

        let mut adjacency: HashMap<StationId, Vec<Edge>> = HashMap::new();
        for segment in &data.segments {
            let from = StationId::new(&segment.from);
            let to = StationId::new(&segment.to);
            let line = LineId::new(&segment.line);

            for endpoint in [&from, &to] {
                if !stations.contains_key(endpoint) {
                    return Err(Error::InvalidNetwork(format!(
                        "segment {} - {} references unknown station {}",
                        segment.from, segment.to, endpoint
                    )));
                }
            }

            let on_time = lines
                .get(&line)
                .map(|info| info.on_time_percent)
                .unwrap_or(crate::network::DEFAULT_ON_TIME_PERCENT);
            let incidents = segment
                .incidents
                .unwrap_or(crate::network::DEFAULT_SEGMENT_INCIDENTS);

            adjacency.entry(from.clone()).or_default().push(Edge {
                to: to.clone(),
                line: line.clone(),
                minutes: segment.minutes,
                incidents,
                on_time_percent: on_time,
            });
            adjacency.entry(to).or_default().push(Edge {
                to: from,
                line,
                minutes: segment.minutes,
                incidents,
                on_time_percent: on_time,
            });
        }

        // Neighbor order is part of the determinism contract.
        for edges in adjacency.values_mut() {
            edges.sort_by(|a, b| (&a.to, &a.line).cmp(&(&b.to, &b.line)));
        }

        let mut transfer_minutes = HashMap::new();
        for transfer in &data.transfers {
            let station = StationId::new(&transfer.station);
            if !stations.contains_key(&station) {
                return Err(Error::InvalidNetwork(format!(
                    "transfer references unknown station {station}"
                )));
            }
            transfer_minutes.insert(
                (
                    station,
                    LineId::new(&transfer.from_line),
                    LineId::new(&transfer.to_line),
                ),
                transfer.minutes,
            );
        }

        tracing::info!(
            stations = stations.len(),
            lines = lines.len(),
            "transit graph built"
        );

        Ok(Self {
            stations,
            adjacency,
            lines,
            transfer_minutes,
        })
    }

    /// Outgoing edges of a station, paired with the destination station,
    /// in deterministic (destination, line) order.
    pub fn neighbors(
        &self,
        station: &StationId,
    ) -> Result<impl Iterator<Item = (&Edge, &Station)>, Error> {
        if !self.stations.contains_key(station) {
            return Err(Error::UnknownStation(station.clone()));
        }
        let edges = self
            .adjacency
            .get(station)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Ok(edges.iter().map(|edge| (edge, &self.stations[&edge.to])))
    }

    pub fn station(&self, id: &StationId) -> Result<&Station, Error> {
        self.stations
            .get(id)
            .ok_or_else(|| Error::UnknownStation(id.clone()))
    }

    /// Lines serving a station, sorted.
    pub fn lines_at(&self, id: &StationId) -> Result<&[LineId], Error> {
        self.station(id).map(|station| station.lines.as_slice())
    }

    pub fn line_info(&self, id: &LineId) -> Option<&LineInfo> {
        self.lines.get(id)
    }

    /// Explicit platform walking minutes for a transfer, if reference data
    /// describes the connection.
    pub fn transfer_walk(
        &self,
        station: &StationId,
        from: &LineId,
        to: &LineId,
    ) -> Option<f64> {
        self.transfer_minutes
            .get(&(station.clone(), from.clone(), to.clone()))
            .copied()
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// A copy of this graph with edge metrics overlaid from a freshly
    /// computed baseline snapshot: segment incidents from the destination
    /// station's incident count, on-time percentages from the line's
    /// distribution. Part of the offline refresh cycle; the serving graph
    /// is then swapped wholesale.
    pub fn refreshed(&self, baseline: &BaselineSnapshot) -> TransitGraph {
        let mut refreshed = self.clone();
        for edges in refreshed.adjacency.values_mut() {
            for edge in edges.iter_mut() {
                if let Some(incidents) = baseline.incidents.value(&edge.to) {
                    edge.incidents = incidents;
                }
                if let Some(on_time) = baseline.on_time.value(&edge.line) {
                    edge.on_time_percent = on_time;
                }
            }
        }
        refreshed
    }
}

//! Multi-criteria shortest-path search over the transit graph.
//!
//! One Dijkstra run per criterion, with the edge cost selected by the
//! criterion's weighting function. Search states are (station, line) pairs
//! so that line changes are explicit; a change costs the platform walking
//! time (explicit per-hub values from reference data when present) and
//! counts as a transfer.
//!
//! Output is deterministic: frontier pops order by cost, then transfer
//! count, then lexicographic first boarded line, then station and line id.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::baseline::BaselineSnapshot;
use crate::error::Error;
use crate::graph::{LineId, StationId, TransitGraph};

/// Route optimization criterion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Safe,
    Fast,
    Balanced,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [Criterion::Safe, Criterion::Fast, Criterion::Balanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Safe => "safe",
            Criterion::Fast => "fast",
            Criterion::Balanced => "balanced",
        }
    }

    /// Display name used in response payloads ("SafeRoute" etc.).
    pub fn route_name(&self) -> &'static str {
        match self {
            Criterion::Safe => "SafeRoute",
            Criterion::Fast => "FastRoute",
            Criterion::Balanced => "BalancedRoute",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "safe" => Ok(Criterion::Safe),
            "fast" => Ok(Criterion::Fast),
            "balanced" => Ok(Criterion::Balanced),
            other => Err(format!("unknown criterion: {other:?}")),
        }
    }
}

/// Fixed weights for the balanced criterion's linear combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancedWeights {
    pub time: f64,
    pub safety: f64,
    pub reliability: f64,
}

impl Default for BalancedWeights {
    fn default() -> Self {
        // Equal thirds; tunable through EngineConfig.
        Self {
            time: 1.0 / 3.0,
            safety: 1.0 / 3.0,
            reliability: 1.0 / 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Transfer cap bounding state explosion.
    pub max_transfers: u32,
    /// Platform walking minutes when reference data has no explicit
    /// transfer record for the connection.
    pub default_transfer_minutes: f64,
    /// Cap on the safety cost multiplier for extreme-incident segments.
    pub max_safety_multiplier: f64,
    pub balanced: BalancedWeights,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_transfers: 5,
            default_transfer_minutes: 2.0,
            max_safety_multiplier: 3.0,
            balanced: BalancedWeights::default(),
        }
    }
}

/// A single-line stretch of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub line: LineId,
    pub from: StationId,
    pub to: StationId,
    pub stops: usize,
    pub minutes: f64,
}

/// A computed route: ordered stations, per-line legs, aggregate metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub stations: Vec<StationId>,
    pub legs: Vec<RouteLeg>,
    /// Lines in boarding order, consecutive duplicates collapsed.
    pub lines: Vec<LineId>,
    pub total_minutes: f64,
    pub transfers: u32,
}

impl Route {
    /// Zero-length sentinel for origin == destination.
    pub fn zero(station: StationId) -> Self {
        Self {
            stations: vec![station],
            legs: Vec::new(),
            lines: Vec::new(),
            total_minutes: 0.0,
            transfers: 0,
        }
    }

    pub fn is_zero_length(&self) -> bool {
        self.legs.is_empty()
    }
}

type State = (StationId, LineId);

/// Priority key: derived ordering gives the full deterministic tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Frontier {
    cost: OrderedFloat<f64>,
    transfers: u32,
    first_line: LineId,
    station: StationId,
    line: LineId,
}

struct Step {
    prev: State,
    minutes: f64,
    is_transfer: bool,
}

/// Lowest-cost path between two stations for one criterion.
///
/// Fails with [`Error::UnknownStation`] for absent endpoints and
/// [`Error::NoRouteFound`] when the frontier exhausts. Identical endpoints
/// short-circuit to the zero-length sentinel without touching the queue.
pub fn shortest_path(
    graph: &TransitGraph,
    baseline: &BaselineSnapshot,
    origin: &StationId,
    destination: &StationId,
    criterion: Criterion,
    options: &SearchOptions,
) -> Result<Route, Error> {
    graph.station(origin)?;
    graph.station(destination)?;

    if origin == destination {
        return Ok(Route::zero(origin.clone()));
    }

    let mut heap: BinaryHeap<Reverse<Frontier>> = BinaryHeap::new();
    let mut best: HashMap<State, (OrderedFloat<f64>, u32, LineId)> = HashMap::new();
    let mut prev: HashMap<State, Step> = HashMap::new();
    let mut visited: HashSet<State> = HashSet::new();

    // Boarding any line at the origin is free; lines_at is sorted, so the
    // lexicographic first-line tie-break starts from a deterministic seed.
    for line in graph.lines_at(origin)? {
        let state = (origin.clone(), line.clone());
        best.insert(state, (OrderedFloat(0.0), 0, line.clone()));
        heap.push(Reverse(Frontier {
            cost: OrderedFloat(0.0),
            transfers: 0,
            first_line: line.clone(),
            station: origin.clone(),
            line: line.clone(),
        }));
    }

    while let Some(Reverse(frontier)) = heap.pop() {
        let state = (frontier.station.clone(), frontier.line.clone());
        if !visited.insert(state.clone()) {
            continue;
        }

        if frontier.station == *destination {
            return Ok(extract_route(origin, &state, &prev));
        }

        if frontier.transfers > options.max_transfers {
            continue;
        }

        for (edge, _) in graph.neighbors(&frontier.station)? {
            let next_state = (edge.to.clone(), edge.line.clone());
            if visited.contains(&next_state) {
                continue;
            }

            let is_transfer = edge.line != frontier.line;
            let transfers = frontier.transfers + u32::from(is_transfer);
            if transfers > options.max_transfers {
                continue;
            }

            let walk = if is_transfer {
                graph
                    .transfer_walk(&frontier.station, &frontier.line, &edge.line)
                    .unwrap_or(options.default_transfer_minutes)
            } else {
                0.0
            };
            let minutes = edge.minutes + walk;
            let cost = frontier.cost.0
                + edge_cost(criterion, edge.incidents, edge.on_time_percent, minutes, baseline, options);

            let key = (OrderedFloat(cost), transfers, frontier.first_line.clone());
            if best
                .get(&next_state)
                .is_none_or(|existing| key < *existing)
            {
                best.insert(next_state.clone(), key);
                prev.insert(
                    next_state,
                    Step {
                        prev: state.clone(),
                        minutes,
                        is_transfer,
                    },
                );
                heap.push(Reverse(Frontier {
                    cost: OrderedFloat(cost),
                    transfers,
                    first_line: frontier.first_line.clone(),
                    station: edge.to.clone(),
                    line: edge.line.clone(),
                }));
            }
        }
    }

    Err(Error::NoRouteFound {
        origin: origin.clone(),
        destination: destination.clone(),
    })
}

/// Criterion-specific edge cost. Every cost is at least the elapsed
/// minutes, so all weights stay non-negative.
fn edge_cost(
    criterion: Criterion,
    incidents: f64,
    on_time_percent: f64,
    minutes: f64,
    baseline: &BaselineSnapshot,
    options: &SearchOptions,
) -> f64 {
    match criterion {
        Criterion::Fast => minutes,
        Criterion::Safe => minutes * safety_multiplier(incidents, baseline, options),
        Criterion::Balanced => {
            let w = &options.balanced;
            let safety_penalty =
                minutes * (safety_multiplier(incidents, baseline, options) - 1.0);
            let lateness = (100.0 - on_time_percent).clamp(0.0, 100.0) / 100.0;
            let reliability_penalty = minutes * lateness;
            w.time * minutes + w.safety * safety_penalty + w.reliability * reliability_penalty
        }
    }
}

/// Incident penalty relative to the citywide baseline: a segment at the
/// baseline mean doubles in cost, capped for extreme outliers.
fn safety_multiplier(incidents: f64, baseline: &BaselineSnapshot, options: &SearchOptions) -> f64 {
    let mean = baseline.incidents.summary().mean.max(f64::EPSILON);
    (1.0 + incidents / mean).min(options.max_safety_multiplier)
}

fn extract_route(origin: &StationId, end: &State, prev: &HashMap<State, Step>) -> Route {
    // Backtrack to the seed state, then replay forward.
    let mut steps: Vec<(State, f64, bool)> = Vec::new();
    let mut current = end.clone();
    while let Some(step) = prev.get(&current) {
        steps.push((current.clone(), step.minutes, step.is_transfer));
        current = step.prev.clone();
    }
    steps.reverse();

    let mut stations = vec![origin.clone()];
    let mut legs: Vec<RouteLeg> = Vec::new();
    let mut lines: Vec<LineId> = Vec::new();
    let mut total_minutes = 0.0;
    let mut transfers = 0;

    for ((station, line), minutes, is_transfer) in steps {
        total_minutes += minutes;
        if is_transfer {
            transfers += 1;
        }

        match legs.last_mut() {
            Some(leg) if leg.line == line => {
                leg.to = station.clone();
                leg.stops += 1;
                leg.minutes += minutes;
            }
            _ => {
                legs.push(RouteLeg {
                    line: line.clone(),
                    from: stations.last().cloned().unwrap_or_else(|| origin.clone()),
                    to: station.clone(),
                    stops: 1,
                    minutes,
                });
                lines.push(line.clone());
            }
        }
        stations.push(station);
    }

    Route {
        stations,
        legs,
        lines,
        total_minutes,
        transfers,
    }
}

//! Baseline-relative percentile scoring of computed routes.
//!
//! Safety and reliability map a route's average metric onto the citywide
//! distribution and convert the percentile to a 0-10 score through fixed
//! bands, interpolating linearly inside each band and rounding to the
//! nearest integer:
//!
//! - >= 90th percentile -> 10
//! - 75-90th            -> 8 + (p - 75) / 15
//! - 50-75th            -> 6 + (p - 50) / 25
//! - 25-50th            -> 4 + (p - 25) / 25
//! - < 25th             -> 2 + p / 25
//!
//! Efficiency is not baseline-relative: it starts at 10 and loses a fixed
//! step per transfer. Degenerate baselines (no samples loaded) yield the
//! neutral score 5; no single metric failure suppresses the other scores.

use serde::{Deserialize, Serialize};

use crate::baseline::BaselineSnapshot;
use crate::graph::{LineId, StationId};
use crate::pathfind::{Criterion, Route};

/// Neutral score used when a distribution is empty or a route has no data.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Score lost per transfer on the efficiency scale.
const TRANSFER_STEP: f64 = 1.5;

/// The three independent 0-10 scores of a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteScores {
    pub safety: f64,
    pub reliability: f64,
    pub efficiency: f64,
}

/// A route annotated with its scores, explanation and cache provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRoute {
    pub criterion: Criterion,
    pub name: String,
    pub route: Route,
    pub scores: RouteScores,
    pub explanation: String,
    pub from_cache: bool,
}

/// Score a route against the given baseline snapshot.
pub fn score_route(route: &Route, baseline: &BaselineSnapshot) -> RouteScores {
    let scores = RouteScores {
        safety: safety_score(&route.stations, baseline),
        reliability: reliability_score(&route.lines, baseline),
        efficiency: efficiency_score(route.transfers),
    };
    tracing::debug!(
        safety = scores.safety,
        reliability = scores.reliability,
        efficiency = scores.efficiency,
        transfers = route.transfers,
        "route scored"
    );
    scores
}

/// Safety score from the route's average incident load per station.
///
/// The percentile is inverted (share of stations with at least this much
/// incident history), so fewer incidents rank higher.
pub fn safety_score(stations: &[StationId], baseline: &BaselineSnapshot) -> f64 {
    if stations.is_empty() || baseline.incidents.is_degenerate() {
        return NEUTRAL_SCORE;
    }
    let avg = stations
        .iter()
        .map(|s| baseline.incidents.value_or_mean(s))
        .sum::<f64>()
        / stations.len() as f64;
    let percentile = 100.0 - baseline.incidents.rank(avg);
    band_score(percentile)
}

/// Reliability score from the route's average on-time percentage across
/// the lines it uses. Higher on-time ranks higher directly.
pub fn reliability_score(lines: &[LineId], baseline: &BaselineSnapshot) -> f64 {
    if lines.is_empty() || baseline.on_time.is_degenerate() {
        return NEUTRAL_SCORE;
    }
    let avg = lines
        .iter()
        .map(|l| baseline.on_time.value_or_mean(l))
        .sum::<f64>()
        / lines.len() as f64;
    band_score(baseline.on_time.rank(avg))
}

/// Efficiency score: 10 for a direct route, minus a fixed step per
/// transfer, clamped to [0, 10].
pub fn efficiency_score(transfers: u32) -> f64 {
    (10.0 - transfers as f64 * TRANSFER_STEP).clamp(0.0, 10.0)
}

/// Percentile-band mapping with linear interpolation inside each band.
fn band_score(percentile: f64) -> f64 {
    let p = percentile.clamp(0.0, 100.0);
    let score = if p >= 90.0 {
        10.0
    } else if p >= 75.0 {
        8.0 + (p - 75.0) / 15.0
    } else if p >= 50.0 {
        6.0 + (p - 50.0) / 25.0
    } else if p >= 25.0 {
        4.0 + (p - 25.0) / 25.0
    } else {
        2.0 + p / 25.0
    };
    score.round()
}

/// Which score a label describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    Safety,
    Reliability,
    Efficiency,
}

/// Human-readable label for a score, used by the templated explanation.
pub fn interpret(kind: ScoreKind, score: f64) -> &'static str {
    match kind {
        ScoreKind::Safety => {
            if score >= 9.0 {
                "very safe"
            } else if score >= 7.0 {
                "safe"
            } else if score >= 5.0 {
                "moderate"
            } else if score >= 3.0 {
                "less safe"
            } else {
                "avoid if possible"
            }
        }
        ScoreKind::Reliability => {
            if score >= 9.0 {
                "excellent on-time record"
            } else if score >= 7.0 {
                "good on-time record"
            } else if score >= 5.0 {
                "average on-time record"
            } else if score >= 3.0 {
                "below-average on-time record"
            } else {
                "very unreliable"
            }
        }
        ScoreKind::Efficiency => {
            if score >= 9.0 {
                "direct"
            } else if score >= 7.0 {
                "very efficient"
            } else if score >= 5.0 {
                "efficient"
            } else if score >= 3.0 {
                "multiple transfers"
            } else {
                "many transfers"
            }
        }
    }
}

//! Baseline statistics: citywide reference distributions used to turn raw
//! route metrics into percentiles.
//!
//! Snapshots are immutable once built. The serving handle publishes a new
//! snapshot by swapping an `Arc` reference, so concurrent readers never see
//! a half-updated baseline, and a failed refresh leaves the prior snapshot
//! in effect.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::graph::{LineId, StationId};
use crate::traits::BaselineSource;

/// Summary statistics of one metric distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

impl DistributionSummary {
    /// Summarize a sample set. Returns `None` for an empty set; callers
    /// fall back to the documented city defaults.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        // Nearest-rank quartiles, index floor(n * q).
        let at = |q: f64| sorted[((n as f64 * q) as usize).min(n - 1)];
        Some(Self {
            mean,
            median,
            min: sorted[0],
            max: sorted[n - 1],
            p25: at(0.25),
            p50: at(0.50),
            p75: at(0.75),
        })
    }

    /// Citywide incident defaults used before the first successful load.
    pub fn default_incidents() -> Self {
        Self {
            mean: 5.0,
            median: 5.0,
            min: 0.0,
            max: 20.0,
            p25: 3.0,
            p50: 5.0,
            p75: 8.0,
        }
    }

    /// Citywide on-time defaults used before the first successful load.
    pub fn default_on_time() -> Self {
        Self {
            mean: 85.0,
            median: 85.0,
            min: 77.0,
            max: 92.0,
            p25: 82.0,
            p50: 85.0,
            p75: 88.0,
        }
    }
}

/// Percentile rank of `value` within `sorted_samples`: the percentage of
/// samples the candidate is greater than or equal to. Samples must be
/// sorted ascending.
pub fn percentile_rank(sorted_samples: &[f64], value: f64) -> f64 {
    if sorted_samples.is_empty() {
        return 50.0;
    }
    let at_or_below = sorted_samples.partition_point(|s| *s <= value);
    at_or_below as f64 / sorted_samples.len() as f64 * 100.0
}

/// One metric's baseline: per-key values, the sorted sample set, and its
/// summary.
#[derive(Debug, Clone)]
pub struct MetricBaseline<K> {
    summary: DistributionSummary,
    sorted_samples: Vec<f64>,
    values: HashMap<K, f64>,
}

impl<K: Eq + Hash> MetricBaseline<K> {
    fn from_samples(samples: Vec<(K, f64)>, default_summary: DistributionSummary) -> Self {
        let mut sorted_samples: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
        sorted_samples.sort_by(|a, b| a.total_cmp(b));
        let summary =
            DistributionSummary::from_samples(&sorted_samples).unwrap_or(default_summary);
        Self {
            summary,
            sorted_samples,
            values: samples.into_iter().collect(),
        }
    }

    pub fn summary(&self) -> &DistributionSummary {
        &self.summary
    }

    pub fn value(&self, key: &K) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Per-key value, falling back to the distribution mean.
    pub fn value_or_mean(&self, key: &K) -> f64 {
        self.value(key).unwrap_or(self.summary.mean)
    }

    /// True when no samples were loaded and the summary is a default.
    pub fn is_degenerate(&self) -> bool {
        self.sorted_samples.is_empty()
    }

    pub fn rank(&self, value: f64) -> f64 {
        percentile_rank(&self.sorted_samples, value)
    }
}

/// An immutable point-in-time pair of baseline distributions.
#[derive(Debug, Clone)]
pub struct BaselineSnapshot {
    /// Crime incidents per station.
    pub incidents: MetricBaseline<StationId>,
    /// On-time percentage per line.
    pub on_time: MetricBaseline<LineId>,
}

impl BaselineSnapshot {
    pub fn from_samples(
        incident_samples: Vec<(StationId, f64)>,
        on_time_samples: Vec<(LineId, f64)>,
    ) -> Self {
        Self {
            incidents: MetricBaseline::from_samples(
                incident_samples,
                DistributionSummary::default_incidents(),
            ),
            on_time: MetricBaseline::from_samples(
                on_time_samples,
                DistributionSummary::default_on_time(),
            ),
        }
    }

    /// Cold-start snapshot: city-default summaries, no samples.
    pub fn city_defaults() -> Self {
        Self::from_samples(Vec::new(), Vec::new())
    }
}

/// Serving handle for the currently published snapshot.
///
/// `snapshot` is wait-free apart from a short read lock and always returns
/// something scorable; before the first successful refresh it hands out the
/// city-default snapshot.
#[derive(Debug)]
pub struct BaselineHandle {
    current: RwLock<Arc<BaselineSnapshot>>,
    loaded: RwLock<bool>,
}

impl Default for BaselineHandle {
    fn default() -> Self {
        Self {
            current: RwLock::new(Arc::new(BaselineSnapshot::city_defaults())),
            loaded: RwLock::new(false),
        }
    }
}

impl BaselineHandle {
    pub fn new(snapshot: BaselineSnapshot) -> Self {
        let handle = Self::default();
        handle.publish(snapshot);
        handle
    }

    /// The most recently published snapshot (city defaults before the
    /// first publish).
    pub fn snapshot(&self) -> Arc<BaselineSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Like [`BaselineHandle::snapshot`] but fails with
    /// [`Error::BaselineUnavailable`] before the first successful publish.
    pub fn try_snapshot(&self) -> Result<Arc<BaselineSnapshot>, Error> {
        let loaded = *self
            .loaded
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !loaded {
            return Err(Error::BaselineUnavailable);
        }
        Ok(self.snapshot())
    }

    /// Atomically replace the served snapshot.
    pub fn publish(&self, snapshot: BaselineSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = snapshot;
        *self
            .loaded
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = true;
        tracing::info!("baseline snapshot published");
    }

    /// Batch recompute from a reference-data source. On any source failure
    /// the prior snapshot stays in effect and the error is returned to the
    /// scheduler that owns the refresh cadence.
    pub fn refresh_from(&self, source: &dyn BaselineSource) -> Result<(), Error> {
        let incidents = source.incident_samples().inspect_err(|e| {
            tracing::warn!(error = %e, "baseline refresh failed, keeping prior snapshot");
        })?;
        let on_time = source.on_time_samples().inspect_err(|e| {
            tracing::warn!(error = %e, "baseline refresh failed, keeping prior snapshot");
        })?;
        self.publish(BaselineSnapshot::from_samples(incidents, on_time));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource {
        fail: bool,
    }

    impl BaselineSource for StaticSource {
        fn incident_samples(&self) -> Result<Vec<(StationId, f64)>, Error> {
            if self.fail {
                return Err(Error::InvalidNetwork("source offline".into()));
            }
            Ok(vec![
                (StationId::new("a"), 1.0),
                (StationId::new("b"), 9.0),
            ])
        }

        fn on_time_samples(&self) -> Result<Vec<(LineId, f64)>, Error> {
            Ok(vec![(LineId::new("1"), 88.0), (LineId::new("A"), 80.0)])
        }
    }

    #[test]
    fn test_summary_of_known_samples() {
        let summary =
            DistributionSummary::from_samples(&[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 8.0);
        assert_eq!(summary.p25, 4.0);
        assert_eq!(summary.p75, 8.0);
    }

    #[test]
    fn test_empty_distribution_falls_back_to_city_defaults() {
        let snapshot = BaselineSnapshot::city_defaults();
        assert!(snapshot.incidents.is_degenerate());
        assert_eq!(snapshot.incidents.summary().mean, 5.0);
        assert_eq!(snapshot.on_time.summary().mean, 85.0);
    }

    #[test]
    fn test_percentile_rank_counts_samples_at_or_below() {
        let samples = [1.0, 3.0, 5.0, 7.0, 9.0];
        assert_eq!(percentile_rank(&samples, 0.5), 0.0);
        assert_eq!(percentile_rank(&samples, 5.0), 60.0);
        assert_eq!(percentile_rank(&samples, 100.0), 100.0);
    }

    #[test]
    fn test_handle_degrades_before_first_load() {
        let handle = BaselineHandle::default();
        assert!(matches!(
            handle.try_snapshot(),
            Err(Error::BaselineUnavailable)
        ));
        // snapshot() still serves city defaults
        assert!(handle.snapshot().incidents.is_degenerate());
    }

    #[test]
    fn test_failed_refresh_keeps_prior_snapshot() {
        let handle = BaselineHandle::default();
        handle.refresh_from(&StaticSource { fail: false }).unwrap();
        let before = handle.snapshot();
        assert_eq!(before.incidents.value(&StationId::new("b")), Some(9.0));

        assert!(handle.refresh_from(&StaticSource { fail: true }).is_err());
        let after = handle.snapshot();
        assert_eq!(after.incidents.value(&StationId::new("b")), Some(9.0));
        assert!(handle.try_snapshot().is_ok());
    }
}

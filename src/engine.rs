//! Recommendation orchestrator: resolve, check cache, search, score,
//! explain, cache, respond.
//!
//! Pathfinding and scoring are pure and CPU-bound; the only blocking calls
//! in a request are geocoding and the cache store, both behind traits with
//! provider-side timeouts. Provider failures degrade the response (cache
//! skipped, templated explanation, single criterion dropped) instead of
//! aborting it; only resolution failures and an all-criteria pathfinding
//! failure end the request.

use rayon::prelude::*;
use serde::Serialize;

use crate::baseline::{BaselineHandle, BaselineSnapshot};
use crate::cache::CacheKey;
use crate::config::EngineConfig;
use crate::error::Error;
use crate::graph::TransitGraph;
use crate::pathfind::{self, Criterion};
use crate::resolver::{self, ResolvedAddress, StationSuggestion};
use crate::score::{self, ScoreKind, ScoredRoute};
use crate::traits::{BaselineSource, CacheStore, Explainer, Geocoder, RouteSummary};

/// The full response to one recommendation request.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    /// One scored route per successfully computed criterion, in request
    /// order.
    pub routes: Vec<ScoredRoute>,
    pub origin: ResolvedAddress,
    pub destination: ResolvedAddress,
    /// True when every requested criterion was served from cache.
    pub cache_hit: bool,
}

/// The route recommendation engine.
///
/// Holds the read-only transit graph, the currently published baseline
/// snapshot handle, and the collaborator providers. Stateless per request
/// beyond those; safe to share across request threads.
pub struct RecommendationEngine {
    graph: TransitGraph,
    baseline: BaselineHandle,
    geocoder: Box<dyn Geocoder + Send + Sync>,
    cache: Box<dyn CacheStore + Send + Sync>,
    explainer: Option<Box<dyn Explainer + Send + Sync>>,
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(
        graph: TransitGraph,
        baseline: BaselineHandle,
        geocoder: Box<dyn Geocoder + Send + Sync>,
        cache: Box<dyn CacheStore + Send + Sync>,
        config: EngineConfig,
    ) -> Self {
        Self {
            graph,
            baseline,
            geocoder,
            cache,
            explainer: None,
            config,
        }
    }

    /// Attach a text-generation collaborator. Without one (or when it
    /// fails) explanations come from the built-in template.
    pub fn with_explainer(mut self, explainer: Box<dyn Explainer + Send + Sync>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    pub fn graph(&self) -> &TransitGraph {
        &self.graph
    }

    pub fn baseline(&self) -> &BaselineHandle {
        &self.baseline
    }

    /// Batch recompute: publish a fresh baseline snapshot and overlay its
    /// metrics onto the serving graph. On source failure both the prior
    /// snapshot and the graph stay in effect.
    pub fn refresh_baseline(&mut self, source: &dyn BaselineSource) -> Result<(), Error> {
        self.baseline.refresh_from(source)?;
        self.graph = self.graph.refreshed(&self.baseline.snapshot());
        tracing::info!("graph metrics refreshed from new baseline");
        Ok(())
    }

    /// End-to-end recommendation between two addresses for the requested
    /// criteria (deduplicated, request order preserved).
    pub fn recommend(
        &self,
        origin_address: &str,
        destination_address: &str,
        criteria: &[Criterion],
    ) -> Result<Recommendation, Error> {
        let origin = resolver::resolve(
            self.geocoder.as_ref(),
            &self.graph,
            origin_address,
            &self.config.resolver,
        )?;
        let destination = resolver::resolve(
            self.geocoder.as_ref(),
            &self.graph,
            destination_address,
            &self.config.resolver,
        )?;

        let origin_station = origin.nearest().station.clone();
        let destination_station = destination.nearest().station.clone();
        tracing::info!(
            origin = %origin_station,
            destination = %destination_station,
            "recommendation request"
        );

        let mut requested: Vec<Criterion> = Vec::new();
        for criterion in criteria {
            if !requested.contains(criterion) {
                requested.push(*criterion);
            }
        }
        if requested.is_empty() {
            requested.extend(Criterion::ALL);
        }

        let baseline = self.baseline.snapshot();

        // Cache pass first; misses are computed afterwards in parallel.
        let mut served: Vec<(Criterion, Option<ScoredRoute>)> = Vec::new();
        for criterion in &requested {
            let key = CacheKey {
                origin: origin_station.clone(),
                destination: destination_station.clone(),
                criterion: *criterion,
            };
            let cached = match self.cache.get(&key) {
                Ok(cached) => cached,
                Err(e) => {
                    tracing::warn!(error = %e, "cache read failed, treating as miss");
                    None
                }
            };
            served.push((*criterion, cached));
        }

        let misses: Vec<Criterion> = served
            .iter()
            .filter(|(_, cached)| cached.is_none())
            .map(|(criterion, _)| *criterion)
            .collect();

        let mut computed: std::collections::HashMap<Criterion, Result<ScoredRoute, Error>> =
            misses
                .par_iter()
                .map(|criterion| {
                    let result = self.compute_route(
                        &origin,
                        &destination,
                        *criterion,
                        &baseline,
                    );
                    (*criterion, result)
                })
                .collect();

        let mut routes: Vec<ScoredRoute> = Vec::new();
        let mut fresh = 0usize;
        for (criterion, cached) in served {
            match cached {
                Some(mut scored) => {
                    scored.from_cache = true;
                    routes.push(scored);
                }
                None => {
                    let Some(result) = computed.remove(&criterion) else {
                        continue;
                    };
                    match result {
                        Ok(scored) => {
                            fresh += 1;
                            let key = CacheKey {
                                origin: origin_station.clone(),
                                destination: destination_station.clone(),
                                criterion,
                            };
                            if let Err(e) = self.cache.put(
                                key,
                                scored.clone(),
                                self.config.cache.ttl(),
                            ) {
                                tracing::warn!(error = %e, "cache write failed, skipping");
                            }
                            routes.push(scored);
                        }
                        Err(Error::NoRouteFound { .. }) => {
                            // Drop only this criterion; the others still count.
                            tracing::warn!(%criterion, "no route for criterion");
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        if routes.is_empty() {
            return Err(Error::NoRouteFound {
                origin: origin_station,
                destination: destination_station,
            });
        }

        Ok(Recommendation {
            cache_hit: fresh == 0,
            routes,
            origin,
            destination,
        })
    }

    /// Ranked nearby-station suggestions for one address.
    pub fn suggest_stations(&self, address: &str) -> Result<Vec<StationSuggestion>, Error> {
        resolver::resolve(
            self.geocoder.as_ref(),
            &self.graph,
            address,
            &self.config.resolver,
        )
        .map(|resolved| resolved.suggestions)
    }

    fn compute_route(
        &self,
        origin: &ResolvedAddress,
        destination: &ResolvedAddress,
        criterion: Criterion,
        baseline: &BaselineSnapshot,
    ) -> Result<ScoredRoute, Error> {
        let route = pathfind::shortest_path(
            &self.graph,
            baseline,
            &origin.nearest().station,
            &destination.nearest().station,
            criterion,
            &self.config.search,
        )?;
        let scores = score::score_route(&route, baseline);

        let summary = RouteSummary {
            criterion_name: criterion.route_name().to_string(),
            origin: origin.nearest().station_name.clone(),
            destination: destination.nearest().station_name.clone(),
            lines: route.lines.clone(),
            total_minutes: route.total_minutes,
            transfers: route.transfers,
            scores,
            baseline_mean_incidents: baseline.incidents.summary().mean,
            baseline_mean_on_time: baseline.on_time.summary().mean,
        };
        let explanation = self.explain(&summary);

        Ok(ScoredRoute {
            criterion,
            name: criterion.route_name().to_string(),
            route,
            scores,
            explanation,
            from_cache: false,
        })
    }

    /// Explanation text for a route: the collaborator's if it answers, the
    /// template otherwise.
    fn explain(&self, summary: &RouteSummary) -> String {
        if let Some(explainer) = &self.explainer {
            match explainer.explain(summary) {
                Ok(text) => return text,
                Err(e) => {
                    tracing::warn!(error = %e, "explainer failed, using template");
                }
            }
        }
        templated_explanation(summary)
    }
}

/// Deterministic fallback explanation assembled from the score summary.
pub fn templated_explanation(summary: &RouteSummary) -> String {
    let lines = if summary.lines.is_empty() {
        "no ride needed".to_string()
    } else {
        let names: Vec<&str> = summary.lines.iter().map(|l| l.as_str()).collect();
        format!("lines {}", names.join(", "))
    };
    format!(
        "{} from {} to {} via {}: about {} min with {} transfer{}. \
         Safety {}/10 ({}, city average {:.1} incidents/station). \
         Reliability {}/10 ({}, city average {:.0}% on time). \
         Efficiency {}/10 ({}).",
        summary.criterion_name,
        summary.origin,
        summary.destination,
        lines,
        summary.total_minutes.round() as i64,
        summary.transfers,
        if summary.transfers == 1 { "" } else { "s" },
        summary.scores.safety,
        score::interpret(ScoreKind::Safety, summary.scores.safety),
        summary.baseline_mean_incidents,
        summary.scores.reliability,
        score::interpret(ScoreKind::Reliability, summary.scores.reliability),
        summary.baseline_mean_on_time,
        summary.scores.efficiency,
        score::interpret(ScoreKind::Efficiency, summary.scores.efficiency),
    )
}

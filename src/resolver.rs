//! Dataset-wide choice between exact coordinates and country centroids

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{ResolvedRoute, RouteCounts, RouteKey};
use crate::centroid::CountryCentroids;
use crate::error::{FlowError, FlowResult};
use crate::record::NormalizedRecord;

/// Strategy governing how every record of a run maps to route endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionMode {
    Unresolved,
    Exact,
    Fallback,
    Failed,
}

impl ResolutionMode {
    fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unresolved, Self::Exact)
                | (Self::Unresolved, Self::Fallback)
                | (Self::Fallback, Self::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unresolved => "UNRESOLVED",
            Self::Exact => "EXACT",
            Self::Fallback => "FALLBACK",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Which path the resolver took, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeTransition {
    Exact,
    SwitchedToFallback,
    Failed,
}

/// Aggregated routes under the single mode chosen for the run.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub mode: ResolutionMode,
    pub transition: ModeTransition,
    pub counts: RouteCounts,
    /// Records that produced a route under `mode`
    pub contributing: usize,
    /// Country-eligible records dropped in FALLBACK for lack of a centroid
    pub missing_centroid: usize,
}

/// Runs the exact-then-fallback switch once per dataset.
#[derive(Debug)]
pub struct Resolver {
    mode: ResolutionMode,
    partitions: usize,
}

impl Resolver {
    pub fn new(partitions: usize) -> Self {
        Self {
            mode: ResolutionMode::Unresolved,
            partitions: partitions.max(1),
        }
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    fn advance(&mut self, next: ResolutionMode) {
        debug_assert!(
            self.mode.can_become(next),
            "illegal mode transition {} -> {}",
            self.mode,
            next
        );
        info!(from = %self.mode, to = %next, "resolution mode set");
        self.mode = next;
    }

    /// Resolve every record under one mode.
    ///
    /// EXACT is tried over the whole dataset first. FALLBACK is only attempted
    /// when EXACT produced no route at all, and never mixed with it.
    pub fn resolve(&mut self, records: &[NormalizedRecord]) -> FlowResult<Resolution> {
        if self.mode.is_terminal() {
            return Err(FlowError::AlreadyResolved(self.mode));
        }

        let exact = exact_routes(records);
        debug!(candidates = exact.len(), "exact coordinate records");
        if !exact.is_empty() {
            let counts = RouteCounts::from_resolved_partitioned(&exact, self.partitions);
            self.advance(ResolutionMode::Exact);
            return Ok(Resolution {
                mode: self.mode,
                transition: ModeTransition::Exact,
                counts,
                contributing: exact.len(),
                missing_centroid: 0,
            });
        }

        info!("no exact coordinate routes; switching to country centroids");
        self.advance(ResolutionMode::Fallback);

        let centroids = CountryCentroids::build(records);
        let (sources, destinations) = centroids.country_counts();
        debug!(sources, destinations, "country centroids built");

        let (fallback, missing_centroid) = centroid_routes(records, &centroids);
        if missing_centroid > 0 {
            warn!(
                dropped = missing_centroid,
                "records dropped: country has no coordinate sample"
            );
        }

        if fallback.is_empty() {
            self.advance(ResolutionMode::Failed);
            let unusable = records
                .iter()
                .filter(|r| !r.is_exact() && !r.is_country_eligible())
                .count();
            return Err(FlowError::DataInsufficient {
                total_records: records.len(),
                unusable_records: unusable + missing_centroid,
                attempted: ResolutionMode::Fallback,
            });
        }

        let counts = RouteCounts::from_resolved_partitioned(&fallback, self.partitions);
        Ok(Resolution {
            mode: self.mode,
            transition: ModeTransition::SwitchedToFallback,
            counts,
            contributing: fallback.len(),
            missing_centroid,
        })
    }
}

fn exact_routes(records: &[NormalizedRecord]) -> Vec<ResolvedRoute> {
    records
        .iter()
        .filter_map(|record| {
            let (source, destination) = record.exact_endpoints()?;
            Some(ResolvedRoute {
                index: record.index,
                key: RouteKey::new(source, destination),
            })
        })
        .collect()
}

fn centroid_routes(
    records: &[NormalizedRecord],
    centroids: &CountryCentroids,
) -> (Vec<ResolvedRoute>, usize) {
    let mut missing = 0;
    let mut routes = Vec::new();
    for record in records {
        let Some((customer, order)) = record.countries() else {
            continue;
        };
        match centroids.endpoints(customer, order) {
            Some((source, destination)) => routes.push(ResolvedRoute {
                index: record.index,
                key: RouteKey::new(source, destination),
            }),
            None => missing += 1,
        }
    }
    (routes, missing)
}

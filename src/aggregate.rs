//! Route aggregation as a mergeable map of counts

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::record::Point;

/// Directed route identity. (A, B) and (B, A) are different routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RouteKey {
    pub source: Point,
    pub destination: Point,
}

impl RouteKey {
    pub fn new(source: Point, destination: Point) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// A record resolved to its endpoints under the active mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRoute {
    /// Input position of the originating record
    pub index: usize,
    pub key: RouteKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTally {
    pub count: usize,
    /// Smallest input index that produced this route
    pub first_seen: usize,
}

impl RouteTally {
    fn combine(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            first_seen: self.first_seen.min(other.first_seen),
        }
    }
}

/// Route → count mapping.
///
/// `merge` sums counts and keeps the earliest first-seen index, so partial
/// mappings built over any partition of the records combine to the same result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteCounts {
    tallies: HashMap<RouteKey, RouteTally>,
}

impl RouteCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, route: &ResolvedRoute) {
        let tally = RouteTally {
            count: 1,
            first_seen: route.index,
        };
        self.tallies
            .entry(route.key)
            .and_modify(|t| *t = t.combine(tally))
            .or_insert(tally);
    }

    pub fn merge(mut self, other: Self) -> Self {
        if self.tallies.len() < other.tallies.len() {
            return other.merge(self);
        }
        for (key, tally) in other.tallies {
            self.tallies
                .entry(key)
                .and_modify(|t| *t = t.combine(tally))
                .or_insert(tally);
        }
        self
    }

    /// Sequential fold over resolved records
    pub fn from_resolved(routes: &[ResolvedRoute]) -> Self {
        routes.iter().fold(Self::new(), |mut acc, route| {
            acc.observe(route);
            acc
        })
    }

    /// Aggregate `partitions` contiguous chunks on the rayon pool and reduce them.
    pub fn from_resolved_partitioned(routes: &[ResolvedRoute], partitions: usize) -> Self {
        if partitions <= 1 || routes.len() < 2 {
            return Self::from_resolved(routes);
        }
        let chunk_size = routes.len().div_ceil(partitions).max(1);
        routes
            .par_chunks(chunk_size)
            .map(Self::from_resolved)
            .reduce(Self::new, Self::merge)
    }

    pub fn get(&self, key: &RouteKey) -> Option<&RouteTally> {
        self.tallies.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouteKey, &RouteTally)> {
        self.tallies.iter()
    }

    /// Number of distinct routes
    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// Sum of all route counts
    pub fn total(&self) -> usize {
        self.tallies.values().map(|t| t.count).sum()
    }
}

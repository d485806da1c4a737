//! Top-N route selection and per-node traffic over the selection

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::{RouteCounts, RouteKey};
use crate::error::{FlowError, FlowResult};
use crate::record::Point;

pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Route {
    pub source: Point,
    pub destination: Point,
    pub count: usize,
}

impl Route {
    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.source, self.destination)
    }
}

/// Busiest routes, non-increasing by count, ties in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedRouteSet {
    routes: Vec<Route>,
}

impl RankedRouteSet {
    /// Rank all routes and keep the first `min(n, routes)`.
    pub fn select(counts: &RouteCounts, n: usize) -> FlowResult<Self> {
        if n == 0 {
            return Err(FlowError::InvalidParameter(
                "top-N must be at least 1".to_string(),
            ));
        }

        let mut ranked: Vec<(&RouteKey, usize, usize)> = counts
            .iter()
            .map(|(key, tally)| (key, tally.count, tally.first_seen))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(n);

        Ok(Self {
            routes: ranked
                .into_iter()
                .map(|(key, count, _)| Route {
                    source: key.source,
                    destination: key.destination,
                    count,
                })
                .collect(),
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// (min, max) count among the selected routes
    pub fn count_range(&self) -> Option<(usize, usize)> {
        let min = self.routes.iter().map(|r| r.count).min()?;
        let max = self.routes.iter().map(|r| r.count).max()?;
        Some((min, max))
    }
}

/// Traffic incident to each node of a ranked set, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDegrees {
    order: Vec<Point>,
    degrees: HashMap<Point, usize>,
}

impl NodeDegrees {
    pub fn accumulate(ranked: &RankedRouteSet) -> Self {
        let mut nodes = Self::default();
        for route in ranked.routes() {
            nodes.add(route.source, route.count);
            nodes.add(route.destination, route.count);
        }
        nodes
    }

    fn add(&mut self, point: Point, count: usize) {
        match self.degrees.get_mut(&point) {
            Some(degree) => *degree += count,
            None => {
                self.order.push(point);
                self.degrees.insert(point, count);
            }
        }
    }

    pub fn get(&self, point: &Point) -> Option<usize> {
        self.degrees.get(point).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Point, usize)> + '_ {
        self.order.iter().map(|p| (*p, self.degrees[p]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn degree_range(&self) -> Option<(usize, usize)> {
        let min = self.degrees.values().min()?;
        let max = self.degrees.values().max()?;
        Some((*min, *max))
    }
}

//! End-to-end flow-map computation: normalize, resolve, rank, encode

use serde::Serialize;
use tracing::{debug, info};

use crate::config::FlowConfig;
use crate::encode::{ColorTier, DegenerateScale, LinearScale, ScaleKind};
use crate::error::{FlowError, FlowResult};
use crate::ranking::{NodeDegrees, RankedRouteSet};
use crate::record::{Normalizer, Point, ShipmentRecord};
use crate::resolver::{ModeTransition, ResolutionMode, Resolver};

/// A selected route with its visual encoding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedRoute {
    pub source: Point,
    pub destination: Point,
    pub count: usize,
    pub weight: f64,
    pub color_tier: ColorTier,
}

/// An endpoint of the selected routes with its visual encoding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedNode {
    pub point: Point,
    pub degree: usize,
    pub radius: f64,
}

/// Run summary for logs and reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub total_records: usize,
    /// Records with neither usable coordinates nor countries, plus
    /// FALLBACK records whose country had no centroid
    pub unusable_records: usize,
    pub contributing_records: usize,
    /// Valid records that only qualified under the mode not taken
    pub ignored_records: usize,
    pub transition: ModeTransition,
    /// Distinct routes before truncation
    pub distinct_routes: usize,
    /// N after clamping to the number of distinct routes
    pub top_n_used: usize,
    pub degenerate_scales: Vec<DegenerateScale>,
}

/// Everything the rendering side needs to draw the flow map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowMap {
    pub mode: ResolutionMode,
    pub routes: Vec<EncodedRoute>,
    pub nodes: Vec<EncodedNode>,
    pub diagnostics: Diagnostics,
}

impl FlowMap {
    /// Mean destination of the selected routes, used to centre the map
    pub fn map_center(&self) -> Option<Point> {
        if self.routes.is_empty() {
            return None;
        }
        let n = self.routes.len() as f64;
        let lat = self.routes.iter().map(|r| r.destination.lat).sum::<f64>() / n;
        let lon = self.routes.iter().map(|r| r.destination.lon).sum::<f64>() / n;
        Point::try_new(Some(lat), Some(lon))
    }

    /// Bounding box of all nodes as ((min_lat, min_lon), (max_lat, max_lon))
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = self.nodes.first()?.point;
        let (mut lo, mut hi) = (first, first);
        for node in &self.nodes {
            lo.lat = lo.lat.min(node.point.lat);
            lo.lon = lo.lon.min(node.point.lon);
            hi.lat = hi.lat.max(node.point.lat);
            hi.lon = hi.lon.max(node.point.lon);
        }
        Some((lo, hi))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the flow map for a batch of shipment records.
///
/// # Errors
/// * `InvalidParameter` for a bad config or when no record carries any
///   coordinate or country value
/// * `DataInsufficient` when neither exact coordinates nor country
///   centroids yield a single route
pub fn build_flow_map(records: &[ShipmentRecord], config: &FlowConfig) -> FlowResult<FlowMap> {
    config.validate()?;

    let mut normalizer = Normalizer::new();
    let normalized = normalizer.normalize_all(records);
    if normalizer.saw_no_fields() {
        return Err(FlowError::InvalidParameter(
            "no coordinate or country values present in the dataset".to_string(),
        ));
    }
    debug!(
        total = normalizer.records_seen(),
        unusable = normalizer.unusable(),
        "records normalized"
    );

    let resolution = Resolver::new(config.partitions).resolve(&normalized)?;
    let ranked = RankedRouteSet::select(&resolution.counts, config.top_n)?;
    let degrees = NodeDegrees::accumulate(&ranked);

    let mut degenerate_scales = Vec::new();
    let routes = encode_routes(&ranked, config, &mut degenerate_scales);
    let nodes = encode_nodes(&degrees, config, &mut degenerate_scales);

    let total_records = normalizer.records_seen();
    let unusable_records = normalizer.unusable() + resolution.missing_centroid;
    let diagnostics = Diagnostics {
        total_records,
        unusable_records,
        contributing_records: resolution.contributing,
        ignored_records: total_records
            .saturating_sub(unusable_records)
            .saturating_sub(resolution.contributing),
        transition: resolution.transition,
        distinct_routes: resolution.counts.len(),
        top_n_used: ranked.len(),
        degenerate_scales,
    };
    info!(
        mode = %resolution.mode,
        routes = diagnostics.distinct_routes,
        top_n = diagnostics.top_n_used,
        contributing = diagnostics.contributing_records,
        unusable = diagnostics.unusable_records,
        "flow map built"
    );

    Ok(FlowMap {
        mode: resolution.mode,
        routes,
        nodes,
        diagnostics,
    })
}

fn encode_routes(
    ranked: &RankedRouteSet,
    config: &FlowConfig,
    warnings: &mut Vec<DegenerateScale>,
) -> Vec<EncodedRoute> {
    let Some((min, max)) = ranked.count_range() else {
        return Vec::new();
    };
    let scale = LinearScale::new((min, max), config.weight_range);
    warnings.extend(scale.degenerate(ScaleKind::LineWeight));

    ranked
        .routes()
        .iter()
        .map(|route| EncodedRoute {
            source: route.source,
            destination: route.destination,
            count: route.count,
            weight: scale.apply(route.count),
            color_tier: ColorTier::for_count(route.count, max),
        })
        .collect()
}

fn encode_nodes(
    degrees: &NodeDegrees,
    config: &FlowConfig,
    warnings: &mut Vec<DegenerateScale>,
) -> Vec<EncodedNode> {
    let Some(range) = degrees.degree_range() else {
        return Vec::new();
    };
    let scale = LinearScale::new(range, config.radius_range);
    warnings.extend(scale.degenerate(ScaleKind::NodeRadius));

    degrees
        .iter()
        .map(|(point, degree)| EncodedNode {
            point,
            degree,
            radius: scale.apply(degree),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(pairs: &[((f64, f64), (f64, f64))]) -> Vec<ShipmentRecord> {
        pairs
            .iter()
            .map(|&(s, d)| ShipmentRecord::with_coords(s, d))
            .collect()
    }

    const A: (f64, f64) = (10.0, 10.0);
    const B: (f64, f64) = (20.0, 20.0);
    const C: (f64, f64) = (30.0, 30.0);

    #[test]
    fn test_top_two_scenario() {
        let records = coords(&[(A, B), (A, B), (A, C), (B, C), (B, C), (B, C)]);
        let map = build_flow_map(&records, &FlowConfig::default().with_top_n(2)).unwrap();

        assert_eq!(map.mode, ResolutionMode::Exact);
        let summary: Vec<(Point, Point, usize)> = map
            .routes
            .iter()
            .map(|r| (r.source, r.destination, r.count))
            .collect();
        let p = |(lat, lon): (f64, f64)| Point::new(lat, lon);
        assert_eq!(summary, vec![(p(B), p(C), 3), (p(A), p(B), 2)]);

        assert_eq!(map.routes[0].weight, 12.0);
        assert_eq!(map.routes[1].weight, 2.0);
        assert_eq!(map.routes[0].color_tier, ColorTier::Peak);
        assert_eq!(map.routes[1].color_tier, ColorTier::High);

        let degrees: Vec<(Point, usize)> = map.nodes.iter().map(|n| (n.point, n.degree)).collect();
        assert_eq!(degrees, vec![(p(B), 5), (p(C), 3), (p(A), 2)]);
        assert_eq!(map.nodes[0].radius, 10.0);
        assert_eq!(map.nodes[2].radius, 3.0);

        assert_eq!(map.diagnostics.distinct_routes, 3);
        assert_eq!(map.diagnostics.top_n_used, 2);
        assert_eq!(map.diagnostics.contributing_records, 6);
        assert!(map.diagnostics.degenerate_scales.is_empty());
    }

    #[test]
    fn test_equal_traffic_uses_midpoints() {
        let records = coords(&[(A, B), (B, A)]);
        let map = build_flow_map(&records, &FlowConfig::default()).unwrap();

        assert!(map.routes.iter().all(|r| r.weight == 7.0));
        assert!(map.nodes.iter().all(|n| n.radius == 6.5));
        assert_eq!(map.diagnostics.degenerate_scales.len(), 2);
    }

    #[test]
    fn test_count_conservation_with_unusable_rows() {
        let mut records = coords(&[(A, B), (A, C), (A, B)]);
        records.push(ShipmentRecord::default());
        records.push(ShipmentRecord::with_countries("Spain", "France"));
        let map = build_flow_map(&records, &FlowConfig::default().with_top_n(1)).unwrap();

        let d = &map.diagnostics;
        assert_eq!(d.total_records, 5);
        assert_eq!(d.unusable_records, 1);
        assert_eq!(d.contributing_records, 3);
        assert_eq!(d.ignored_records, 1);
        assert_eq!(d.top_n_used, 1);
        assert_eq!(d.transition, ModeTransition::Exact);
    }

    #[test]
    fn test_rejects_dataset_without_fields() {
        let records = vec![ShipmentRecord {
            order_id: Some("42".into()),
            ..ShipmentRecord::default()
        }];
        assert!(matches!(
            build_flow_map(&records, &FlowConfig::default()),
            Err(FlowError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_dataset_is_insufficient() {
        let err = build_flow_map(&[], &FlowConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            FlowError::DataInsufficient {
                total_records: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_top_n_checked_first() {
        let records = coords(&[(A, B)]);
        let err = build_flow_map(&records, &FlowConfig::default().with_top_n(0)).unwrap_err();
        assert!(matches!(err, FlowError::InvalidParameter(_)));
    }

    #[test]
    fn test_map_center_and_json() {
        let records = coords(&[(A, B), (A, C)]);
        let map = build_flow_map(&records, &FlowConfig::default()).unwrap();
        assert_eq!(map.map_center(), Some(Point::new(25.0, 25.0)));
        assert_eq!(
            map.bounds(),
            Some((Point::new(10.0, 10.0), Point::new(30.0, 30.0)))
        );

        let json = map.to_json().unwrap();
        assert!(json.contains("\"mode\": \"EXACT\""));
        assert!(json.contains("\"color_tier\": \"peak\""));
    }
}

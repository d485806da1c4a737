//! Integration tests for RouteFlow

use std::io::Write;
use std::path::Path;

use routeflow::resolver::{ModeTransition, Resolver};
use routeflow::record::Normalizer;
use routeflow::{
    build_flow_map, load_shipments, render_flow_map, ColumnNames, FlowConfig, FlowError, Point,
    ResolutionMode, ShipmentRecord,
};
use tempfile::{tempdir, NamedTempFile};

const HEADER: &str =
    "order_id,latitude_src,longitude_src,latitude_dest,longitude_dest,customer_country,order_country";

/// Create a test CSV file with the given data rows
fn create_test_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

fn load(file: &NamedTempFile) -> Vec<ShipmentRecord> {
    load_shipments(file.path(), &ColumnNames::default()).unwrap()
}

#[test]
fn test_end_to_end_exact_routes() {
    // A = (10, 10), B = (20, 20), C = (30, 30)
    let file = create_test_csv(&[
        "1,10,10,20,20,Spain,France",
        "2,10,10,20,20,Spain,France",
        "3,10,10,30,30,Spain,Italy",
        "4,20,20,30,30,France,Italy",
        "5,20,20,30,30,France,Italy",
        "6,20,20,30,30,France,Italy",
    ]);
    let records = load(&file);
    let map = build_flow_map(&records, &FlowConfig::default().with_top_n(2)).unwrap();

    assert_eq!(map.mode, ResolutionMode::Exact);
    assert_eq!(map.routes.len(), 2);
    assert_eq!(map.routes[0].source, Point::new(20.0, 20.0));
    assert_eq!(map.routes[0].destination, Point::new(30.0, 30.0));
    assert_eq!(map.routes[0].count, 3);
    assert_eq!(map.routes[1].source, Point::new(10.0, 10.0));
    assert_eq!(map.routes[1].count, 2);

    let degrees: Vec<usize> = map.nodes.iter().map(|n| n.degree).collect();
    assert_eq!(degrees, vec![5, 3, 2]);
    assert_eq!(map.diagnostics.distinct_routes, 3);
    assert_eq!(map.diagnostics.contributing_records, 6);
}

#[test]
fn test_fallback_to_country_centroids() {
    // No row has all four coordinates, but each role has samples
    let file = create_test_csv(&[
        "1,40,-4,,,Spain,France",
        "2,42,-2,,,Spain,France",
        "3,,,48,2,Chile,France",
        "4,,,,,Spain,France",
        "5,,,,,Chile,France",
        "6,,,,,,",
    ]);
    let records = load(&file);
    let map = build_flow_map(&records, &FlowConfig::default()).unwrap();

    assert_eq!(map.mode, ResolutionMode::Fallback);
    assert_eq!(map.diagnostics.transition, ModeTransition::SwitchedToFallback);
    assert_eq!(map.routes.len(), 1);
    assert_eq!(map.routes[0].source, Point::new(41.0, -3.0));
    assert_eq!(map.routes[0].destination, Point::new(48.0, 2.0));
    assert_eq!(map.routes[0].count, 3);

    // Chile has no source sample; row 6 has nothing at all
    assert_eq!(map.diagnostics.contributing_records, 3);
    assert_eq!(map.diagnostics.unusable_records, 3);
}

#[test]
fn test_insufficient_data() {
    let file = create_test_csv(&["1,,,,,Spain,France", "2,,,,,Chile,Peru"]);
    let records = load(&file);

    let err = build_flow_map(&records, &FlowConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        FlowError::DataInsufficient {
            total_records: 2,
            attempted: ResolutionMode::Fallback,
            ..
        }
    ));

    let normalized = Normalizer::new().normalize_all(&records);
    let mut resolver = Resolver::new(1);
    assert!(resolver.resolve(&normalized).is_err());
    assert_eq!(resolver.mode(), ResolutionMode::Failed);
}

#[test]
fn test_partitioned_run_matches_serial() {
    let records: Vec<ShipmentRecord> = (0..500)
        .map(|i| {
            ShipmentRecord::with_coords(
                ((i % 7) as f64, (i % 3) as f64),
                ((i % 11) as f64, 1.0),
            )
        })
        .collect();

    let serial = build_flow_map(&records, &FlowConfig::default()).unwrap();
    let parallel =
        build_flow_map(&records, &FlowConfig::default().with_partitions(6)).unwrap();

    assert_eq!(serial, parallel);
    assert_eq!(serial.diagnostics.contributing_records, 500);
    assert!(serial
        .routes
        .windows(2)
        .all(|pair| pair[0].count >= pair[1].count));
}

#[test]
fn test_render_and_export() {
    let file = create_test_csv(&[
        "1,18.4,-66.0,40.4,-3.7,Puerto Rico,Spain",
        "2,18.4,-66.0,40.4,-3.7,Puerto Rico,Spain",
        "3,40.4,-3.7,48.8,2.3,Spain,France",
    ]);
    let map = build_flow_map(&load(&file), &FlowConfig::default()).unwrap();

    let temp_dir = tempdir().unwrap();
    let png = temp_dir.path().join("flow.png");
    render_flow_map(&map, png.to_str().unwrap(), None).unwrap();
    assert!(Path::new(&png).exists());

    let json = map.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["mode"], "EXACT");
    assert_eq!(value["routes"].as_array().unwrap().len(), 2);
    assert_eq!(value["diagnostics"]["transition"], "exact");
}

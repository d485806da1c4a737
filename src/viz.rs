//! Flow-map rendering with Plotters and console summaries

use plotters::prelude::*;

use crate::pipeline::FlowMap;

/// Route colours from busiest to quietest tier
const TIER_COLORS: [RGBColor; 4] = [
    RGBColor(0xff, 0xa6, 0x00),
    RGBColor(0xff, 0x6e, 0x54),
    RGBColor(0xdd, 0x51, 0x82),
    RGBColor(0x95, 0x51, 0x96),
];

const NODE_COLOR: RGBColor = RGBColor(0x2e, 0xc4, 0xb6);
const BACKGROUND: RGBColor = RGBColor(0x1e, 0x1e, 0x24);

/// Draw the selected routes and nodes to a PNG.
///
/// Longitude runs along x and latitude along y. Segment width follows the
/// route weight, circle size the node radius.
///
/// # Arguments
/// * `flow_map` - Encoded routes and nodes
/// * `output_path` - Path to save the PNG
/// * `caption` - Optional title drawn above the map
pub fn render_flow_map(
    flow_map: &FlowMap,
    output_path: &str,
    caption: Option<&str>,
) -> crate::Result<()> {
    let Some((lo, hi)) = flow_map.bounds() else {
        anyhow::bail!("Flow map has no nodes to draw");
    };

    // pad so single-point extents still have an area
    let lon_pad = ((hi.lon - lo.lon) * 0.1).max(1.0);
    let lat_pad = ((hi.lat - lo.lat) * 0.1).max(1.0);

    let root = BitMapBackend::new(output_path, (1200, 800)).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if let Some(title) = caption {
        builder.caption(title, ("sans-serif", 26).into_font().color(&WHITE));
    }
    let mut chart = builder.build_cartesian_2d(
        (lo.lon - lon_pad)..(hi.lon + lon_pad),
        (lo.lat - lat_pad)..(hi.lat + lat_pad),
    )?;

    // draw the quietest routes first so busy ones stay on top
    for route in flow_map.routes.iter().rev() {
        let color = TIER_COLORS[route.color_tier.rank()];
        let width = route.weight.round().max(1.0) as u32;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (route.source.lon, route.source.lat),
                (route.destination.lon, route.destination.lat),
            ],
            color.mix(0.8).stroke_width(width),
        )))?;
    }

    chart.draw_series(flow_map.nodes.iter().map(|node| {
        Circle::new(
            (node.point.lon, node.point.lat),
            node.radius.round().max(1.0) as u32,
            NODE_COLOR.mix(0.7).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Print the ranked routes and run diagnostics to console
pub fn print_flow_summary(flow_map: &FlowMap, shown: usize) {
    let d = &flow_map.diagnostics;

    println!("\n=== Route Resolution ===");
    println!("Mode: {} ({:?})", flow_map.mode, d.transition);
    println!("Records seen: {}", d.total_records);
    println!("  Contributing: {}", d.contributing_records);
    println!("  Unusable: {}", d.unusable_records);
    println!("  Ignored (other mode only): {}", d.ignored_records);
    println!("Distinct routes: {}", d.distinct_routes);

    println!("\n=== Top {} Routes ===", d.top_n_used);
    println!("  Rank | Source               | Destination          | Orders | Weight");
    println!("  -----|----------------------|----------------------|--------|-------");
    for (i, route) in flow_map.routes.iter().take(shown).enumerate() {
        println!(
            "  {:4} | ({:8.3}, {:8.3}) | ({:8.3}, {:8.3}) | {:6} | {:5.1}",
            i + 1,
            route.source.lat,
            route.source.lon,
            route.destination.lat,
            route.destination.lon,
            route.count,
            route.weight
        );
    }

    for warning in &d.degenerate_scales {
        println!(
            "\nNote: every {:?} input equals {}, midpoint used",
            warning.kind, warning.value
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowConfig;
    use crate::pipeline::build_flow_map;
    use crate::record::ShipmentRecord;
    use std::path::Path;
    use tempfile::tempdir;

    fn create_test_map() -> FlowMap {
        let records = vec![
            ShipmentRecord::with_coords((40.4, -3.7), (48.8, 2.3)),
            ShipmentRecord::with_coords((40.4, -3.7), (48.8, 2.3)),
            ShipmentRecord::with_coords((18.4, -66.0), (40.4, -3.7)),
            ShipmentRecord::with_coords((18.4, -66.0), (19.4, -99.1)),
        ];
        build_flow_map(&records, &FlowConfig::default()).unwrap()
    }

    #[test]
    fn test_render_flow_map() {
        let map = create_test_map();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("flow.png");
        let output_str = output_path.to_str().unwrap();

        let result = render_flow_map(&map, output_str, None);
        assert!(result.is_ok());
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_render_single_node_map() {
        let records = vec![ShipmentRecord::with_coords((1.0, 1.0), (1.0, 1.0))];
        let map = build_flow_map(&records, &FlowConfig::default()).unwrap();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("loop.png");

        assert!(render_flow_map(&map, output_path.to_str().unwrap(), None).is_ok());
    }

    #[test]
    fn test_print_flow_summary() {
        print_flow_summary(&create_test_map(), 10);
    }
}

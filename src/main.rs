//! RouteFlow: shipping flow map from supply-chain order data
//!
//! This is the main entrypoint that orchestrates data loading, route
//! resolution and ranking, rendering, and the console report.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use routeflow::{build_flow_map, load_shipments, viz, Args, ColumnNames};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(&args);

    if args.verbose {
        println!("RouteFlow - Shipping Flow Map");
        println!("=============================\n");
    }

    run_pipeline(&args)
}

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Run the full flow-map pipeline
fn run_pipeline(args: &Args) -> Result<()> {
    println!("=== Flow Map Pipeline ===\n");

    let start_time = Instant::now();

    // Step 1: Load shipment records
    if args.verbose {
        println!("Step 1: Loading shipment records");
        println!("  Input file: {}", args.input);
    }

    let data_start = Instant::now();
    let records = load_shipments(&args.input, &ColumnNames::default())
        .with_context(|| format!("Failed to load shipments from {}", args.input))?;
    println!("✓ Data loaded: {} records", records.len());
    if args.verbose {
        println!("  Loading time: {:.2}s", data_start.elapsed().as_secs_f64());
    }

    // Step 2: Resolve, aggregate, rank and encode routes
    let config = args.flow_config();
    if args.verbose {
        println!("\nStep 2: Aggregating routes");
        println!("  Top-N: {}", config.top_n);
        println!("  Partitions: {}", config.partitions);
    }

    let build_start = Instant::now();
    let flow_map = build_flow_map(&records, &config)?;
    println!(
        "✓ Routes resolved using {} mode: {} distinct routes, top {} kept",
        flow_map.mode, flow_map.diagnostics.distinct_routes, flow_map.diagnostics.top_n_used
    );
    if args.verbose {
        println!("  Aggregation time: {:.2}s", build_start.elapsed().as_secs_f64());
    }

    viz::print_flow_summary(&flow_map, 10);

    // Step 3: Outputs
    if let Some(json_path) = &args.json {
        std::fs::write(json_path, flow_map.to_json()?)
            .with_context(|| format!("Failed to write {json_path}"))?;
        println!("\n✓ Flow data saved to: {json_path}");
    }

    if !args.no_render {
        if args.verbose {
            println!("\nStep 3: Rendering flow map");
            println!("  Output file: {}", args.output);
        }
        let caption = format!(
            "Top {} routes ({} resolution)",
            flow_map.diagnostics.top_n_used, flow_map.mode
        );
        viz::render_flow_map(&flow_map, &args.output, Some(&caption))?;
        println!("✓ Flow map saved to: {}", args.output);
    }

    println!("\n=== Pipeline Complete ===");
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

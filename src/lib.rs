//! RouteFlow: shipping-route aggregation and ranking for flow maps
//!
//! Order records are resolved to directed routes, either from their own
//! coordinates or, when no record has them, from per-country centroids.
//! Routes are counted, the busiest N are ranked, and counts are encoded
//! into line weights, colour tiers and node radii for rendering.

pub mod aggregate;
pub mod centroid;
pub mod cli;
pub mod config;
pub mod data;
pub mod encode;
pub mod error;
pub mod pipeline;
pub mod ranking;
pub mod record;
pub mod resolver;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use config::FlowConfig;
pub use data::{load_shipments, ColumnNames};
pub use error::{FlowError, FlowResult};
pub use pipeline::{build_flow_map, Diagnostics, FlowMap};
pub use record::{Point, ShipmentRecord};
pub use resolver::ResolutionMode;
pub use viz::render_flow_map;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;

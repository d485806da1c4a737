//! Command-line interface definitions and argument parsing

use clap::Parser;

use crate::config::FlowConfig;
use crate::ranking::DEFAULT_TOP_N;

/// Shipping flow map: aggregate order routes and rank the busiest ones
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "cadena_subministrament_2015_2018.csv")]
    pub input: String,

    /// Output path for the flow map PNG
    #[arg(short, long, default_value = "flow_map.png")]
    pub output: String,

    /// Number of busiest routes to keep
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Also write the ranked routes and nodes as JSON to this path
    #[arg(long)]
    pub json: Option<String>,

    /// Number of record partitions aggregated in parallel
    #[arg(short, long, default_value = "1")]
    pub partitions: usize,

    /// Skip PNG rendering
    #[arg(long)]
    pub no_render: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Pipeline settings derived from the arguments
    pub fn flow_config(&self) -> FlowConfig {
        FlowConfig::default()
            .with_top_n(self.top_n)
            .with_partitions(self.partitions)
    }

    /// Default tracing directive for the subscriber
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

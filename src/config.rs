//! Pipeline parameters

use serde::Serialize;

use crate::error::{FlowError, FlowResult};
use crate::ranking::DEFAULT_TOP_N;

/// Settings for one flow-map computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowConfig {
    /// Number of busiest routes kept
    pub top_n: usize,
    /// Line weight range for route segments
    pub weight_range: (f64, f64),
    /// Circle radius range for nodes
    pub radius_range: (f64, f64),
    /// Contiguous record partitions aggregated in parallel (1 = serial)
    pub partitions: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            weight_range: (2.0, 12.0),
            radius_range: (3.0, 10.0),
            partitions: 1,
        }
    }
}

impl FlowConfig {
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn validate(&self) -> FlowResult<()> {
        if self.top_n < 1 {
            return Err(FlowError::InvalidParameter(format!(
                "top-N must be at least 1, got {}",
                self.top_n
            )));
        }
        if self.partitions < 1 {
            return Err(FlowError::InvalidParameter(
                "partitions must be at least 1".to_string(),
            ));
        }
        check_range("weight", self.weight_range)?;
        check_range("radius", self.radius_range)
    }
}

fn check_range(name: &str, (lo, hi): (f64, f64)) -> FlowResult<()> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(FlowError::InvalidParameter(format!(
            "{name} range must be finite with min <= max, got ({lo}, {hi})"
        )));
    }
    Ok(())
}

//! Mapping of route counts and node degrees to visual magnitudes

use serde::Serialize;
use tracing::warn;

/// Relative traffic bucket of a route, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTier {
    /// count >= 0.9 * max
    Peak,
    /// count >= 0.6 * max
    High,
    /// count >= 0.3 * max
    Medium,
    Low,
}

impl ColorTier {
    pub fn for_count(count: usize, max: usize) -> Self {
        let count = count as f64;
        let max = max as f64;
        if count >= 0.9 * max {
            Self::Peak
        } else if count >= 0.6 * max {
            Self::High
        } else if count >= 0.3 * max {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Index into a four-entry palette
    pub fn rank(self) -> usize {
        match self {
            Self::Peak => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

/// Which scale collapsed to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    LineWeight,
    NodeRadius,
}

/// Non-fatal notice: every input of a scale had the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DegenerateScale {
    pub kind: ScaleKind,
    pub value: usize,
}

/// Linear map from an integer domain onto `[out_min, out_max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (usize, usize),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (usize, usize), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn is_degenerate(&self) -> bool {
        self.domain.0 == self.domain.1
    }

    /// Scaled value; the range midpoint when the domain is a single value.
    pub fn apply(&self, value: usize) -> f64 {
        let (lo, hi) = self.range;
        if self.is_degenerate() {
            return (lo + hi) / 2.0;
        }
        let (d_min, d_max) = (self.domain.0 as f64, self.domain.1 as f64);
        lo + (hi - lo) * ((value as f64 - d_min) / (d_max - d_min))
    }

    /// Warning record for a degenerate domain, if any.
    pub fn degenerate(&self, kind: ScaleKind) -> Option<DegenerateScale> {
        if !self.is_degenerate() {
            return None;
        }
        warn!(?kind, value = self.domain.0, "degenerate scale, using midpoint");
        Some(DegenerateScale {
            kind,
            value: self.domain.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_bounds() {
        let scale = LinearScale::new((3, 13), (2.0, 12.0));
        assert_eq!(scale.apply(3), 2.0);
        assert_eq!(scale.apply(13), 12.0);
        assert_eq!(scale.apply(8), 7.0);
        assert!(scale.degenerate(ScaleKind::LineWeight).is_none());
    }

    #[test]
    fn test_degenerate_uses_midpoint() {
        let weight = LinearScale::new((5, 5), (2.0, 12.0));
        assert_eq!(weight.apply(5), 7.0);
        assert_eq!(
            weight.degenerate(ScaleKind::LineWeight),
            Some(DegenerateScale {
                kind: ScaleKind::LineWeight,
                value: 5
            })
        );

        let radius = LinearScale::new((4, 4), (3.0, 10.0));
        assert_eq!(radius.apply(4), 6.5);
    }

    #[test]
    fn test_color_tiers() {
        assert_eq!(ColorTier::for_count(100, 100), ColorTier::Peak);
        assert_eq!(ColorTier::for_count(90, 100), ColorTier::Peak);
        assert_eq!(ColorTier::for_count(89, 100), ColorTier::High);
        assert_eq!(ColorTier::for_count(60, 100), ColorTier::High);
        assert_eq!(ColorTier::for_count(30, 100), ColorTier::Medium);
        assert_eq!(ColorTier::for_count(29, 100), ColorTier::Low);
        assert_eq!(ColorTier::Low.rank(), 3);
    }
}

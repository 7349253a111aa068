//! Result types for point queries.

use serde::{Deserialize, Serialize};

/// A location's current-period value next to its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointComparison {
    /// Current-period value
    pub value: f64,
    /// Baseline value at the same location
    pub baseline: f64,
    /// `value - baseline`
    pub difference: f64,
    /// Change relative to the baseline in percent; `None` when the baseline is zero
    pub percent_change: Option<f64>,
}

impl PointComparison {
    pub fn new(value: f64, baseline: f64) -> Self {
        let difference = value - baseline;
        let percent_change = if baseline != 0.0 {
            Some(difference / baseline * 100.0)
        } else {
            None
        };

        Self {
            value,
            baseline,
            difference,
            percent_change,
        }
    }
}

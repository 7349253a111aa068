//! Points emitted by grid difference queries.

use serde::{Deserialize, Serialize};

/// One sampled location of a difference grid.
///
/// `value` is the current-period measurement, `difference` is
/// `value - baseline`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub lat: f64,
    pub lng: f64,
    pub value: f64,
    pub difference: f64,
}

impl GridPoint {
    pub fn new(lat: f64, lng: f64, value: f64, difference: f64) -> Self {
        Self {
            lat,
            lng,
            value,
            difference,
        }
    }

    /// The baseline value this point was compared against.
    pub fn baseline(&self) -> f64 {
        self.value - self.difference
    }
}

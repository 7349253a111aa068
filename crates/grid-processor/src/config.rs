//! Configuration for the raster query engine.

use overlay_common::{OverlayError, OverlayResult};
use serde::{Deserialize, Serialize};

/// Configuration for the raster query engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Locator handed to the raster loader (base URL or directory).
    pub source_locator: String,

    /// Year whose rasters serve as the comparison baseline.
    pub baseline_year: i32,

    /// Stride used for grid queries that do not specify one.
    pub default_stride: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_locator: "/data".to_string(),
            baseline_year: 2019,
            default_stride: 1,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("NO2_SOURCE_LOCATOR") {
            config.source_locator = val;
        }

        if let Ok(val) = std::env::var("NO2_BASELINE_YEAR") {
            if let Ok(year) = val.parse() {
                config.baseline_year = year;
            }
        }

        if let Ok(val) = std::env::var("NO2_GRID_STRIDE") {
            if let Ok(stride) = val.parse() {
                config.default_stride = stride;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> OverlayResult<()> {
        if self.source_locator.trim().is_empty() {
            return Err(OverlayError::Config(
                "source_locator must not be empty".to_string(),
            ));
        }

        if self.default_stride == 0 {
            return Err(OverlayError::Config(
                "default_stride must be >= 1".to_string(),
            ));
        }

        Ok(())
    }
}

//! High-level raster query service.
//!
//! The `RasterQueryEngine` is the interface the UI layer talks to: point
//! samples, difference grids and cache control, all keyed by
//! [`RasterKey`]. Rasters come from an injected [`RasterLoader`] through a
//! [`RasterCache`] owned by (or shared with) the engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use grid_processor::{EngineConfig, RasterQueryEngine};
//!
//! let engine = RasterQueryEngine::new(EngineConfig::default(), Arc::new(loader))?;
//!
//! // Difference grid for April 2020 against April 2019, every 4th pixel
//! let key = RasterKey::new(2020, 4)?;
//! let points = engine.period_grid(key, Some(4)).await?;
//! ```

use std::sync::Arc;

use overlay_common::{GridPoint, OverlayError, OverlayResult, Raster, RasterKey};
use storage::{RasterCache, RasterCacheStats};
use tracing::debug;

use crate::config::EngineConfig;
use crate::difference::difference_grid;
use crate::interpolation::sample;
use crate::loader::RasterLoader;
use crate::query::PointComparison;

/// Point and grid queries over cached, lazily decoded rasters.
///
/// Sampling and differencing run synchronously once the rasters are
/// available; the only suspension point is the decode behind the cache.
/// Requests for different periods may complete in any order, so callers
/// should key results by the period they asked for.
pub struct RasterQueryEngine {
    config: EngineConfig,
    cache: Arc<RasterCache>,
    loader: Arc<dyn RasterLoader>,
}

impl RasterQueryEngine {
    /// Create an engine with its own empty cache.
    ///
    /// # Errors
    ///
    /// [`OverlayError::Config`] if `config` does not validate.
    pub fn new(config: EngineConfig, loader: Arc<dyn RasterLoader>) -> OverlayResult<Self> {
        Self::with_cache(config, loader, Arc::new(RasterCache::new()))
    }

    /// Create an engine on top of an existing cache.
    ///
    /// Useful when several engines (or tests) should share decoded rasters.
    pub fn with_cache(
        config: EngineConfig,
        loader: Arc<dyn RasterLoader>,
        cache: Arc<RasterCache>,
    ) -> OverlayResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache,
            loader,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The cache backing this engine.
    pub fn cache(&self) -> &Arc<RasterCache> {
        &self.cache
    }

    /// The baseline bucket a period is compared against: the same month of
    /// the configured baseline year.
    pub fn baseline_key(&self, key: RasterKey) -> RasterKey {
        key.with_year(self.config.baseline_year)
    }

    /// The decoded raster for `key`, loading it on first use.
    pub async fn raster(&self, key: RasterKey) -> OverlayResult<Arc<Raster>> {
        let loader = Arc::clone(&self.loader);
        let source = self.config.source_locator.clone();

        self.cache
            .get(key, move || async move {
                loader
                    .load(&source, key)
                    .await
                    .map_err(|err| err.for_key(key))
            })
            .await
    }

    /// Bilinear sample of the `key` raster at `(lat, lng)`.
    ///
    /// `Ok(None)` means no value at that location (outside the raster or
    /// touching a no-data cell).
    pub async fn sample(&self, key: RasterKey, lat: f64, lng: f64) -> OverlayResult<Option<f64>> {
        let raster = self.raster(key).await?;
        Ok(sample(&raster, lat, lng))
    }

    /// Sample many `(lat, lng)` locations against one raster.
    ///
    /// The result is index-aligned with `locations`.
    pub async fn sample_points(
        &self,
        key: RasterKey,
        locations: &[(f64, f64)],
    ) -> OverlayResult<Vec<Option<f64>>> {
        let raster = self.raster(key).await?;
        Ok(locations
            .iter()
            .map(|&(lat, lng)| sample(&raster, lat, lng))
            .collect())
    }

    /// Difference grid of `current` against `baseline` at `stride`.
    ///
    /// The stride is checked before any raster is loaded. Both rasters are
    /// resolved concurrently.
    pub async fn difference_grid(
        &self,
        current: RasterKey,
        baseline: RasterKey,
        stride: u32,
    ) -> OverlayResult<Vec<GridPoint>> {
        if stride < 1 {
            return Err(OverlayError::InvalidStride(stride));
        }

        let (current_raster, baseline_raster) =
            futures::try_join!(self.raster(current), self.raster(baseline))?;

        let points = difference_grid(&current_raster, &baseline_raster, stride)?;
        debug!(
            %current,
            %baseline,
            stride,
            points = points.len(),
            "Computed difference grid"
        );
        Ok(points)
    }

    /// Difference grid of a period against its baseline month.
    ///
    /// `stride` falls back to the configured default.
    pub async fn period_grid(
        &self,
        key: RasterKey,
        stride: Option<u32>,
    ) -> OverlayResult<Vec<GridPoint>> {
        let stride = stride.unwrap_or(self.config.default_stride);
        self.difference_grid(key, self.baseline_key(key), stride)
            .await
    }

    /// Current value, baseline value and change at one location.
    ///
    /// `Ok(None)` if either raster has no value there.
    pub async fn compare_point(
        &self,
        key: RasterKey,
        lat: f64,
        lng: f64,
    ) -> OverlayResult<Option<PointComparison>> {
        let baseline_key = self.baseline_key(key);
        let (current, baseline) =
            futures::try_join!(self.raster(key), self.raster(baseline_key))?;

        Ok(match (sample(&current, lat, lng), sample(&baseline, lat, lng)) {
            (Some(value), Some(base)) => Some(PointComparison::new(value, base)),
            _ => None,
        })
    }

    /// Drop every cached raster, forcing re-decode on next use.
    ///
    /// Decodes already running finish but are not cached. Returns the
    /// number of entries dropped.
    pub async fn clear(&self) -> usize {
        self.cache.clear().await
    }

    /// Get cache statistics for monitoring.
    pub async fn cache_stats(&self) -> RasterCacheStats {
        self.cache.stats().await
    }
}

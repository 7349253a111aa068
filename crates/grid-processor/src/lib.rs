//! Geospatial Raster Query Engine
//!
//! Answers point and grid queries over monthly NO2 rasters, comparing each
//! period against a fixed historical baseline:
//!
//! - **Point queries**: bilinear sample of one raster at a lat/lng
//! - **Grid queries**: walk the current raster at a stride and difference
//!   every pixel against the (bilinearly sampled) baseline
//! - **Caching**: rasters are decoded at most once per period, even under
//!   concurrent requests
//!
//! # Architecture
//!
//! ```text
//! UI request (date, stride)
//!      │
//!      ▼
//! RasterQueryEngine::period_grid(key)
//!      │
//!      ├─► RasterCache::get(key)            ─┐
//!      │                                     ├─► RasterLoader::load (once per key)
//!      ├─► RasterCache::get(baseline key)   ─┘
//!      │
//!      └─► difference_grid(current, baseline, stride)
//!               │
//!               ▼
//!          Vec<GridPoint> to the renderer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{EngineConfig, RasterQueryEngine};
//!
//! let engine = RasterQueryEngine::new(EngineConfig::from_env(), Arc::new(loader))?;
//!
//! let key = RasterKey::new(2020, 4)?;
//! let points = engine.period_grid(key, Some(4)).await?;
//! let berlin = engine.sample(key, 52.52, 13.405).await?;
//! ```

pub mod config;
pub mod difference;
pub mod interpolation;
pub mod loader;
pub mod query;
pub mod service;

// Re-export commonly used types at crate root
pub use config::EngineConfig;
pub use difference::{candidate_count, difference_grid};
pub use interpolation::sample;
pub use loader::RasterLoader;
pub use overlay_common::{GridPoint, OverlayError, OverlayResult, Raster, RasterKey};
pub use query::PointComparison;
pub use service::RasterQueryEngine;
pub use storage::{RasterCache, RasterCacheStats};

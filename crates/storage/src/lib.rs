//! Storage abstractions for the overlay engine.
//!
//! Provides the in-memory [`RasterCache`]: a keyed, single-flight store of
//! decoded rasters with generation-tagged invalidation.

pub mod raster_cache;

pub use raster_cache::{EntryState, RasterCache, RasterCacheStats};

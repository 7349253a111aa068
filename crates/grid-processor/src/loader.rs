//! The seam to whatever fetches and decodes raster files.

use async_trait::async_trait;
use overlay_common::{OverlayResult, Raster, RasterKey};

/// Fetches and decodes the raster for one time bucket.
///
/// Implementations own all I/O and file-format handling (e.g. a
/// georeferenced image container) and hand back a fully decoded
/// [`Raster`]. Errors are propagated to every caller waiting on the decode
/// and are not cached, so a later request retries.
#[async_trait]
pub trait RasterLoader: Send + Sync {
    /// Load the raster for `key` from `source`.
    ///
    /// # Arguments
    /// * `source` - Opaque locator from the engine configuration (base URL, directory, ...)
    /// * `key` - The (year, month) bucket to decode
    async fn load(&self, source: &str, key: RasterKey) -> OverlayResult<Raster>;
}

//! Common types shared across the NO2 overlay crates.
//!
//! - [`Geotransform`]: affine pixel <-> lat/lng mapping for one raster
//! - [`Raster`] / [`PixelBuffer`]: an immutable decoded single-band grid
//! - [`RasterKey`]: the (year, month) bucket a raster belongs to
//! - [`GridPoint`]: one differenced sample emitted by a grid query
//! - [`OverlayError`]: the error taxonomy used by every crate

pub mod error;
pub mod geotransform;
pub mod grid;
pub mod raster;
pub mod tile;
pub mod time;

pub use error::{OverlayError, OverlayResult};
pub use geotransform::{Extent, Geotransform};
pub use grid::GridPoint;
pub use raster::{PixelBuffer, Raster};
pub use tile::{TileCoord, MAX_ZOOM};
pub use time::RasterKey;

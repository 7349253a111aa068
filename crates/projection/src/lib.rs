//! Map projection math for aligning raster overlays with basemap tiles.
//!
//! Implements spherical Web Mercator at 256-pixel tile resolution.
//! Everything here is pure and non-suspending.

pub mod mercator;
pub mod viewport;

pub use mercator::{
    clamp_latitude, project, tile_bounds, tile_of, unproject, world_size, WorldPoint,
    MAX_LATITUDE, TILE_SIZE,
};
pub use overlay_common::MAX_ZOOM;
pub use viewport::{ScreenPoint, Viewport, VisibleTile};

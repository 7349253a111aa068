//! Spherical Web Mercator (EPSG:3857) in world-pixel space.
//!
//! World pixels span `[0, 256 * 2^zoom)` on both axes, origin at the
//! north-west corner (lat ~85.05, lng -180). Zoom levels above
//! [`MAX_ZOOM`] are treated as [`MAX_ZOOM`] by every function here.

use std::f64::consts::PI;

use overlay_common::{Extent, TileCoord, MAX_ZOOM};
use serde::{Deserialize, Serialize};

/// Edge length of a basemap tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude at which the square Mercator world ends.
///
/// Inputs are clamped to this before projecting; `tan` is singular at ±90.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// A position in world-pixel coordinates at some zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

/// Clamp a latitude into the projectable range.
#[inline]
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}

/// Width (and height) of the world in pixels at `zoom`.
#[inline]
pub fn world_size(zoom: u32) -> f64 {
    TILE_SIZE * 2f64.powi(zoom.min(MAX_ZOOM) as i32)
}

/// Project `(lat, lng)` to world pixels.
///
/// Latitude is clamped to ±[`MAX_LATITUDE`] first, so this is total.
pub fn project(lat: f64, lng: f64, zoom: u32) -> WorldPoint {
    let size = world_size(zoom);
    let lat_rad = clamp_latitude(lat).to_radians();

    let x = (lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * size;

    WorldPoint { x, y }
}

/// Inverse of [`project`]: world pixels back to `(lat, lng)`.
pub fn unproject(world_x: f64, world_y: f64, zoom: u32) -> (f64, f64) {
    let size = world_size(zoom);

    let lng = world_x / size * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * world_y / size)).sinh().atan().to_degrees();

    (lat, lng)
}

/// The tile containing `(lat, lng)` at `zoom`.
///
/// Longitudes on or beyond the antimeridian land in the edge columns.
pub fn tile_of(lat: f64, lng: f64, zoom: u32) -> TileCoord {
    let p = project(lat, lng, zoom);
    let max_index = (1u64 << zoom.min(MAX_ZOOM)) as f64 - 1.0;

    let x = (p.x / TILE_SIZE).floor().clamp(0.0, max_index) as u32;
    let y = (p.y / TILE_SIZE).floor().clamp(0.0, max_index) as u32;

    TileCoord::new(zoom, x, y)
}

/// Geographic bounds covered by a tile.
pub fn tile_bounds(tile: TileCoord) -> Extent {
    let x0 = tile.x as f64 * TILE_SIZE;
    let y0 = tile.y as f64 * TILE_SIZE;

    let (max_lat, min_lng) = unproject(x0, y0, tile.z);
    let (min_lat, max_lng) = unproject(x0 + TILE_SIZE, y0 + TILE_SIZE, tile.z);

    Extent {
        min_lat,
        min_lng,
        max_lat,
        max_lng,
    }
}

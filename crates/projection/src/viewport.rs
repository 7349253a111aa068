//! Screen-space placement of a map view.
//!
//! The view centre is drawn at the middle of the canvas; everything else is
//! offset from it in world pixels at the view's integer zoom.

use overlay_common::{TileCoord, MAX_ZOOM};
use serde::{Deserialize, Serialize};

use crate::mercator::{project, unproject, TILE_SIZE};

/// A canvas position in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// A basemap tile that intersects the canvas, with the screen position of
/// its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleTile {
    pub tile: TileCoord,
    pub screen: ScreenPoint,
}

/// The current map view: centre, zoom and canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(center_lat: f64, center_lng: f64, zoom: u32, width: u32, height: u32) -> Self {
        Self {
            center_lat,
            center_lng,
            zoom,
            width,
            height,
        }
    }

    /// Screen position of `(lat, lng)`.
    pub fn to_screen(&self, lat: f64, lng: f64) -> ScreenPoint {
        let point = project(lat, lng, self.zoom);
        let center = project(self.center_lat, self.center_lng, self.zoom);

        ScreenPoint {
            x: self.width as f64 / 2.0 + (point.x - center.x),
            y: self.height as f64 / 2.0 + (point.y - center.y),
        }
    }

    /// Geographic position under a screen pixel.
    pub fn from_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let center = project(self.center_lat, self.center_lng, self.zoom);
        let world_x = center.x + (x - self.width as f64 / 2.0);
        let world_y = center.y + (y - self.height as f64 / 2.0);
        unproject(world_x, world_y, self.zoom)
    }

    /// Tiles covering the canvas plus a one-tile margin on every side.
    ///
    /// Columns wrap around the antimeridian; rows outside the world are
    /// dropped. A wrapped tile can appear more than once at low zoom, each
    /// time with its own screen position.
    pub fn visible_tiles(&self) -> Vec<VisibleTile> {
        let n = 1i64 << self.zoom.min(MAX_ZOOM);
        let center = project(self.center_lat, self.center_lng, self.zoom);
        let center_tile_x = (center.x / TILE_SIZE).floor() as i64;
        let center_tile_y = (center.y / TILE_SIZE).floor() as i64;

        let tiles_wide = (self.width as f64 / TILE_SIZE).ceil() as i64 + 2;
        let tiles_high = (self.height as f64 / TILE_SIZE).ceil() as i64 + 2;
        let half_w = (tiles_wide + 1) / 2;
        let half_h = (tiles_high + 1) / 2;

        let mut tiles = Vec::with_capacity(((2 * half_w + 1) * (2 * half_h + 1)) as usize);
        for dx in -half_w..=half_w {
            for dy in -half_h..=half_h {
                let tx = center_tile_x + dx;
                let ty = center_tile_y + dy;
                if ty < 0 || ty >= n {
                    continue;
                }

                let wrapped_x = tx.rem_euclid(n);
                tiles.push(VisibleTile {
                    tile: TileCoord::new(self.zoom, wrapped_x as u32, ty as u32),
                    screen: ScreenPoint {
                        x: self.width as f64 / 2.0 + (tx as f64 * TILE_SIZE - center.x),
                        y: self.height as f64 / 2.0 + (ty as f64 * TILE_SIZE - center.y),
                    },
                });
            }
        }

        tiles
    }
}

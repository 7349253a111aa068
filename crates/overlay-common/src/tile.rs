//! Basemap tile coordinates.

use serde::{Deserialize, Serialize};

/// Deepest supported zoom level.
///
/// Column and row indices must fit in `u32`, so `2^z` tiles per axis caps
/// `z` at 31. Deeper zooms are treated as this one everywhere.
pub const MAX_ZOOM: u32 = 31;

/// A tile coordinate (z/x/y) in the 256-pixel Web Mercator scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Path fragment used by slippy-map tile servers.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }

    /// Number of tiles along each axis at this zoom (capped at [`MAX_ZOOM`]).
    pub fn tiles_per_axis(&self) -> u32 {
        1u32 << self.z.min(MAX_ZOOM)
    }
}

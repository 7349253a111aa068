//! Affine mapping between pixel indices and geographic coordinates.

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, OverlayResult};

/// North-up affine transform of a regular lat/lng raster.
///
/// Pixel `(0, 0)` sits exactly on `(origin_lat, origin_lng)`; each column
/// steps `pixel_width` degrees of longitude and each row steps
/// `pixel_height` degrees of latitude (negative for rows running north to
/// south).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geotransform {
    origin_lat: f64,
    origin_lng: f64,
    pixel_width: f64,
    pixel_height: f64,
}

impl Geotransform {
    /// Create a transform, rejecting degenerate pixel sizes.
    ///
    /// `pixel_width` must be finite and > 0, `pixel_height` finite and != 0.
    pub fn new(
        origin_lat: f64,
        origin_lng: f64,
        pixel_width: f64,
        pixel_height: f64,
    ) -> OverlayResult<Self> {
        if !origin_lat.is_finite() || !origin_lng.is_finite() {
            return Err(OverlayError::DegenerateGeotransform(format!(
                "origin ({}, {}) is not finite",
                origin_lat, origin_lng
            )));
        }
        if !pixel_width.is_finite() || pixel_width <= 0.0 {
            return Err(OverlayError::DegenerateGeotransform(format!(
                "pixel width must be > 0, got {}",
                pixel_width
            )));
        }
        if !pixel_height.is_finite() || pixel_height == 0.0 {
            return Err(OverlayError::DegenerateGeotransform(format!(
                "pixel height must be non-zero, got {}",
                pixel_height
            )));
        }

        Ok(Self {
            origin_lat,
            origin_lng,
            pixel_width,
            pixel_height,
        })
    }

    /// Build from a GDAL-style affine tuple
    /// `[origin_x, pixel_w, rot_x, origin_y, rot_y, pixel_h]`.
    ///
    /// Rotated or sheared rasters are not supported.
    pub fn from_gdal(coeffs: [f64; 6]) -> OverlayResult<Self> {
        let [origin_x, pixel_w, rot_x, origin_y, rot_y, pixel_h] = coeffs;
        if rot_x != 0.0 || rot_y != 0.0 {
            return Err(OverlayError::DegenerateGeotransform(format!(
                "rotation terms ({}, {}) are not supported",
                rot_x, rot_y
            )));
        }
        Self::new(origin_y, origin_x, pixel_w, pixel_h)
    }

    pub fn origin_lat(&self) -> f64 {
        self.origin_lat
    }

    pub fn origin_lng(&self) -> f64 {
        self.origin_lng
    }

    pub fn pixel_width(&self) -> f64 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> f64 {
        self.pixel_height
    }

    /// Convert (possibly fractional) pixel indices to `(lat, lng)`.
    #[inline]
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        let lng = self.origin_lng + col * self.pixel_width;
        let lat = self.origin_lat + row * self.pixel_height;
        (lat, lng)
    }

    /// Convert `(lat, lng)` to fractional `(col, row)`.
    ///
    /// No rounding is applied; callers needing indices round themselves.
    #[inline]
    pub fn geo_to_pixel(&self, lat: f64, lng: f64) -> (f64, f64) {
        let col = (lng - self.origin_lng) / self.pixel_width;
        let row = (lat - self.origin_lat) / self.pixel_height;
        (col, row)
    }

    /// Geographic bounds spanned by the pixel lattice of a `width x height` raster.
    pub fn extent(&self, width: u32, height: u32) -> Extent {
        let (lat0, lng0) = self.pixel_to_geo(0.0, 0.0);
        let (lat1, lng1) = self.pixel_to_geo(
            width.saturating_sub(1) as f64,
            height.saturating_sub(1) as f64,
        );

        Extent {
            min_lat: lat0.min(lat1),
            min_lng: lng0.min(lng1),
            max_lat: lat0.max(lat1),
            max_lng: lng0.max(lng1),
        }
    }
}

/// Inclusive lat/lng bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl Extent {
    /// Check if a point is inside (edges included).
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }

    /// Centre of the extent as `(lat, lng)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

//! Bilinear point sampling.

use overlay_common::Raster;

/// Fractional pixel coordinates closer than this to a lattice line are
/// snapped onto it, so that a coordinate computed from a pixel centre
/// (e.g. `origin + row * size`) reads that pixel exactly.
const SNAP_EPSILON: f64 = 1e-9;

#[inline]
fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPSILON {
        r
    } else {
        v
    }
}

/// Bilinear interpolation of `raster` at `(lat, lng)`.
///
/// Returns `None` outside the pixel lattice or when any contributing corner
/// is no-data; values are never blended across a no-data cell. All math is
/// done in `f64` whatever the pixel lane.
pub fn sample(raster: &Raster, lat: f64, lng: f64) -> Option<f64> {
    if !lat.is_finite() || !lng.is_finite() {
        return None;
    }

    let (fx, fy) = raster.geotransform().geo_to_pixel(lat, lng);
    let (fx, fy) = (snap(fx), snap(fy));

    let max_x = (raster.width() - 1) as f64;
    let max_y = (raster.height() - 1) as f64;
    if fx < 0.0 || fx > max_x || fy < 0.0 || fy > max_y {
        return None;
    }

    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    // A zero weight never pulls in the neighbouring column or row
    let x1 = if tx > 0.0 {
        (x0 + 1).min(raster.width() - 1)
    } else {
        x0
    };
    let y1 = if ty > 0.0 {
        (y0 + 1).min(raster.height() - 1)
    } else {
        y0
    };

    let v00 = raster.valid_value(x0, y0)?;
    let v10 = raster.valid_value(x1, y0)?;
    let v01 = raster.valid_value(x0, y1)?;
    let v11 = raster.valid_value(x1, y1)?;

    let top = v00 * (1.0 - tx) + v10 * tx;
    let bottom = v01 * (1.0 - tx) + v11 * tx;
    Some(top * (1.0 - ty) + bottom * ty)
}

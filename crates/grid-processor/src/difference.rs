//! Difference grids between a current-period raster and a baseline.
//!
//! The walk follows the current raster's own lattice and reads its pixels
//! directly; the baseline may sit on a different lattice, so it is read
//! through the bilinear sampler at each current pixel's location.

use overlay_common::{GridPoint, OverlayError, OverlayResult, Raster};

use crate::interpolation::sample;

/// Number of candidate pixels a walk over a `width x height` raster visits
/// at `stride`: `ceil(width / stride) * ceil(height / stride)`.
pub fn candidate_count(width: u32, height: u32, stride: u32) -> usize {
    if stride == 0 {
        return 0;
    }
    let cols = width.div_ceil(stride) as usize;
    let rows = height.div_ceil(stride) as usize;
    cols * rows
}

/// Walk `current` at `stride` and difference each pixel against `baseline`.
///
/// Rows and columns `0, stride, 2*stride, ...` are visited in raster order
/// (row-major, starting at the geotransform origin); the output is not
/// sorted geographically. Pixels that are no-data in `current`, or whose
/// location has no baseline sample, are skipped.
///
/// # Errors
///
/// [`OverlayError::InvalidStride`] when `stride` is 0.
pub fn difference_grid(
    current: &Raster,
    baseline: &Raster,
    stride: u32,
) -> OverlayResult<Vec<GridPoint>> {
    if stride < 1 {
        return Err(OverlayError::InvalidStride(stride));
    }

    let step = stride as usize;
    let transform = current.geotransform();
    let mut points = Vec::with_capacity(candidate_count(current.width(), current.height(), stride));

    for row in (0..current.height()).step_by(step) {
        for col in (0..current.width()).step_by(step) {
            let Some(value) = current.valid_value(col, row) else {
                continue;
            };

            let (lat, lng) = transform.pixel_to_geo(col as f64, row as f64);
            let Some(baseline_value) = sample(baseline, lat, lng) else {
                continue;
            };

            points.push(GridPoint::new(lat, lng, value, value - baseline_value));
        }
    }

    Ok(points)
}

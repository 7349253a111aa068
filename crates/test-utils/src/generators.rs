//! Test data generators for creating synthetic column-density rasters.
//!
//! These generators create predictable, verifiable patterns that can be
//! used across the test suite.

use overlay_common::{Geotransform, Raster};

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read correctly
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Returns
///
/// A `Vec<f32>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid of tropospheric NO2 column densities in mol/m².
///
/// Values rise from ~2e-5 in the north-west corner to ~8e-5 in the
/// south-east, roughly the range of a monthly TROPOMI composite.
/// `scale` multiplies every value (0.8 = 20% reduction).
pub fn create_no2_grid(width: usize, height: usize, scale: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            let density = 2.0e-5 + (x_factor * 3.0e-5) + (y_factor * 3.0e-5);
            data.push(density * scale);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a grid with the given cells replaced by `no_data`.
///
/// `holes` are `(col, row)` pairs.
pub fn create_grid_with_holes(
    width: usize,
    height: usize,
    holes: &[(usize, usize)],
    no_data: f32,
) -> Vec<f32> {
    let mut data = create_test_grid(width, height);
    for &(col, row) in holes {
        if col < width && row < height {
            data[row * width + col] = no_data;
        }
    }
    data
}

/// Wraps a `create_test_grid` pattern in a float32 raster.
pub fn create_test_raster(width: u32, height: u32, geotransform: Geotransform) -> Raster {
    Raster::new(
        width,
        height,
        geotransform,
        None,
        create_test_grid(width as usize, height as usize),
    )
    .expect("generated grid matches dimensions")
}

/// A float32 NO2 raster over `geotransform`, with `-9999` as no-data.
pub fn create_no2_raster(width: u32, height: u32, geotransform: Geotransform, scale: f32) -> Raster {
    Raster::new(
        width,
        height,
        geotransform,
        Some(-9999.0),
        create_no2_grid(width as usize, height as usize, scale),
    )
    .expect("generated grid matches dimensions")
}

/// A float32 raster holding one value everywhere.
pub fn create_constant_raster(
    width: u32,
    height: u32,
    geotransform: Geotransform,
    value: f32,
) -> Raster {
    Raster::new(
        width,
        height,
        geotransform,
        None,
        create_constant_grid(width as usize, height as usize, value),
    )
    .expect("generated grid matches dimensions")
}

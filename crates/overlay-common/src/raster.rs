//! Decoded single-band rasters.

use crate::error::{OverlayError, OverlayResult};
use crate::geotransform::{Extent, Geotransform};

/// Pixel storage in the lane width the decoder produced.
///
/// Every read goes through [`PixelBuffer::get`], which widens to `f64`.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    Float32(Vec<f32>),
    Int32(Vec<i32>),
    UInt16(Vec<u16>),
}

impl PixelBuffer {
    /// Number of pixels.
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::UInt16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a pixel widened to `f64`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            Self::Float32(v) => v.get(index).map(|&p| p as f64),
            Self::Int32(v) => v.get(index).map(|&p| p as f64),
            Self::UInt16(v) => v.get(index).map(|&p| p as f64),
        }
    }

    /// Lane name, for logging.
    pub fn lane(&self) -> &'static str {
        match self {
            Self::Float32(_) => "float32",
            Self::Int32(_) => "int32",
            Self::UInt16(_) => "uint16",
        }
    }
}

impl From<Vec<f32>> for PixelBuffer {
    fn from(v: Vec<f32>) -> Self {
        Self::Float32(v)
    }
}

impl From<Vec<i32>> for PixelBuffer {
    fn from(v: Vec<i32>) -> Self {
        Self::Int32(v)
    }
}

impl From<Vec<u16>> for PixelBuffer {
    fn from(v: Vec<u16>) -> Self {
        Self::UInt16(v)
    }
}

/// An immutable decoded grid, row-major with row 0 at the geotransform origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    geotransform: Geotransform,
    no_data: Option<f64>,
    pixels: PixelBuffer,
}

impl Raster {
    /// Create a raster, checking that the buffer holds exactly `width * height` pixels.
    ///
    /// For a float32 buffer the no-data sentinel is rounded to `f32`, the
    /// precision the decoder wrote it at.
    pub fn new(
        width: u32,
        height: u32,
        geotransform: Geotransform,
        no_data: Option<f64>,
        pixels: impl Into<PixelBuffer>,
    ) -> OverlayResult<Self> {
        let pixels = pixels.into();

        if width == 0 || height == 0 {
            return Err(OverlayError::InvalidRaster(format!(
                "dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }

        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(OverlayError::InvalidRaster(format!(
                "{}x{} raster needs {} pixels, buffer has {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }

        // Pixels are compared after widening, so the sentinel must carry the
        // lane's precision or float32 sentinels never match
        let no_data = match pixels {
            PixelBuffer::Float32(_) => no_data.map(|v| v as f32 as f64),
            _ => no_data,
        };

        Ok(Self {
            width,
            height,
            geotransform,
            no_data,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn geotransform(&self) -> &Geotransform {
        &self.geotransform
    }

    pub fn no_data(&self) -> Option<f64> {
        self.no_data
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Raw pixel value (widened) at `(col, row)`, or `None` outside the grid.
    ///
    /// No-data pixels are returned as-is; see [`Raster::valid_value`].
    #[inline]
    pub fn value(&self, col: u32, row: u32) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.pixels
            .get(row as usize * self.width as usize + col as usize)
    }

    /// Pixel value at `(col, row)` unless it is no-data.
    #[inline]
    pub fn valid_value(&self, col: u32, row: u32) -> Option<f64> {
        self.value(col, row).filter(|&v| !self.is_no_data(v))
    }

    /// Whether a widened pixel value means "no measurement".
    ///
    /// NaN always counts as no-data.
    #[inline]
    pub fn is_no_data(&self, value: f64) -> bool {
        if value.is_nan() {
            return true;
        }
        match self.no_data {
            Some(sentinel) => value == sentinel,
            None => false,
        }
    }

    /// Bounds of the pixel lattice.
    pub fn extent(&self) -> Extent {
        self.geotransform.extent(self.width, self.height)
    }

    /// `(min, max)` over valid pixels, `None` if every pixel is no-data.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        (0..self.pixels.len())
            .filter_map(|i| self.pixels.get(i))
            .filter(|&v| !self.is_no_data(v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gt() -> Geotransform {
        Geotransform::new(52.0, 13.0, 0.01, -0.01).unwrap()
    }

    #[test]
    fn test_buffer_length_checked() {
        let err = Raster::new(3, 3, gt(), None, vec![0.0f32; 8]).unwrap_err();
        assert!(matches!(err, OverlayError::InvalidRaster(_)));

        let err = Raster::new(0, 3, gt(), None, Vec::<f32>::new()).unwrap_err();
        assert!(matches!(err, OverlayError::InvalidRaster(_)));

        assert!(Raster::new(3, 2, gt(), None, vec![0u16; 6]).is_ok());
    }

    #[test]
    fn test_value_row_major() {
        let raster = Raster::new(3, 2, gt(), None, vec![1i32, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(raster.value(0, 0), Some(1.0));
        assert_eq!(raster.value(2, 0), Some(3.0));
        assert_eq!(raster.value(0, 1), Some(4.0));
        assert_eq!(raster.value(2, 1), Some(6.0));
        assert_eq!(raster.value(3, 0), None);
        assert_eq!(raster.value(0, 2), None);
    }

    #[test]
    fn test_lanes_widen() {
        let f = PixelBuffer::from(vec![1.5f32]);
        let i = PixelBuffer::from(vec![-7i32]);
        let u = PixelBuffer::from(vec![65535u16]);
        assert_eq!(f.get(0), Some(1.5));
        assert_eq!(i.get(0), Some(-7.0));
        assert_eq!(u.get(0), Some(65535.0));
        assert_eq!(u.lane(), "uint16");
    }

    #[test]
    fn test_no_data() {
        let raster = Raster::new(2, 1, gt(), Some(-9999.0), vec![-9999.0f32, f32::NAN]).unwrap();
        assert_eq!(raster.valid_value(0, 0), None);
        assert_eq!(raster.valid_value(1, 0), None);
        assert!(raster.value(0, 0).is_some());

        let plain = Raster::new(1, 1, gt(), None, vec![-9999i32]).unwrap();
        assert_eq!(plain.valid_value(0, 0), Some(-9999.0));
    }

    #[test]
    fn test_float32_sentinel_matches_at_lane_precision() {
        let raster =
            Raster::new(3, 1, gt(), Some(-9999.9), vec![-9999.9f32, 10.0, 9.969_21e36]).unwrap();
        assert_eq!(raster.valid_value(0, 0), None);
        assert_eq!(raster.valid_value(1, 0), Some(10.0));
        assert_eq!(raster.value_range(), Some((10.0, 9.969_21e36f32 as f64)));

        let fill = Raster::new(2, 1, gt(), Some(9.969_21e36), vec![9.969_21e36f32, 1.5]).unwrap();
        assert_eq!(fill.valid_value(0, 0), None);
        assert_eq!(fill.value_range(), Some((1.5, 1.5)));
    }

    #[test]
    fn test_value_range_skips_no_data() {
        let raster = Raster::new(
            2,
            2,
            gt(),
            Some(0.0),
            vec![0u16, 12, 40, 7],
        )
        .unwrap();
        assert_eq!(raster.value_range(), Some((7.0, 40.0)));

        let empty = Raster::new(1, 1, gt(), Some(0.0), vec![0u16]).unwrap();
        assert_eq!(empty.value_range(), None);
    }
}

//! Common test fixtures for overlay tests.
//!
//! Pre-defined rasters, geotransforms and locations that represent
//! common scenarios.

use overlay_common::{Geotransform, Raster};

/// No-data sentinel used by the fixtures.
pub const NO_DATA: f64 = -9999.0;

/// The reference 3x3 raster around Berlin.
///
/// Origin (52.0, 13.0), pixel size (0.01, -0.01), no-data -9999:
///
/// ```text
/// 10  20  30
/// 40  50  60
/// 70  80  -9999
/// ```
pub fn berlin_3x3() -> Raster {
    Raster::new(
        3,
        3,
        berlin_geotransform(),
        Some(NO_DATA),
        vec![10.0f32, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, -9999.0],
    )
    .expect("fixture is well-formed")
}

/// Geotransform of [`berlin_3x3`].
pub fn berlin_geotransform() -> Geotransform {
    Geotransform::new(52.0, 13.0, 0.01, -0.01).expect("fixture is well-formed")
}

/// Common grid definitions for testing.
pub mod grid {
    use overlay_common::Geotransform;

    /// 0.1° grid covering Germany: 100 columns x 80 rows from (55.1, 5.8).
    pub const GERMANY: GridSpec = GridSpec {
        width: 100,
        height: 80,
        origin_lat: 55.1,
        origin_lng: 5.8,
        pixel_width: 0.1,
        pixel_height: -0.1,
    };

    /// A coarser 0.25° grid over the same area, offset from [`GERMANY`].
    pub const GERMANY_COARSE: GridSpec = GridSpec {
        width: 42,
        height: 34,
        origin_lat: 55.2,
        origin_lng: 5.7,
        pixel_width: 0.25,
        pixel_height: -0.25,
    };

    /// Simple 10x10 unit grid.
    pub const SIMPLE_10X10: GridSpec = GridSpec {
        width: 10,
        height: 10,
        origin_lat: 10.0,
        origin_lng: 0.0,
        pixel_width: 1.0,
        pixel_height: -1.0,
    };

    /// Grid dimensions plus geotransform parameters.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub width: u32,
        pub height: u32,
        pub origin_lat: f64,
        pub origin_lng: f64,
        pub pixel_width: f64,
        pub pixel_height: f64,
    }

    impl GridSpec {
        pub fn size(&self) -> usize {
            self.width as usize * self.height as usize
        }

        pub fn geotransform(&self) -> Geotransform {
            Geotransform::new(
                self.origin_lat,
                self.origin_lng,
                self.pixel_width,
                self.pixel_height,
            )
            .expect("fixture grid is well-formed")
        }
    }
}

/// City locations used across tests, as `(lat, lng)`.
pub mod cities {
    pub const BERLIN: (f64, f64) = (52.52, 13.405);
    pub const HAMBURG: (f64, f64) = (53.5511, 9.9937);
    pub const MUNICH: (f64, f64) = (48.1351, 11.582);
    pub const COLOGNE: (f64, f64) = (50.9375, 6.9603);
    pub const FRANKFURT: (f64, f64) = (50.1109, 8.6821);

    /// Well outside any German raster.
    pub const MADRID: (f64, f64) = (40.4168, -3.7038);
}

//! Time buckets identifying decoded rasters.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{OverlayError, OverlayResult};

/// A monthly time bucket, one decoded raster per key.
///
/// Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RasterKeyFields")]
pub struct RasterKey {
    year: i32,
    month: u32,
}

/// Unchecked wire form, validated through [`RasterKey::new`].
#[derive(Deserialize)]
struct RasterKeyFields {
    year: i32,
    month: u32,
}

impl TryFrom<RasterKeyFields> for RasterKey {
    type Error = OverlayError;

    fn try_from(fields: RasterKeyFields) -> Result<Self, Self::Error> {
        Self::new(fields.year, fields.month)
    }
}

impl RasterKey {
    /// Create a key; `month` is 1-based.
    pub fn new(year: i32, month: u32) -> OverlayResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(OverlayError::InvalidKey(format!(
                "month must be 1-12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// The bucket a calendar date falls into.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Same month in another year (e.g. the baseline year).
    pub fn with_year(&self, year: i32) -> Self {
        Self {
            year,
            month: self.month,
        }
    }

    /// First day of the bucket.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for RasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for RasterKey {
    type Err = OverlayError;

    /// Parse `YYYY-MM` (a single-digit month is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OverlayError::InvalidKey(format!("expected YYYY-MM, got '{}'", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

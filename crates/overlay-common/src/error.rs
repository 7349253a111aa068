//! Error types for the overlay engine.

use thiserror::Error;

use crate::time::RasterKey;

/// Result type alias using OverlayError.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Primary error type for raster decoding, construction and queries.
///
/// Absence of data at a location is not represented here: samplers return
/// `None` for that. The enum is `Clone` because a single failed decode is
/// handed to every caller that was waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    // === Decode Errors ===
    #[error("Failed to decode raster for {key}: {message}")]
    DecodeFailure { key: RasterKey, message: String },

    #[error("Failed to decode raster: {0}")]
    Decode(String),

    // === Construction Errors ===
    #[error("Degenerate geotransform: {0}")]
    DegenerateGeotransform(String),

    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    #[error("Invalid raster key: {0}")]
    InvalidKey(String),

    // === Caller Contract Errors ===
    #[error("Invalid stride {0}: stride must be >= 1")]
    InvalidStride(u32),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OverlayError {
    /// Create a DecodeFailure for a specific raster key.
    pub fn decode_failure(key: RasterKey, message: impl Into<String>) -> Self {
        Self::DecodeFailure {
            key,
            message: message.into(),
        }
    }

    /// Attach a raster key to an anonymous decode error.
    ///
    /// Other variants pass through unchanged.
    pub fn for_key(self, key: RasterKey) -> Self {
        match self {
            Self::Decode(message) => Self::DecodeFailure { key, message },
            other => other,
        }
    }

    /// Whether a later attempt with the same input may succeed.
    ///
    /// Only decode failures are considered transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DecodeFailure { .. } | Self::Decode(_))
    }
}

// Conversion from common decoder error types
impl From<std::io::Error> for OverlayError {
    fn from(err: std::io::Error) -> Self {
        OverlayError::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        OverlayError::Decode(format!("JSON error: {}", err))
    }
}

impl From<anyhow::Error> for OverlayError {
    fn from(err: anyhow::Error) -> Self {
        OverlayError::Decode(format!("{:#}", err))
    }
}

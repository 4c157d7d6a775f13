//! Error type used by the crate.

use thiserror::Error;

/// Invalid input to one of the coordinate conversion functions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    /// Zoom level is above the supported maximum.
    #[error("zoom level {0} too high")]
    InvalidZoom(u32),
    /// Latitude is outside of the range covered by the Web Mercator grid.
    #[error("latitude {0} invalid")]
    InvalidLatitude(f64),
    /// Longitude is outside of `[-180, 180]`.
    #[error("longitude {0} invalid")]
    InvalidLongitude(f64),
}

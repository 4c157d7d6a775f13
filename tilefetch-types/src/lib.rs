//! Geographic types used by `tilefetch`.
//!
//! This crate has no I/O. It contains a simple geographic point type ([`geo::GeoPoint2d`]) and the
//! math that maps such points onto the standard slippy-map tile grid ([`geo::slippy`]).

pub mod error;
pub mod geo;

pub use error::GeoError;

//! Points in geographic coordinates (latitude and longitude) and their position on the tile grid.

mod point;
pub mod slippy;

pub use point::{GeoPoint, GeoPoint2d, NewGeoPoint};
pub use slippy::{ground_resolution, max_tile_index, tile_coords, TilePoint};

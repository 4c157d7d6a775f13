//! Conversion of geographic coordinates into positions on the slippy-map tile grid.
//!
//! See <http://wiki.openstreetmap.org/wiki/Slippy_map_tilenames> for the description of the
//! tiling scheme.

use std::f64::consts::PI;
use std::ops::RangeInclusive;

use crate::error::GeoError;
use crate::geo::GeoPoint;

/// Maximum zoom level supported by the grid.
pub const MAX_ZOOM: u32 = 31;

/// Maximum absolute latitude covered by the Web Mercator grid, in degrees.
pub const MAX_LATITUDE: f64 = 85.0511;

/// Ground resolution of a zoom `0` tile at the equator, in meters per pixel.
pub const EQUATOR_RESOLUTION: f64 = 156543.034;

const LATITUDE_RANGE: RangeInclusive<f64> = -MAX_LATITUDE..=MAX_LATITUDE;
const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Fractional position on the tile grid of one zoom level.
///
/// The integer part of each coordinate is the index of the tile containing the point, the
/// fractional part is the position of the point inside that tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePoint {
    /// Position along the X axis (west to east).
    pub x: f64,
    /// Position along the Y axis (north to south).
    pub y: f64,
}

impl TilePoint {
    /// Indices of the tile containing the point.
    ///
    /// The value is signed and 64-bit wide because a point on the eastern edge of the grid
    /// (`lon == 180`) lies one column past the last tile, which is `2^31` at the maximum zoom.
    pub fn tile(&self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }

    /// Offset of the point from the top-left corner of its tile, in tile units (`[0, 1)`).
    pub fn offset(&self) -> (f64, f64) {
        (self.x - self.x.floor(), self.y - self.y.floor())
    }
}

/// Number of tiles along one side of the grid at the given zoom level.
fn grid_size(zoom: u32) -> f64 {
    (1u64 << zoom) as f64
}

/// Index of the last tile along each axis at the given zoom level (`2^zoom - 1`).
pub fn max_tile_index(zoom: u32) -> i64 {
    (1i64 << zoom.min(MAX_ZOOM)) - 1
}

fn validate_zoom(zoom: u32) -> Result<(), GeoError> {
    if zoom > MAX_ZOOM {
        Err(GeoError::InvalidZoom(zoom))
    } else {
        Ok(())
    }
}

fn validate_lat(lat: f64) -> Result<(), GeoError> {
    if LATITUDE_RANGE.contains(&lat) {
        Ok(())
    } else {
        Err(GeoError::InvalidLatitude(lat))
    }
}

fn validate_lon(lon: f64) -> Result<(), GeoError> {
    if LONGITUDE_RANGE.contains(&lon) {
        Ok(())
    } else {
        Err(GeoError::InvalidLongitude(lon))
    }
}

/// Projects the point onto the tile grid of the given zoom level (spherical Mercator).
///
/// Fails if `zoom > 31`, the latitude is outside of `[-85.0511, 85.0511]` or the longitude is
/// outside of `[-180, 180]`. Non-finite coordinates are rejected as well.
pub fn tile_coords(point: &impl GeoPoint, zoom: u32) -> Result<TilePoint, GeoError> {
    validate_zoom(zoom)?;
    validate_lat(point.lat())?;
    validate_lon(point.lon())?;

    let lat_rad = point.lat_rad();
    let n = grid_size(zoom);

    let x = n * ((point.lon() + 180.0) / 360.0);
    let y = n * (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;

    Ok(TilePoint { x, y })
}

/// Size of one pixel of a 256px tile on the ground at the given latitude, in meters.
pub fn ground_resolution(lat: f64, zoom: u32) -> Result<f64, GeoError> {
    validate_zoom(zoom)?;
    validate_lat(lat)?;

    Ok(EQUATOR_RESOLUTION * lat.to_radians().cos() / grid_size(zoom))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;
    use crate::latlon;

    #[test]
    fn origin_is_at_grid_center() {
        let point = tile_coords(&latlon!(0.0, 0.0), 1).unwrap();
        assert_eq!(point, TilePoint { x: 1.0, y: 1.0 });
        assert_eq!(point.tile(), (1, 1));
        assert_eq!(point.offset(), (0.0, 0.0));
    }

    #[test]
    fn known_tile() {
        // Brandenburg gate
        let point = tile_coords(&latlon!(52.5163, 13.3777), 15).unwrap();
        assert_eq!(point.tile(), (17601, 10746));

        let (dx, dy) = point.offset();
        assert!((0.0..1.0).contains(&dx));
        assert!((0.0..1.0).contains(&dy));
    }

    #[test]
    fn is_deterministic() {
        let a = tile_coords(&latlon!(-33.8568, 151.2153), 17).unwrap();
        let b = tile_coords(&latlon!(-33.8568, 151.2153), 17).unwrap();
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
    }

    #[test]
    fn accepts_boundary_values() {
        let top = tile_coords(&latlon!(MAX_LATITUDE, 0.0), 3).unwrap();
        assert_abs_diff_eq!(top.y, 0.0, epsilon = 1e-4);
        let bottom = tile_coords(&latlon!(-MAX_LATITUDE, 0.0), 3).unwrap();
        assert_abs_diff_eq!(bottom.y, 8.0, epsilon = 1e-4);

        let west = tile_coords(&latlon!(0.0, -180.0), 3).unwrap();
        assert_eq!(west.x, 0.0);
        let east = tile_coords(&latlon!(0.0, 180.0), 3).unwrap();
        assert_eq!(east.x, 8.0);

        let deepest = tile_coords(&latlon!(10.0, 10.0), MAX_ZOOM).unwrap();
        assert!(deepest.x > 0.0);
        assert!(ground_resolution(MAX_LATITUDE, MAX_ZOOM).is_ok());
        assert!(ground_resolution(-MAX_LATITUDE, 0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_input() {
        assert_matches!(
            tile_coords(&latlon!(0.0, 0.0), 32),
            Err(GeoError::InvalidZoom(32))
        );
        assert_matches!(
            tile_coords(&latlon!(86.0, 0.0), 1),
            Err(GeoError::InvalidLatitude(_))
        );
        assert_matches!(
            tile_coords(&latlon!(-86.0, 0.0), 1),
            Err(GeoError::InvalidLatitude(_))
        );
        assert_matches!(
            tile_coords(&latlon!(0.0, 181.0), 1),
            Err(GeoError::InvalidLongitude(_))
        );
        assert_matches!(
            tile_coords(&latlon!(0.0, -181.0), 1),
            Err(GeoError::InvalidLongitude(_))
        );
        assert_matches!(
            tile_coords(&latlon!(f64::NAN, 0.0), 1),
            Err(GeoError::InvalidLatitude(_))
        );

        assert_matches!(ground_resolution(0.0, 32), Err(GeoError::InvalidZoom(32)));
        assert_matches!(
            ground_resolution(86.0, 1),
            Err(GeoError::InvalidLatitude(_))
        );
        assert_matches!(
            ground_resolution(-86.0, 1),
            Err(GeoError::InvalidLatitude(_))
        );
    }

    #[test]
    fn resolution_halves_with_each_level() {
        assert_abs_diff_eq!(ground_resolution(0.0, 0).unwrap(), EQUATOR_RESOLUTION);
        assert_abs_diff_eq!(
            ground_resolution(60.0, 1).unwrap(),
            EQUATOR_RESOLUTION / 4.0,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            ground_resolution(45.0, 10).unwrap() * 2.0,
            ground_resolution(45.0, 9).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn max_index() {
        assert_eq!(max_tile_index(0), 0);
        assert_eq!(max_tile_index(3), 7);
        assert_eq!(max_tile_index(MAX_ZOOM), i32::MAX as i64);
    }
}

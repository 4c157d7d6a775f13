//! [`TileIndex`] and the rectangular block of tiles ([`TileRect`]) loaded around a center tile.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tilefetch_types::geo::max_tile_index;

/// Tile index.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileIndex {
    /// X index.
    pub x: u32,
    /// Y index.
    pub y: u32,
    /// Z index.
    pub z: u32,
}

impl TileIndex {
    /// Create a new index instance.
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for TileIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Inclusive rectangle of tile indices of one zoom level.
///
/// A rectangle built with [`TileRect::around`] never contains indices outside of the grid: rows
/// and columns that would fall outside are dropped, so the rectangle near the edge of the grid is
/// smaller than `(2 * blocks + 1)^2` and may even be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    min_x: i64,
    min_y: i64,
    max_x: i64,
    max_y: i64,
    z: u32,
}

impl TileRect {
    /// Block of tiles `blocks` tiles away from the center tile in every direction.
    pub fn around(center_x: i64, center_y: i64, blocks: u32, z: u32) -> Self {
        let blocks = i64::from(blocks);
        let max_index = max_tile_index(z);

        Self {
            min_x: center_x.saturating_sub(blocks).max(0),
            min_y: center_y.saturating_sub(blocks).max(0),
            max_x: center_x.saturating_add(blocks).min(max_index),
            max_y: center_y.saturating_add(blocks).min(max_index),
            z,
        }
    }

    /// Number of tiles in the rectangle.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.max_x - self.min_x + 1) * (self.max_y - self.min_y + 1)) as usize
        }
    }

    /// Returns true if the rectangle contains no tiles.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Returns true if the rectangle contains the given index.
    pub fn contains(&self, index: TileIndex) -> bool {
        let (x, y) = (i64::from(index.x), i64::from(index.y));
        index.z == self.z
            && (self.min_x..=self.max_x).contains(&x)
            && (self.min_y..=self.max_y).contains(&y)
    }

    /// Iterates over the tiles in row-major order: rows from north to south, and tiles inside a
    /// row from west to east.
    pub fn iter(&self) -> impl Iterator<Item = TileIndex> {
        let Self {
            min_x,
            min_y,
            max_x,
            max_y,
            z,
        } = *self;

        // Bounds are clamped to [0, 2^31 - 1], so the casts are lossless.
        (min_y..=max_y)
            .flat_map(move |y| (min_x..=max_x).map(move |x| TileIndex::new(x as u32, y as u32, z)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_block_in_the_middle_of_grid() {
        let rect = TileRect::around(4, 4, 1, 4);
        assert_eq!(rect.len(), 9);

        let tiles: Vec<_> = rect.iter().collect();
        assert_eq!(tiles.len(), 9);
        assert_eq!(tiles[0], TileIndex::new(3, 3, 4));
        assert_eq!(tiles[1], TileIndex::new(4, 3, 4));
        assert_eq!(tiles[3], TileIndex::new(3, 4, 4));
        assert_eq!(tiles[8], TileIndex::new(5, 5, 4));
    }

    #[test]
    fn clamps_at_grid_edges() {
        let rect = TileRect::around(0, 7, 2, 3);
        let tiles: Vec<_> = rect.iter().collect();

        assert_eq!(rect.len(), 9);
        assert_eq!(tiles.len(), 9);
        assert!(tiles.iter().all(|t| t.x <= 2 && (5..=7).contains(&t.y)));
        assert!(!rect.contains(TileIndex::new(0, 8, 3)));
        assert!(rect.contains(TileIndex::new(2, 5, 3)));
    }

    #[test]
    fn clamping_does_not_duplicate_tiles() {
        let rect = TileRect::around(0, 0, 5, 1);
        let mut tiles: Vec<_> = rect.iter().collect();
        let count = tiles.len();
        tiles.sort();
        tiles.dedup();

        assert_eq!(count, 4);
        assert_eq!(tiles.len(), 4);
    }

    #[test]
    fn center_outside_of_grid() {
        // Eastern edge of the map is one column past the last tile.
        let rect = TileRect::around(8, 3, 0, 3);
        assert!(rect.is_empty());
        assert_eq!(rect.len(), 0);
        assert_eq!(rect.iter().count(), 0);

        let rect = TileRect::around(8, 3, 1, 3);
        assert_eq!(rect.len(), 3);
        assert!(rect.iter().all(|t| t.x == 7));
    }

    #[test]
    fn max_zoom_does_not_overflow() {
        let max = max_tile_index(31);
        let rect = TileRect::around(max, max, u32::MAX, 31);
        assert!(!rect.is_empty());
        assert!(rect.contains(TileIndex::new(max as u32, max as u32, 31)));
        assert_eq!(rect.iter().next(), Some(TileIndex::new(0, 0, 31)));
    }
}

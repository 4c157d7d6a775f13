//! On-disk tile cache.
//!
//! Tiles of one tile source are stored as JPEG files in a folder named after a hash of the
//! source url template:
//!
//! ```text
//! <cache root>/<xxh3 of url template>/x<X>_y<Y>_z<Z>.jpg
//! ```

use std::path::{Path, PathBuf};

use log::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::decoded_image::DecodedImage;
use crate::error::TileFetchError;
use crate::tile_schema::TileIndex;
use crate::url_template::UrlTemplate;

/// Stores tiles of one tile source as a set of files in a dedicated folder.
///
/// Currently, there is no eviction mechanism.
#[derive(Debug, Clone)]
pub struct FileCacheController {
    folder_path: PathBuf,
}

impl FileCacheController {
    /// Creates a new instance for the given tile source. The cache folder is created (with all its
    /// parents) if it doesn't exist yet.
    pub fn new(cache_root: impl AsRef<Path>, source: &UrlTemplate) -> Result<Self, TileFetchError> {
        let folder_path = source_folder(cache_root.as_ref(), source);
        ensure_folder_exists(&folder_path).map_err(|source| TileFetchError::CacheFolder {
            path: folder_path.clone(),
            source,
        })?;

        debug!("Using tile cache folder {folder_path:?}");
        Ok(Self { folder_path })
    }

    /// Folder where the tiles are stored.
    pub fn folder_path(&self) -> &Path {
        &self.folder_path
    }

    /// Path of the file for the given tile.
    pub fn get_file_path(&self, index: TileIndex) -> PathBuf {
        self.folder_path.join(file_name(index))
    }

    /// Returns true if a file for the tile exists.
    pub fn contains(&self, index: TileIndex) -> bool {
        self.get_file_path(index).is_file()
    }

    /// Loads the tile from the cache. Returns `Ok(None)` if there is no file for it.
    pub fn get(&self, index: TileIndex) -> Result<Option<DecodedImage>, TileFetchError> {
        let file_path = self.get_file_path(index);
        if !file_path.is_file() {
            return Ok(None);
        }

        DecodedImage::open(&file_path).map(Some)
    }

    /// Writes the tile into the cache, replacing the existing file.
    pub fn insert(&self, index: TileIndex, image: &DecodedImage) -> Result<(), TileFetchError> {
        let file_path = self.get_file_path(index);
        debug!("Saving tile {index} to the cache file {file_path:?}");
        image.save_jpeg(&file_path)?;
        debug!("Tile {index} saved to cache file {file_path:?}");

        Ok(())
    }
}

/// Name of the cache folder for the given tile source.
///
/// The name is the decimal form of the 64-bit xxh3 hash of the template, which does not depend
/// on the process, platform or build.
pub fn source_folder_name(source: &UrlTemplate) -> String {
    xxh3_64(source.as_str().as_bytes()).to_string()
}

fn source_folder(cache_root: &Path, source: &UrlTemplate) -> PathBuf {
    // Collecting components drops repeated separators, `.` segments and the trailing separator.
    cache_root
        .join(source_folder_name(source))
        .components()
        .collect()
}

fn file_name(index: TileIndex) -> String {
    format!("x{}_y{}_z{}.jpg", index.x, index.y, index.z)
}

fn ensure_folder_exists(folder_path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(folder_path)
}

//! Plain configuration of a [`TileLoader`](crate::TileLoader).
//!
//! With the `serde` feature enabled the configuration can be read from any serde format, e.g.
//!
//! ```json
//! {
//!   "url_template": "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
//!   "cache_root": "/var/cache/tiles",
//!   "proxy": "localhost:3128",
//!   "latitude": 52.5163,
//!   "longitude": 13.3777,
//!   "zoom": 17,
//!   "blocks": 2
//! }
//! ```

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cache folder used if none is configured.
pub const DEFAULT_CACHE_ROOT: &str = "./tile_cache";

/// Where tiles come from and where they are stored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileSource {
    /// Url of the tile service with `{x}`, `{y}` and `{z}` placeholders.
    pub url_template: String,
    /// Root folder of the tile cache. Each tile source gets its own sub folder.
    #[cfg_attr(feature = "serde", serde(default = "default_cache_root"))]
    pub cache_root: PathBuf,
    /// HTTP proxy as `host:port`. Empty to use the system configuration.
    #[cfg_attr(feature = "serde", serde(default))]
    pub proxy: String,
    /// Only use cached tiles, never send requests.
    #[cfg_attr(feature = "serde", serde(default))]
    pub offline_mode: bool,
}

impl TileSource {
    /// Creates a source with default cache folder, no proxy and offline mode disabled.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            cache_root: default_cache_root(),
            proxy: String::new(),
            offline_mode: false,
        }
    }
}

fn default_cache_root() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_ROOT)
}

/// Full configuration of a loader: the tile source and the area to load.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileLoaderConfig {
    /// Tile source.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub source: TileSource,
    /// Latitude of the center point in degrees.
    pub latitude: f64,
    /// Longitude of the center point in degrees.
    pub longitude: f64,
    /// Zoom level, `0..=31`.
    pub zoom: u32,
    /// Number of tiles to load on each side of the center tile.
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocks: u32,
}

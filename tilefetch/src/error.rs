//! Error types used by the crate.

use std::path::PathBuf;

use image::ImageError;
use thiserror::Error;
use tilefetch_types::GeoError;

/// Tilefetch error type.
#[derive(Debug, Error)]
pub enum TileFetchError {
    /// Center point or zoom level cannot be mapped onto the tile grid.
    #[error(transparent)]
    InvalidArgument(#[from] GeoError),
    /// Cache folder for the tile source does not exist and cannot be created.
    #[error("failed to create cache folder {path:?}: {source}")]
    CacheFolder {
        /// Folder that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Url template with substituted tile indices is not a valid url.
    #[error("invalid tile url {url}: {reason}")]
    InvalidUrl {
        /// Resolved string that failed to parse.
        url: String,
        /// Parser error message.
        reason: String,
    },
    /// Loader is online but was built outside of a tokio runtime and without a runtime handle.
    #[error("online tile loader needs a tokio runtime: build it inside one or set a runtime handle")]
    NoRuntime,
    /// Network request failed.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Image decode or encode error.
    #[error("image error: {0}")]
    Image(#[from] ImageError),
    /// Error reading/writing data to the FS.
    #[error("file system error: {0}")]
    FsIo(#[from] std::io::Error),
    /// Generic error - details are inside.
    #[error("{0}")]
    Generic(String),
}

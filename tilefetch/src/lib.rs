//! Tilefetch loads square blocks of slippy-map tiles around a geographic point. Tiles are taken
//! from an on-disk cache when possible and downloaded from a tile service otherwise.
//!
//! # Quick start
//!
//! ```no_run
//! use tilefetch::{ChannelMessenger, LoaderEvent, TileLoader};
//!
//! # async fn run() {
//! let (messenger, mut events) = ChannelMessenger::new();
//! let loader = TileLoader::builder("https://tile.openstreetmap.org/{z}/{x}/{y}.png")
//!     .center(37.566, 126.9784)
//!     .zoom(16)
//!     .blocks(1)
//!     .messenger(messenger)
//!     .build()
//!     .unwrap();
//!
//! loader.start();
//! while let Some(event) = events.recv().await {
//!     if let LoaderEvent::BatchComplete = event {
//!         break;
//!     }
//! }
//! # }
//! ```
//!
//! This loads the 3x3 tiles around the center of Seoul and stores them in `./tile_cache`.
//!
//! # Main components
//!
//! * [`TileLoader`] owns one batch of tiles at a time. [`TileLoader::start`] replaces the batch,
//!   [`TileLoader::abort`] discards it.
//! * [`FileCacheController`](file_cache::FileCacheController) maps tile indices to files. Every
//!   tile source has its own folder under the cache root.
//! * [`PlatformService`](platform::PlatformService) sends the requests. The default implementation
//!   uses `reqwest` and never follows redirects on its own, so the loader can decide which
//!   redirects to follow.
//! * [`Messenger`] receives the [`LoaderEvent`]s of the current batch.
//!
//! Coordinate math lives in the [`tilefetch_types`] crate, re-exported here.

pub(crate) mod async_runtime;
pub mod config;
pub mod decoded_image;
pub mod error;
pub mod file_cache;
mod loader;
pub mod messenger;
pub mod platform;
pub mod proxy;
pub mod tile_schema;
pub mod url_template;

pub use loader::{TileLoader, TileLoaderBuilder, TileSnapshot, TileStatus};
pub use messenger::{ChannelMessenger, DummyMessenger, LoaderEvent, Messenger};
pub use tile_schema::{TileIndex, TileRect};

// Reexport tilefetch_types
pub use tilefetch_types;

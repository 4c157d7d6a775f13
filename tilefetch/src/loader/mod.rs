//! [`TileLoader`] loads the block of tiles around a geographic point, from the cache or from the
//! tile service.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;
use reqwest::{StatusCode, Url};
use tokio::runtime::Handle;
use tilefetch_types::geo::{tile_coords, GeoPoint, GeoPoint2d, NewGeoPoint};

use crate::async_runtime;
use crate::decoded_image::DecodedImage;
use crate::error::TileFetchError;
use crate::file_cache::FileCacheController;
use crate::messenger::{LoaderEvent, Messenger};
use crate::platform::{HttpResponse, PlatformService};
use crate::tile_schema::{TileIndex, TileRect};
use crate::url_template::UrlTemplate;

mod builder;
mod tile;

pub use builder::TileLoaderBuilder;
use tile::{MapTile, PendingRequest};
pub use tile::{TileSnapshot, TileStatus};

/// Loads the tiles within `blocks` tiles from the tile containing the center point.
///
/// Calling [`TileLoader::start`] computes the batch of tiles, takes every tile that is already in
/// the file cache from there and requests the rest from the tile service. Progress is reported
/// through the [`Messenger`]: once every tile of the batch has an image,
/// [`LoaderEvent::BatchComplete`] is sent exactly once.
///
/// A tile that failed to load stays without an image, so a batch with a failed tile (or, in
/// offline mode, with a tile missing from the cache) never completes. Calling `start` again is the
/// only way to retry.
///
/// Requests are spawned on the tokio runtime the loader was built with, so `start` can be called
/// from any thread.
pub struct TileLoader {
    inner: Arc<LoaderInner>,
    center: GeoPoint2d,
    zoom: u32,
    blocks: u32,
    center_tile: (i64, i64),
    origin_offset: (f64, f64),
    resolution: f64,
}

impl std::fmt::Debug for TileLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileLoader")
            .field("source", &self.inner.source)
            .field("center", &self.center)
            .field("zoom", &self.zoom)
            .field("blocks", &self.blocks)
            .field("offline_mode", &self.offline_mode())
            .finish()
    }
}

struct LoaderInner {
    source: UrlTemplate,
    cache: FileCacheController,
    platform_service: Arc<dyn PlatformService>,
    messenger: Arc<dyn Messenger>,
    /// Runtime requests are spawned on. `None` in offline mode.
    runtime: Option<Handle>,
    next_request_id: AtomicU64,
    batch: Mutex<Batch>,
}

/// Tiles of the current batch.
///
/// Every `start` and `abort` increments the generation. Requests remember the generation they were
/// sent for, and responses from other generations are dropped.
#[derive(Default)]
struct Batch {
    generation: u64,
    tiles: Vec<MapTile>,
    completed: bool,
}

impl Batch {
    fn reset(&mut self) -> u64 {
        for tile in &mut self.tiles {
            if let Some(request) = tile.request() {
                debug!("Aborting request to {}", request.url);
            }
            tile.abort_loading();
        }

        self.tiles.clear();
        self.completed = false;
        self.generation += 1;
        self.generation
    }

    fn tile_by_request(&mut self, request_id: u64) -> Option<&mut MapTile> {
        self.tiles
            .iter_mut()
            .find(|tile| tile.request_id() == Some(request_id))
    }
}

/// Result of a request, prepared outside of the batch lock.
enum FetchOutcome {
    Redirect(Url),
    Image(DecodedImage),
    DecodeFailed(TileFetchError),
    Status(StatusCode),
    Transport(TileFetchError),
}

impl FetchOutcome {
    fn new(
        url: &Url,
        redirected_from: Option<&Url>,
        response: Result<HttpResponse, TileFetchError>,
    ) -> Self {
        let response = match response {
            Ok(response) => response,
            Err(err) => return Self::Transport(err),
        };

        if let Some(target) = response.redirect {
            // Only guards against immediate loops, longer redirect cycles are followed.
            if &target != url && Some(&target) != redirected_from {
                return Self::Redirect(target);
            }
        }

        if !response.status.is_success() {
            return Self::Status(response.status);
        }

        match DecodedImage::decode(&response.body) {
            Ok(image) => Self::Image(image),
            Err(err) => Self::DecodeFailed(err),
        }
    }
}

impl TileLoader {
    /// Starts a builder for a loader requesting tiles from the given url template.
    pub fn builder(url_template: impl Into<String>) -> TileLoaderBuilder {
        TileLoaderBuilder::new(url_template)
    }

    /// Discards the current batch and starts loading a new one.
    ///
    /// Tiles found in the cache are loaded synchronously. If all of them are cached,
    /// [`LoaderEvent::BatchComplete`] is sent before this method returns.
    pub fn start(&self) {
        let mut batch = self.inner.batch.lock();
        let generation = batch.reset();

        let (center_x, center_y) = self.center_tile;
        let rect = self.tile_rect();
        debug!(
            "Loading {} blocks around tile ({center_x}, {center_y}), {} tiles",
            self.blocks,
            rect.len()
        );

        batch.tiles.reserve(rect.len());
        for index in rect.iter() {
            let tile = self.inner.prepare_tile(generation, index);
            batch.tiles.push(tile);
        }

        self.inner.check_if_loading_complete(&mut batch);
    }

    /// Cancels all pending requests and discards the current batch.
    pub fn abort(&self) {
        self.inner.batch.lock().reset();
    }

    /// Rectangle of tiles loaded by [`TileLoader::start`].
    pub fn tile_rect(&self) -> TileRect {
        let (center_x, center_y) = self.center_tile;
        TileRect::around(center_x, center_y, self.blocks, self.zoom)
    }

    /// Returns true if every tile of the current batch has an image.
    pub fn is_loading_complete(&self) -> bool {
        let batch = self.inner.batch.lock();
        batch.tiles.iter().all(MapTile::has_image)
    }

    /// Number of tiles of the current batch with a request in flight.
    pub fn pending_count(&self) -> usize {
        let batch = self.inner.batch.lock();
        batch
            .tiles
            .iter()
            .filter(|tile| tile.request().is_some())
            .count()
    }

    /// State of the tiles of the current batch, in row-major order.
    pub fn tiles(&self) -> Vec<TileSnapshot> {
        let batch = self.inner.batch.lock();
        batch.tiles.iter().map(MapTile::snapshot).collect()
    }

    /// Returns true if the point lies in the center tile.
    pub fn inside_centre_tile(&self, lat: f64, lon: f64) -> Result<bool, TileFetchError> {
        let point = tile_coords(&GeoPoint2d::latlon(lat, lon), self.zoom)?;
        Ok(point.tile() == self.center_tile)
    }

    /// Ground resolution at the center point, in meters per pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Indices of the tile containing the center point.
    ///
    /// The value is outside of the grid if the center is on the eastern edge of the map.
    pub fn center_tile(&self) -> (i64, i64) {
        self.center_tile
    }

    /// Position of the center point inside the center tile, in tile units.
    pub fn origin_offset(&self) -> (f64, f64) {
        self.origin_offset
    }

    /// Latitude of the center point.
    pub fn latitude(&self) -> f64 {
        self.center.lat()
    }

    /// Longitude of the center point.
    pub fn longitude(&self) -> f64 {
        self.center.lon()
    }

    /// Zoom level.
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Number of tiles loaded on each side of the center tile.
    pub fn blocks(&self) -> u32 {
        self.blocks
    }

    /// Returns true if the loader never sends requests.
    pub fn offline_mode(&self) -> bool {
        self.inner.runtime.is_none()
    }

    /// Url template of the tile source.
    pub fn source(&self) -> &UrlTemplate {
        &self.inner.source
    }

    /// Cache folder of the tile source.
    pub fn cache_dir(&self) -> &Path {
        self.inner.cache.folder_path()
    }

    /// Path of the cache file for the given tile.
    pub fn cache_path_for_tile(&self, x: u32, y: u32, z: u32) -> PathBuf {
        self.inner.cache.get_file_path(TileIndex::new(x, y, z))
    }

    /// Url of the tile at the loader zoom level.
    pub fn url_for_tile(&self, x: u32, y: u32) -> Result<Url, TileFetchError> {
        self.inner.source.resolve(TileIndex::new(x, y, self.zoom))
    }
}

impl Drop for TileLoader {
    fn drop(&mut self) {
        self.abort();
    }
}

impl LoaderInner {
    fn prepare_tile(self: &Arc<Self>, generation: u64, index: TileIndex) -> MapTile {
        match self.cache.get(index) {
            Ok(Some(image)) => return MapTile::cached(index, Arc::new(image)),
            Ok(None) => {}
            Err(err) => {
                let path = self.cache.get_file_path(index);
                warn!("Failed to read cached tile {path:?}: {err}");
                self.messenger.send(LoaderEvent::Warning(format!(
                    "Ignoring unreadable cache file {}: {err}",
                    path.display()
                )));
            }
        }

        let Some(runtime) = &self.runtime else {
            return MapTile::missing(index);
        };

        match self.source.resolve(index) {
            Ok(url) => MapTile::fetching(
                index,
                self.send_request(runtime, generation, index, url, None),
            ),
            Err(err) => {
                self.messenger
                    .send(LoaderEvent::Error(format!("Failed loading tile {index}: {err}")));
                MapTile::failed(index)
            }
        }
    }

    fn send_request(
        self: &Arc<Self>,
        runtime: &Handle,
        generation: u64,
        index: TileIndex,
        url: Url,
        redirected_from: Option<Url>,
    ) -> PendingRequest {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        debug!("Requesting tile {index} from {url}");
        self.messenger.send(LoaderEvent::FetchInitiated {
            index,
            url: url.clone(),
        });

        let inner = self.clone();
        let request_url = url.clone();
        let task_runtime = runtime.clone();
        let task = async_runtime::spawn(runtime, async move {
            let response = inner.platform_service.fetch(&request_url).await;
            let outcome = FetchOutcome::new(&request_url, redirected_from.as_ref(), response);
            if let FetchOutcome::Image(image) = &outcome {
                inner.persist(generation, index, image);
            }

            inner.complete_request(&task_runtime, generation, id, request_url, outcome);
        });

        PendingRequest { id, url, task }
    }

    fn persist(&self, generation: u64, index: TileIndex, image: &DecodedImage) {
        if self.batch.lock().generation != generation {
            return;
        }

        if let Err(err) = self.cache.insert(index, image) {
            let path = self.cache.get_file_path(index);
            warn!("Failed to write cache file {path:?}: {err}");
            self.messenger.send(LoaderEvent::Warning(format!(
                "Failed to write cache file {}: {err}",
                path.display()
            )));
        }
    }

    fn complete_request(
        self: &Arc<Self>,
        runtime: &Handle,
        generation: u64,
        request_id: u64,
        url: Url,
        outcome: FetchOutcome,
    ) {
        let mut batch = self.batch.lock();
        if batch.generation != generation {
            debug!("Ignoring response from {url} for an aborted batch");
            return;
        }

        let Some(tile) = batch.tile_by_request(request_id) else {
            debug!("Ignoring response from {url}, the tile is no longer waiting for it");
            return;
        };
        let index = tile.index();

        match outcome {
            FetchOutcome::Redirect(target) => {
                self.messenger.send(LoaderEvent::Warning(format!(
                    "Redirected from {url} to {target}"
                )));
                let request = self.send_request(runtime, generation, index, target, Some(url));
                tile.redirect(request);
            }
            FetchOutcome::Image(image) => {
                let image = Arc::new(image);
                tile.set_image(image.clone());
                self.messenger
                    .send(LoaderEvent::ImageReceived { index, url, image });
            }
            FetchOutcome::DecodeFailed(err) => {
                tile.fail();
                self.messenger.send(LoaderEvent::Error(format!(
                    "Unable to decode image at {url}: {err}"
                )));
            }
            FetchOutcome::Status(status) => {
                tile.fail();
                self.messenger.send(LoaderEvent::Error(format!(
                    "Failed loading {url} with code {}",
                    status.as_u16()
                )));
            }
            FetchOutcome::Transport(err) => {
                tile.fail();
                self.messenger
                    .send(LoaderEvent::Error(format!("Failed loading {url}: {err}")));
            }
        }

        self.check_if_loading_complete(&mut batch);
    }

    fn check_if_loading_complete(&self, batch: &mut Batch) -> bool {
        let loaded = batch.tiles.iter().all(MapTile::has_image);
        if loaded && !batch.completed {
            batch.completed = true;
            debug!("All {} tiles of the batch are loaded", batch.tiles.len());
            self.messenger.send(LoaderEvent::BatchComplete);
        }

        loaded
    }
}

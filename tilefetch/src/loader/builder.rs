use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use parking_lot::Mutex;
use tilefetch_types::geo::{ground_resolution, tile_coords, GeoPoint2d, NewGeoPoint};
use tokio::runtime::Handle;

use super::{Batch, LoaderInner, TileLoader};
use crate::async_runtime;
use crate::config::{TileLoaderConfig, TileSource, DEFAULT_CACHE_ROOT};
use crate::error::TileFetchError;
use crate::file_cache::FileCacheController;
use crate::messenger::{DummyMessenger, Messenger};
use crate::platform::{NativePlatformService, PlatformService};
use crate::proxy::ProxySettings;
use crate::url_template::UrlTemplate;

/// Constructor for a [`TileLoader`].
///
/// ```no_run
/// use tilefetch::{ChannelMessenger, TileLoader};
///
/// let runtime = tokio::runtime::Runtime::new()?;
/// let (messenger, events) = ChannelMessenger::new();
/// let loader = TileLoader::builder("https://tile.openstreetmap.org/{z}/{x}/{y}.png")
///     .center(52.5163, 13.3777)
///     .zoom(17)
///     .blocks(2)
///     .cache_root("target/tile_cache")
///     .messenger(messenger)
///     .runtime(runtime.handle().clone())
///     .build()?;
///
/// // Requests run on `runtime`, so this thread does not need one.
/// loader.start();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct TileLoaderBuilder {
    url_template: String,
    latitude: f64,
    longitude: f64,
    zoom: u32,
    blocks: u32,
    proxy: String,
    cache_root: PathBuf,
    offline_mode: bool,
    messenger: Option<Arc<dyn Messenger>>,
    platform_service: Option<Arc<dyn PlatformService>>,
    runtime: Option<Handle>,
}

impl TileLoaderBuilder {
    /// Initializes a builder for a loader that requests tiles from the given url template.
    ///
    /// The center defaults to `(0, 0)`, zoom and blocks to `0`.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            latitude: 0.0,
            longitude: 0.0,
            zoom: 0,
            blocks: 0,
            proxy: String::new(),
            cache_root: PathBuf::from(DEFAULT_CACHE_ROOT),
            offline_mode: false,
            messenger: None,
            platform_service: None,
            runtime: None,
        }
    }

    /// Initializes a builder with all values taken from the config.
    pub fn from_config(config: TileLoaderConfig) -> Self {
        let TileLoaderConfig {
            source:
                TileSource {
                    url_template,
                    cache_root,
                    proxy,
                    offline_mode,
                },
            latitude,
            longitude,
            zoom,
            blocks,
        } = config;

        Self::new(url_template)
            .center(latitude, longitude)
            .zoom(zoom)
            .blocks(blocks)
            .proxy(proxy)
            .cache_root(cache_root)
            .offline_mode(offline_mode)
    }

    /// Sets the center point (degrees).
    pub fn center(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Sets the zoom level.
    pub fn zoom(mut self, zoom: u32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Sets the number of tiles to load on each side of the center tile.
    pub fn blocks(mut self, blocks: u32) -> Self {
        self.blocks = blocks;
        self
    }

    /// Sets the HTTP proxy as a `host:port` string.
    ///
    /// A string that cannot be parsed disables the proxy, see [`ProxySettings::parse`].
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = proxy.into();
        self
    }

    /// Sets the root folder of the tile cache.
    ///
    /// The tiles are stored in a sub folder named after the hash of the url template, so different
    /// sources can share the same root.
    pub fn cache_root(mut self, path: impl AsRef<Path>) -> Self {
        self.cache_root = path.as_ref().into();
        self
    }

    /// If offline mode is enabled, the loader only uses its cache and never sends requests.
    pub fn offline_mode(mut self, enabled: bool) -> Self {
        self.offline_mode = enabled;
        self
    }

    /// Sets the receiver of loader events.
    pub fn messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.messenger = Some(Arc::new(messenger));
        self
    }

    /// Replaces the default `reqwest` based transport. The proxy setting is ignored in this case.
    pub fn platform_service(mut self, service: impl PlatformService + 'static) -> Self {
        self.platform_service = Some(Arc::new(service));
        self
    }

    /// Sets the tokio runtime tile requests are spawned on.
    ///
    /// Without it, the runtime `build` is called from is used. Offline loaders need no runtime.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Validates the parameters and creates the loader.
    ///
    /// Fails if the center point or zoom level are out of range, if the cache folder cannot be
    /// created, or if the loader is online and there is no runtime to run the requests on.
    pub fn build(self) -> Result<TileLoader, TileFetchError> {
        let center = GeoPoint2d::latlon(self.latitude, self.longitude);
        let tile_point = tile_coords(&center, self.zoom)?;
        let resolution = ground_resolution(self.latitude, self.zoom)?;

        let source = UrlTemplate::new(self.url_template);
        let cache = FileCacheController::new(&self.cache_root, &source)?;

        let runtime = if self.offline_mode {
            None
        } else {
            let runtime = self.runtime.or_else(async_runtime::current);
            Some(runtime.ok_or(TileFetchError::NoRuntime)?)
        };

        let platform_service = match self.platform_service {
            Some(service) => service,
            None => {
                let proxy = ProxySettings::parse(&self.proxy);
                Arc::new(NativePlatformService::new(proxy.as_ref())?)
            }
        };

        let messenger = self
            .messenger
            .unwrap_or_else(|| Arc::new(DummyMessenger));

        let center_tile = tile_point.tile();
        log::debug!("Center tile coords: {}, {}", tile_point.x, tile_point.y);

        Ok(TileLoader {
            inner: Arc::new(LoaderInner {
                source,
                cache,
                platform_service,
                messenger,
                runtime,
                next_request_id: AtomicU64::new(0),
                batch: Mutex::new(Batch::default()),
            }),
            center,
            zoom: self.zoom,
            blocks: self.blocks,
            center_tile,
            origin_offset: tile_point.offset(),
            resolution,
        })
    }
}

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use reqwest::Url;
use tilefetch::error::TileFetchError;
use tilefetch::file_cache::source_folder_name;
use tilefetch::platform::{HttpResponse, PlatformService};
use tilefetch::url_template::UrlTemplate;
use tilefetch::{ChannelMessenger, LoaderEvent, TileLoader, TileStatus};
use tokio::sync::mpsc::UnboundedReceiver;

const SOURCE: &str = "http://tiles.test/{z}/{x}/{y}.png";

/// Serves the same PNG for every url and counts the requests.
#[derive(Clone, Default)]
struct CountingService {
    requests: Arc<AtomicUsize>,
}

#[async_trait]
impl PlatformService for CountingService {
    async fn fetch(&self, url: &Url) -> Result<HttpResponse, TileFetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let image = RgbImage::from_pixel(256, 256, Rgb([10, 120, 40]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image).write_to(&mut bytes, ImageOutputFormat::Png)?;
        Ok(HttpResponse::ok(url.clone(), bytes.into_inner()))
    }
}

async fn wait_for_completion(events: &mut UnboundedReceiver<LoaderEvent>) -> Vec<LoaderEvent> {
    let mut received = vec![];
    tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(event) = events.recv().await {
            let done = matches!(event, LoaderEvent::BatchComplete);
            received.push(event);
            if done {
                break;
            }
        }
    })
    .await
    .expect("batch did not complete");

    received
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_loader_reads_tiles_from_cache() {
    let _ = env_logger::builder().is_test(true).try_init();
    let cache_root = tempfile::tempdir().unwrap();
    let service = CountingService::default();

    let (messenger, mut events) = ChannelMessenger::new();
    let loader = TileLoader::builder(SOURCE)
        .center(48.8584, 2.2945)
        .zoom(14)
        .blocks(2)
        .cache_root(cache_root.path())
        .messenger(messenger)
        .platform_service(service.clone())
        .build()
        .unwrap();

    loader.start();
    let received = wait_for_completion(&mut events).await;
    let images = received
        .iter()
        .filter(|event| matches!(event, LoaderEvent::ImageReceived { .. }))
        .count();
    assert_eq!(images, 25);
    assert_eq!(service.requests.load(Ordering::SeqCst), 25);

    let expected_dir = cache_root
        .path()
        .join(source_folder_name(&UrlTemplate::new(SOURCE)));
    assert_eq!(loader.cache_dir(), expected_dir.as_path());
    assert_eq!(std::fs::read_dir(&expected_dir).unwrap().count(), 25);
    drop(loader);

    // Same source and area, now completely served from the cache.
    let (messenger, mut events) = ChannelMessenger::new();
    let loader = TileLoader::builder(SOURCE)
        .center(48.8584, 2.2945)
        .zoom(14)
        .blocks(2)
        .cache_root(cache_root.path())
        .messenger(messenger)
        .platform_service(service.clone())
        .build()
        .unwrap();

    loader.start();
    assert!(loader.is_loading_complete());
    assert!(matches!(events.try_recv(), Ok(LoaderEvent::BatchComplete)));
    assert_eq!(service.requests.load(Ordering::SeqCst), 25);

    for tile in loader.tiles() {
        assert_eq!(tile.status, TileStatus::CacheHit);
        let image = tile.image.unwrap();
        assert_eq!((image.width(), image.height()), (256, 256));
    }
}

#[tokio::test]
async fn sources_do_not_share_cache_folders() {
    let cache_root = tempfile::tempdir().unwrap();

    let osm = TileLoader::builder("http://a.tiles.test/{z}/{x}/{y}.png")
        .cache_root(cache_root.path())
        .platform_service(CountingService::default())
        .build()
        .unwrap();
    let satellite = TileLoader::builder("http://b.tiles.test/{z}/{x}/{y}.jpg")
        .cache_root(cache_root.path())
        .platform_service(CountingService::default())
        .build()
        .unwrap();

    assert_ne!(osm.cache_dir(), satellite.cache_dir());
    assert_eq!(osm.cache_dir().parent(), Some(cache_root.path()));
    assert_eq!(satellite.cache_dir().parent(), Some(cache_root.path()));
}

//! Loads the tiles described by a JSON config file and reports progress.
//!
//! ```text
//! cargo run --example fetch_area -- tilefetch/examples/data/berlin.json
//! ```

use std::time::Duration;

use anyhow::Context;
use tilefetch::config::TileLoaderConfig;
use tilefetch::{ChannelMessenger, LoaderEvent, TileLoaderBuilder, TileStatus};

const DEFAULT_CONFIG: &str = "tilefetch/examples/data/berlin.json";
const TIMEOUT: Duration = Duration::from_secs(60);

fn read_config(path: &str) -> anyhow::Result<TileLoaderConfig> {
    let file = std::fs::File::open(path).with_context(|| format!("failed to open {path}"))?;
    serde_json::from_reader(file).with_context(|| format!("failed to parse {path}"))
}

fn print_event(event: LoaderEvent) {
    match event {
        LoaderEvent::FetchInitiated { index, url } => println!("{index}: GET {url}"),
        LoaderEvent::ImageReceived { index, image, .. } => {
            println!("{index}: {}x{}", image.width(), image.height())
        }
        LoaderEvent::Warning(text) => println!("warning: {text}"),
        LoaderEvent::Error(text) => println!("error: {text}"),
        LoaderEvent::BatchComplete => println!("batch complete"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = read_config(&path)?;

    let (messenger, mut events) = ChannelMessenger::new();
    let loader = TileLoaderBuilder::from_config(config)
        .messenger(messenger)
        .build()?;

    println!(
        "Center tile {:?} at zoom {}, {:.3} m/px, cache in {}",
        loader.center_tile(),
        loader.zoom(),
        loader.resolution(),
        loader.cache_dir().display()
    );

    loader.start();

    let wait = async {
        loop {
            // Failed and missing tiles never complete the batch.
            if loader.pending_count() == 0 && !loader.is_loading_complete() {
                while let Ok(event) = events.try_recv() {
                    print_event(event);
                }
                return false;
            }

            match events.recv().await {
                Some(LoaderEvent::BatchComplete) => return true,
                Some(event) => print_event(event),
                None => return false,
            }
        }
    };

    let complete = tokio::time::timeout(TIMEOUT, wait).await.unwrap_or(false);

    let tiles = loader.tiles();
    let loaded = tiles.iter().filter(|tile| tile.image.is_some()).count();
    let cached = tiles
        .iter()
        .filter(|tile| tile.status == TileStatus::CacheHit)
        .count();
    println!(
        "{loaded} of {} tiles loaded ({cached} from cache), complete: {complete}",
        tiles.len()
    );

    Ok(())
}

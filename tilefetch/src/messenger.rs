//! Notifications sent by the [`TileLoader`](crate::TileLoader) to its owner.

use std::sync::Arc;

use reqwest::Url;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::decoded_image::DecodedImage;
use crate::tile_schema::TileIndex;

/// Event emitted while a batch of tiles is loading.
#[derive(Debug, Clone)]
pub enum LoaderEvent {
    /// A request for a tile was sent.
    FetchInitiated {
        /// Tile being requested.
        index: TileIndex,
        /// Url of the request.
        url: Url,
    },
    /// A tile image was downloaded and decoded.
    ImageReceived {
        /// Loaded tile.
        index: TileIndex,
        /// Url the image was received from.
        url: Url,
        /// Decoded image.
        image: Arc<DecodedImage>,
    },
    /// Something worth reporting that does not prevent the tile from loading.
    Warning(String),
    /// A tile failed to load.
    Error(String),
    /// Every tile of the current batch has an image. Sent at most once per batch.
    BatchComplete,
}

/// Receiver of loader events.
///
/// Events are delivered while the loader holds the lock over its batch state, so implementations
/// must return quickly and must not call back into the loader.
pub trait Messenger: Send + Sync {
    /// Delivers an event.
    fn send(&self, event: LoaderEvent);
}

impl<T: Fn(LoaderEvent) + Send + Sync> Messenger for T {
    fn send(&self, event: LoaderEvent) {
        self(event)
    }
}

/// Messenger that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyMessenger;

impl Messenger for DummyMessenger {
    fn send(&self, _event: LoaderEvent) {}
}

/// Messenger forwarding events into a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelMessenger {
    sender: UnboundedSender<LoaderEvent>,
}

impl ChannelMessenger {
    /// Creates a messenger and the receiving end of its channel.
    pub fn new() -> (Self, UnboundedReceiver<LoaderEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Messenger for ChannelMessenger {
    fn send(&self, event: LoaderEvent) {
        if self.sender.send(event).is_err() {
            log::trace!("Loader event receiver is closed");
        }
    }
}

use std::sync::Arc;

use reqwest::Url;
use tokio::task::JoinHandle;

use crate::decoded_image::DecodedImage;
use crate::tile_schema::TileIndex;

/// Loading state of a single tile of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    /// Not in the cache and not requested (offline mode).
    Missing,
    /// Loaded from the cache.
    CacheHit,
    /// Request is in flight.
    Fetching,
    /// Server redirected the request, request to the new url is in flight.
    Redirected,
    /// Downloaded and decoded.
    Fetched,
    /// Request or decoding failed. The tile stays without an image until the next batch.
    Failed,
}

/// Request in flight for a tile.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    pub(crate) id: u64,
    pub(crate) url: Url,
    pub(crate) task: JoinHandle<()>,
}

#[derive(Debug)]
enum TileData {
    Empty,
    Pending(PendingRequest),
    Image(Arc<DecodedImage>),
}

/// Record of one tile of the current batch.
///
/// A record holds either nothing, a pending request or an image, never a request and an image at
/// the same time.
#[derive(Debug)]
pub(crate) struct MapTile {
    index: TileIndex,
    status: TileStatus,
    data: TileData,
}

impl MapTile {
    pub(crate) fn cached(index: TileIndex, image: Arc<DecodedImage>) -> Self {
        Self {
            index,
            status: TileStatus::CacheHit,
            data: TileData::Image(image),
        }
    }

    pub(crate) fn missing(index: TileIndex) -> Self {
        Self {
            index,
            status: TileStatus::Missing,
            data: TileData::Empty,
        }
    }

    pub(crate) fn failed(index: TileIndex) -> Self {
        Self {
            index,
            status: TileStatus::Failed,
            data: TileData::Empty,
        }
    }

    pub(crate) fn fetching(index: TileIndex, request: PendingRequest) -> Self {
        Self {
            index,
            status: TileStatus::Fetching,
            data: TileData::Pending(request),
        }
    }

    pub(crate) fn index(&self) -> TileIndex {
        self.index
    }

    pub(crate) fn status(&self) -> TileStatus {
        self.status
    }

    pub(crate) fn has_image(&self) -> bool {
        matches!(self.data, TileData::Image(_))
    }

    pub(crate) fn image(&self) -> Option<&Arc<DecodedImage>> {
        match &self.data {
            TileData::Image(image) => Some(image),
            _ => None,
        }
    }

    pub(crate) fn request(&self) -> Option<&PendingRequest> {
        match &self.data {
            TileData::Pending(request) => Some(request),
            _ => None,
        }
    }

    pub(crate) fn request_id(&self) -> Option<u64> {
        self.request().map(|request| request.id)
    }

    /// Replaces the pending request with the request to the redirect target.
    ///
    /// The replaced request is the one currently completing, so its task is not aborted.
    pub(crate) fn redirect(&mut self, request: PendingRequest) {
        self.status = TileStatus::Redirected;
        self.data = TileData::Pending(request);
    }

    pub(crate) fn set_image(&mut self, image: Arc<DecodedImage>) {
        self.status = TileStatus::Fetched;
        self.data = TileData::Image(image);
    }

    pub(crate) fn fail(&mut self) {
        self.status = TileStatus::Failed;
        self.data = TileData::Empty;
    }

    /// Cancels the pending request, if any.
    pub(crate) fn abort_loading(&mut self) {
        if let TileData::Pending(request) = std::mem::replace(&mut self.data, TileData::Empty) {
            request.task.abort();
        }
    }

    pub(crate) fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            index: self.index,
            status: self.status,
            image: self.image().cloned(),
        }
    }
}

/// State of a tile of the current batch as seen by the loader's owner.
#[derive(Debug, Clone)]
pub struct TileSnapshot {
    /// Index of the tile.
    pub index: TileIndex,
    /// Loading status.
    pub status: TileStatus,
    /// Tile image, if loaded.
    pub image: Option<Arc<DecodedImage>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Arc<DecodedImage> {
        Arc::new(DecodedImage::from_raw(vec![0; 4], 1, 1).unwrap())
    }

    fn request(id: u64) -> PendingRequest {
        PendingRequest {
            id,
            url: Url::parse("http://tiles.test/0/0/0.png").unwrap(),
            task: tokio::spawn(std::future::pending()),
        }
    }

    #[tokio::test]
    async fn image_replaces_request() {
        let mut tile = MapTile::fetching(TileIndex::new(1, 2, 3), request(7));
        assert_eq!(tile.request_id(), Some(7));
        assert!(!tile.has_image());

        tile.set_image(image());
        assert_eq!(tile.request_id(), None);
        assert!(tile.has_image());
        assert_eq!(tile.status(), TileStatus::Fetched);
    }

    #[tokio::test]
    async fn redirect_keeps_tile_pending() {
        let mut tile = MapTile::fetching(TileIndex::new(1, 2, 3), request(1));
        tile.redirect(request(2));
        assert_eq!(tile.request_id(), Some(2));
        assert_eq!(tile.status(), TileStatus::Redirected);
    }

    #[tokio::test]
    async fn abort_cancels_task() {
        let marker = Arc::new(());
        let task_marker = marker.clone();
        let task = tokio::spawn(async move {
            let _marker = task_marker;
            std::future::pending::<()>().await
        });
        let mut tile = MapTile::fetching(
            TileIndex::new(1, 2, 3),
            PendingRequest {
                id: 1,
                url: Url::parse("http://tiles.test/3/1/2.png").unwrap(),
                task,
            },
        );

        tile.abort_loading();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert!(tile.request().is_none());
        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    fn failed_tile_has_no_image() {
        let mut tile = MapTile::cached(TileIndex::new(0, 0, 0), image());
        assert!(tile.has_image());
        tile.fail();
        assert!(!tile.has_image());
        assert_eq!(tile.snapshot().status, TileStatus::Failed);
        assert!(tile.snapshot().image.is_none());
    }
}

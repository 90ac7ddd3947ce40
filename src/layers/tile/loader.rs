use crate::{
    core::geo::TileCoord,
    feed::client::FeedTransport,
    runtime, Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// RGBA pixels of a downloaded tile, ready for texture upload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTile {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

impl DecodedTile {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let size = [image.width() as usize, image.height() as usize];
        Ok(Self {
            size,
            rgba: image.into_raw(),
        })
    }
}

/// Result of a tile loading operation
#[derive(Debug)]
pub struct TileResult {
    pub coord: TileCoord,
    pub url: String,
    pub data: Result<DecodedTile>,
}

#[derive(Debug, Clone)]
pub struct TileLoaderConfig {
    /// Maximum concurrent tile downloads
    pub max_concurrent: usize,
}

impl Default for TileLoaderConfig {
    fn default() -> Self {
        Self { max_concurrent: 8 }
    }
}

/// Downloads and decodes tiles in the background. Results are collected
/// with [`TileLoader::try_recv_results`] from the UI thread.
pub struct TileLoader {
    transport: Arc<dyn FeedTransport>,
    permits: Arc<Semaphore>,
    result_tx: Sender<TileResult>,
    result_rx: Receiver<TileResult>,
}

impl TileLoader {
    pub fn new(transport: Arc<dyn FeedTransport>, config: TileLoaderConfig) -> Self {
        let (result_tx, result_rx) = unbounded();
        let permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            transport,
            permits,
            result_tx,
            result_rx,
        }
    }

    /// Queue one tile. Decoding happens on the worker, not the caller.
    pub fn queue_tile(&self, coord: TileCoord, url: String) {
        let transport = Arc::clone(&self.transport);
        let permits = Arc::clone(&self.permits);
        let result_tx = self.result_tx.clone();

        runtime::spawn(async move {
            let data = match permits.acquire_owned().await {
                Ok(_permit) => match transport.get_bytes(&url).await {
                    Ok(bytes) => DecodedTile::decode(&bytes),
                    Err(e) => Err(e),
                },
                Err(e) => Err(crate::MapError::Runtime(e.to_string())),
            };
            let _ = result_tx.send(TileResult { coord, url, data });
        });
    }

    /// Drain every result that has arrived since the last call
    pub fn try_recv_results(&self) -> Vec<TileResult> {
        self.result_rx.try_iter().collect()
    }
}

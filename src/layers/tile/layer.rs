use super::{
    loader::{DecodedTile, TileLoader, TileLoaderConfig},
    source::TileSource,
};
use crate::{
    core::{geo::TileCoord, viewport::Viewport},
    feed::client::FeedTransport,
    layers::base::{LayerProperties, LayerTrait, LayerType},
    prelude::HashSet,
    rendering::context::RenderContext,
    Result,
};
use lru::LruCache;
use std::{num::NonZeroUsize, sync::Arc};

/// One base map style drawn from raster tiles
pub struct TileLayer {
    properties: LayerProperties,
    source: Box<dyn TileSource>,
    loader: TileLoader,
    textures: LruCache<TileCoord, egui::TextureHandle>,
    /// Decoded but not yet uploaded
    decoded: Vec<(TileCoord, DecodedTile)>,
    pending: HashSet<TileCoord>,
    /// Tiles whose single download failed; they stay placeholders
    failed: HashSet<TileCoord>,
}

impl TileLayer {
    pub fn new(
        id: String,
        name: String,
        source: Box<dyn TileSource>,
        transport: Arc<dyn FeedTransport>,
        cache_capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            properties: LayerProperties::new(id, name, LayerType::Tile),
            source,
            loader: TileLoader::new(transport, TileLoaderConfig::default()),
            textures: LruCache::new(capacity),
            decoded: Vec::new(),
            pending: HashSet::default(),
            failed: HashSet::default(),
        }
    }

    pub fn source(&self) -> &dyn TileSource {
        self.source.as_ref()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn cached_count(&self) -> usize {
        self.textures.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Moves finished downloads out of the loader. Failures are logged and
    /// never requested again.
    pub fn poll_loader(&mut self) -> usize {
        let mut arrived = 0;
        for result in self.loader.try_recv_results() {
            self.pending.remove(&result.coord);
            match result.data {
                Ok(tile) => {
                    self.decoded.push((result.coord, tile));
                    arrived += 1;
                }
                Err(e) => {
                    log::warn!("tile {} failed: {}", result.url, e);
                    self.failed.insert(result.coord);
                }
            }
        }
        arrived
    }

    /// Uploads arrived tiles as textures. Must run on the UI thread before
    /// [`LayerTrait::render`] for them to show this frame.
    pub fn process_downloads(&mut self, ctx: &egui::Context) -> usize {
        self.poll_loader();
        let uploaded = self.decoded.len();
        for (coord, tile) in self.decoded.drain(..) {
            let image = egui::ColorImage::from_rgba_unmultiplied(tile.size, &tile.rgba);
            let name = format!("{}/{}/{}/{}", self.properties.id, coord.z, coord.x, coord.y);
            let texture = ctx.load_texture(name, image, egui::TextureOptions::LINEAR);
            self.textures.put(coord, texture);
        }
        uploaded
    }

    fn request(&mut self, coord: TileCoord) {
        if self.pending.contains(&coord) || self.failed.contains(&coord) {
            return;
        }
        self.pending.insert(coord);
        self.loader.queue_tile(coord, self.source.url(coord));
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        for (coord, bounds) in viewport.visible_tiles() {
            match self.textures.get(&coord) {
                Some(texture) => {
                    context.render_tile_textured(texture.id(), bounds, self.properties.opacity)
                }
                None => {
                    context.render_tile_placeholder(bounds);
                    self.request(coord);
                }
            }
        }
        Ok(())
    }
}

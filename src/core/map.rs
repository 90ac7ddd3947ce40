//! The earthquake map: base layers, overlays, heat overlay and controls,
//! bound to one viewport.
//!
//! Everything that exists before any data arrives is created by
//! [`QuakeMap::new`]: both base tile layers, an empty "Earthquakes" overlay,
//! the empty "Tectonic Plates" group, the legend and the layer control. The
//! three feed results are applied independently, in whatever order they
//! arrive, through [`QuakeMap::apply_feed_event`].

use crate::{
    core::{
        config::MapConfig,
        constants::{EARTHQUAKES_NAME, TECTONIC_PLATES_NAME},
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    data::geojson::{BoundaryCollection, QuakeCollection},
    feed::client::{FeedEvent, FeedKind, FeedPayload, FeedTransport, HttpTransport},
    layers::{
        base::LayerTrait,
        marker::{build_markers, CircleMarker, EarthquakeLayer},
        registry::LayerRegistry,
        tile::{MapboxStyleSource, TileLayer},
        vector::PlateLayerGroup,
    },
    plugins::{base::PluginTrait, heatmap::HeatmapPlugin},
    rendering::context::RenderContext,
    ui::{
        controls::{LayerChange, LayerControl},
        legend::Legend,
        popup::Popup,
    },
    MapError, Result,
};
use std::sync::Arc;

pub struct QuakeMap {
    config: MapConfig,
    viewport: Viewport,
    registry: LayerRegistry,
    /// Set once, when the heat feed arrives
    heat: Option<HeatmapPlugin>,
    legend: Legend,
    layer_control: LayerControl,
    popup: Option<Popup>,
}

impl QuakeMap {
    /// Map with tiles fetched over HTTP
    pub fn new(config: MapConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Map whose tile layers download through `transport`
    pub fn with_transport(config: MapConfig, transport: Arc<dyn FeedTransport>) -> Result<Self> {
        let mut registry = LayerRegistry::new();

        for style in &config.base_styles {
            let source = MapboxStyleSource::from_config(&config, &style.style);
            registry.add_base(Box::new(TileLayer::new(
                style.style.clone(),
                style.name.clone(),
                Box::new(source),
                Arc::clone(&transport),
                config.tile_cache_capacity,
            )))?;
        }

        registry.add_overlay(
            Box::new(EarthquakeLayer::new(
                "earthquakes".to_string(),
                EARTHQUAKES_NAME.to_string(),
                Vec::new(),
            )),
            true,
        )?;
        registry.add_overlay(
            Box::new(PlateLayerGroup::new(
                "tectonic-plates".to_string(),
                TECTONIC_PLATES_NAME.to_string(),
            )),
            false,
        )?;

        // Size is unknown until the first frame
        let viewport = Viewport::new(config.center, config.zoom, Point::new(0.0, 0.0));
        let layer_control = LayerControl::new(config.layer_control_expanded);

        Ok(Self {
            config,
            viewport,
            registry,
            heat: None,
            legend: Legend::new(),
            layer_control,
            popup: None,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LayerRegistry {
        &mut self.registry
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn layer_control(&self) -> &LayerControl {
        &self.layer_control
    }

    pub fn layer_control_mut(&mut self) -> &mut LayerControl {
        &mut self.layer_control
    }

    pub fn heat(&self) -> Option<&HeatmapPlugin> {
        self.heat.as_ref()
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn earthquakes(&self) -> Option<&EarthquakeLayer> {
        self.registry.get_as::<EarthquakeLayer>(EARTHQUAKES_NAME)
    }

    pub fn plates(&self) -> Option<&PlateLayerGroup> {
        self.registry.get_as::<PlateLayerGroup>(TECTONIC_PLATES_NAME)
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.viewport.set_size(Point::new(width, height));
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
    }

    pub fn pan_by(&mut self, delta: Point) {
        self.viewport.pan_by(delta);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.viewport.set_zoom(self.viewport.zoom + delta);
    }

    /// Replace the earthquake markers with one per feature of `collection`
    pub fn attach_earthquakes(&mut self, collection: &QuakeCollection) -> Result<usize> {
        let markers = build_markers(collection)?;
        let count = markers.len();
        let layer = self
            .registry
            .get_as_mut::<EarthquakeLayer>(EARTHQUAKES_NAME)
            .ok_or_else(|| MapError::Layer(format!("missing overlay '{}'", EARTHQUAKES_NAME)))?;
        layer.set_markers(markers);
        self.popup = None;
        log::info!("attached {} earthquake markers", count);
        Ok(count)
    }

    /// Populate the plate group. Only the first call succeeds.
    pub fn attach_plates(&mut self, collection: &BoundaryCollection) -> Result<usize> {
        let group = self
            .registry
            .get_as_mut::<PlateLayerGroup>(TECTONIC_PLATES_NAME)
            .ok_or_else(|| MapError::Layer(format!("missing overlay '{}'", TECTONIC_PLATES_NAME)))?;
        let count = group.attach(collection)?;
        log::info!("attached {} plate boundary lines", count);
        Ok(count)
    }

    /// Build the heat overlay from `collection`. Only the first call succeeds.
    pub fn attach_heat(&mut self, collection: &QuakeCollection) -> Result<usize> {
        if self.heat.is_some() {
            return Err(MapError::Layer("heat overlay already attached".into()));
        }
        let heat = HeatmapPlugin::from_collection(collection, &self.config.heat)?;
        let count = heat.point_count();
        self.heat = Some(heat);
        log::info!("attached heat overlay with {} points", count);
        Ok(count)
    }

    /// Apply one feed result. Fetch failures are logged and swallowed so
    /// the other branches carry on; errors attaching a successful payload
    /// are returned.
    pub fn apply_feed_event(&mut self, event: FeedEvent) -> Result<()> {
        let FeedEvent { kind, url, result } = event;
        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                match kind {
                    FeedKind::Heat => log::warn!("heat feed {} failed: {}", url, e),
                    _ => log::error!("{} feed {} failed: {}", kind, url, e),
                }
                return Ok(());
            }
        };

        match (kind, payload) {
            (FeedKind::Earthquakes, FeedPayload::Quakes(collection)) => {
                self.attach_earthquakes(&collection).map(|_| ())
            }
            (FeedKind::Heat, FeedPayload::Quakes(collection)) => {
                self.attach_heat(&collection).map(|_| ())
            }
            (FeedKind::Plates, FeedPayload::Plates(collection)) => {
                self.attach_plates(&collection).map(|_| ())
            }
            (kind, _) => Err(MapError::Layer(format!("unexpected payload for {} feed", kind))),
        }
    }

    pub fn apply_layer_change(&mut self, change: &LayerChange) -> Result<()> {
        change.apply(&mut self.registry)?;
        if !self.registry.is_overlay_visible(EARTHQUAKES_NAME) {
            self.popup = None;
        }
        Ok(())
    }

    /// Upload downloaded tiles of every base layer. Returns how many arrived.
    pub fn process_downloads(&mut self, ctx: &egui::Context) -> usize {
        let mut uploaded = 0;
        self.registry.for_each_layer_mut(|layer| {
            if let Some(tiles) = layer.as_any_mut().downcast_mut::<TileLayer>() {
                uploaded += tiles.process_downloads(ctx);
            }
        });
        uploaded
    }

    /// Whether any tile of the active base layer is still downloading
    pub fn has_pending_tiles(&self) -> bool {
        self.registry
            .active_base()
            .and_then(|name| self.registry.get_as::<TileLayer>(name))
            .is_some_and(|tiles| tiles.pending_count() > 0)
    }

    /// Visible earthquake marker under a viewport pixel
    pub fn marker_at(&self, pixel: Point) -> Option<&CircleMarker> {
        if !self.registry.is_overlay_visible(EARTHQUAKES_NAME) {
            return None;
        }
        self.earthquakes()?.marker_at(&self.viewport, pixel)
    }

    /// A click on the map opens the popup of the marker under it, or closes
    /// the open popup when there is none.
    pub fn click_at(&mut self, pixel: Point) -> Option<&Popup> {
        self.popup = self.marker_at(pixel).map(Popup::for_marker);
        self.popup.as_ref()
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    /// Draw commands for the current frame: active base, visible overlays in
    /// registration order, then the heat overlay.
    pub fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        context.begin_frame();
        self.registry.render(context, &self.viewport)?;
        if let Some(heat) = self.heat.as_mut() {
            if heat.is_visible() {
                heat.render(context, &self.viewport)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::context::DrawCommand;
    use async_trait::async_trait;
    use serde_json::json;

    struct NoTiles;

    #[async_trait]
    impl FeedTransport for NoTiles {
        async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
            Err(MapError::Http {
                status: 404,
                url: url.to_string(),
            })
        }

        async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
            Err(MapError::Http {
                status: 404,
                url: url.to_string(),
            })
        }
    }

    fn map() -> QuakeMap {
        let mut map = QuakeMap::with_transport(MapConfig::default(), Arc::new(NoTiles)).unwrap();
        map.set_size(1024.0, 768.0);
        map
    }

    fn quakes() -> QuakeCollection {
        QuakeCollection::from_value(json!({
            "features": [
                {"properties": {"mag": 3.0, "place": "A", "time": 0},
                 "geometry": {"coordinates": [-100.0, 40.0]}},
                {"properties": {"mag": 9.0, "place": "B", "time": 0},
                 "geometry": {"coordinates": [-90.0, 35.0]}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_initial_composition() {
        let map = map();
        let registry = map.registry();
        assert_eq!(registry.base_names(), ["Street Map", "Dark Map"]);
        assert_eq!(registry.overlay_names(), ["Earthquakes", "Tectonic Plates"]);
        assert_eq!(registry.active_base(), Some("Street Map"));
        assert!(registry.is_overlay_visible("Earthquakes"));
        assert!(!registry.is_overlay_visible("Tectonic Plates"));
        assert!(map.heat().is_none());
        assert_eq!(map.viewport().center, LatLng::new(37.09, -95.71));
        assert_eq!(map.viewport().zoom, 5.0);
        assert!(map.layer_control().expanded);
    }

    #[test]
    fn test_feed_events_in_any_order() {
        let mut map = map();

        map.apply_feed_event(FeedEvent {
            kind: FeedKind::Heat,
            url: "q".into(),
            result: Ok(FeedPayload::Quakes(quakes())),
        })
        .unwrap();
        map.apply_feed_event(FeedEvent {
            kind: FeedKind::Plates,
            url: "p".into(),
            result: Ok(FeedPayload::Plates(BoundaryCollection::default())),
        })
        .unwrap();
        map.apply_feed_event(FeedEvent {
            kind: FeedKind::Earthquakes,
            url: "q".into(),
            result: Ok(FeedPayload::Quakes(quakes())),
        })
        .unwrap();

        assert_eq!(map.earthquakes().unwrap().len(), 2);
        assert!(map.plates().unwrap().is_attached());
        assert_eq!(map.heat().unwrap().points(), [LatLng::new(35.0, -90.0)]);
    }

    #[test]
    fn test_failed_fetch_leaves_layers_empty() {
        let mut map = map();
        for kind in [FeedKind::Earthquakes, FeedKind::Plates, FeedKind::Heat] {
            let event = FeedEvent {
                kind,
                url: "u".into(),
                result: Err(MapError::Http {
                    status: 500,
                    url: "u".into(),
                }),
            };
            assert!(map.apply_feed_event(event).is_ok());
        }
        assert!(map.earthquakes().unwrap().is_empty());
        assert!(!map.plates().unwrap().is_attached());
        assert!(map.heat().is_none());
    }

    #[test]
    fn test_mismatched_payload_is_rejected() {
        let mut map = map();
        let event = FeedEvent {
            kind: FeedKind::Plates,
            url: "p".into(),
            result: Ok(FeedPayload::Quakes(quakes())),
        };
        assert!(matches!(map.apply_feed_event(event), Err(MapError::Layer(_))));
    }

    #[test]
    fn test_heat_and_plates_attach_once() {
        let mut map = map();
        map.attach_heat(&quakes()).unwrap();
        assert!(map.attach_heat(&quakes()).is_err());
        map.attach_plates(&BoundaryCollection::default()).unwrap();
        assert!(map.attach_plates(&BoundaryCollection::default()).is_err());
    }

    #[test]
    fn test_click_opens_and_closes_popup() {
        let mut map = map();
        map.set_view(LatLng::new(37.5, -95.0), 4.0);
        map.attach_earthquakes(&quakes()).unwrap();

        let b = map.viewport().lat_lng_to_pixel(&LatLng::new(35.0, -90.0));
        let popup = map.click_at(b).unwrap();
        assert!(popup.content.starts_with("B\n"));

        assert!(map.click_at(Point::new(1.0, 1.0)).is_none());
        assert!(map.popup().is_none());

        map.apply_layer_change(&LayerChange::SetOverlay(EARTHQUAKES_NAME.into(), false))
            .unwrap();
        assert!(map.marker_at(b).is_none());
    }

    #[tokio::test]
    async fn test_marker_centered_off_screen_still_draws() {
        let mut map = map();
        let outside = map.viewport().pixel_to_lat_lng(&Point::new(-20.0, 384.0));
        let collection = QuakeCollection::from_value(json!({
            "features": [{
                "properties": {"mag": 9.0, "place": "edge", "time": 0},
                "geometry": {"coordinates": [outside.lng, outside.lat]}
            }]
        }))
        .unwrap();
        map.attach_earthquakes(&collection).unwrap();

        let mut ctx = RenderContext::new(1024, 768);
        map.render(&mut ctx).unwrap();
        let points = ctx
            .get_drawing_queue()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Point { .. }))
            .count();
        assert_eq!(points, 1);
    }

    #[tokio::test]
    async fn test_render_order() {
        let mut map = map();
        map.set_view(LatLng::new(37.5, -95.0), 4.0);
        map.attach_earthquakes(&quakes()).unwrap();
        map.attach_heat(&quakes()).unwrap();

        let mut ctx = RenderContext::new(1024, 768);
        map.render(&mut ctx).unwrap();
        let queue = ctx.get_drawing_queue();

        let first_point = queue
            .iter()
            .position(|c| matches!(c, DrawCommand::Point { .. }))
            .unwrap();
        let first_cell = queue
            .iter()
            .position(|c| matches!(c, DrawCommand::Cell { .. }))
            .unwrap();
        assert!(matches!(queue[0], DrawCommand::TilePlaceholder { .. }));
        assert!(first_point < first_cell);
    }
}

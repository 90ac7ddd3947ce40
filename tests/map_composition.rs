use async_trait::async_trait;
use quakemap::{
    feed::client::FeedTransport,
    rendering::context::{DrawCommand, RenderContext},
    ui::{LayerChange, UiMapExt},
    BoundaryCollection, FeedClient, FeedKind, FeedPayload, LatLng, LayerTrait, MagnitudeBucket,
    MapConfig, MapError, Point, QuakeCollection, QuakeMap, Result,
};
use serde_json::json;
use std::sync::Arc;

/// Shows the crate's fetch logs under `cargo test -- --nocapture`
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every request fails, so tiles stay placeholders
struct Offline;

#[async_trait]
impl FeedTransport for Offline {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        Err(MapError::Http {
            status: 503,
            url: url.to_string(),
        })
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Err(MapError::Http {
            status: 503,
            url: url.to_string(),
        })
    }
}

/// Answers the earthquake URL with a fixture
struct QuakesOnly(serde_json::Value);

#[async_trait]
impl FeedTransport for QuakesOnly {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        if url == "fixture://quakes" {
            Ok(self.0.clone())
        } else {
            Err(MapError::Http {
                status: 503,
                url: url.to_string(),
            })
        }
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Err(MapError::Http {
            status: 503,
            url: url.to_string(),
        })
    }
}

fn two_features() -> serde_json::Value {
    json!({
        "features": [
            {"properties": {"mag": 3.0, "place": "A", "time": 0},
             "geometry": {"coordinates": [-100.0, 40.0]}},
            {"properties": {"mag": 9.0, "place": "B", "time": 0},
             "geometry": {"coordinates": [-90.0, 35.0]}}
        ]
    })
}

fn offline_map() -> QuakeMap {
    let mut map = QuakeMap::with_transport(MapConfig::default(), Arc::new(Offline)).unwrap();
    map.set_size(1024.0, 768.0);
    map
}

#[tokio::test]
async fn test_two_feature_feed_end_to_end() {
    init_logging();
    let config = MapConfig::default().with_feed_urls("fixture://quakes", "fixture://plates");
    let client = FeedClient::with_transport(Arc::new(QuakesOnly(two_features())));
    let mut map = QuakeMap::with_transport(config.clone(), Arc::new(Offline)).unwrap();
    map.set_size(1024.0, 768.0);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _handles = client.spawn_all(&config, move |event| {
        let _ = tx.send(event);
    });
    for _ in 0..3 {
        let event = rx.recv().await.unwrap();
        map.apply_feed_event(event).unwrap();
    }

    let markers = map.earthquakes().unwrap().markers();
    assert_eq!(markers.len(), 2);
    assert_eq!((markers[0].radius, markers[0].bucket), (15.0, MagnitudeBucket::C2));
    assert_eq!((markers[1].radius, markers[1].bucket), (45.0, MagnitudeBucket::C5));

    assert_eq!(map.heat().unwrap().points(), [LatLng::new(35.0, -90.0)]);

    // The plate request failed: the group stays registered and empty
    assert!(!map.plates().unwrap().is_attached());
    assert!(map.registry().overlay_names().iter().any(|n| n == "Tectonic Plates"));
}

#[test]
fn test_empty_collection_yields_nothing() {
    init_logging();
    let mut map = offline_map();
    let empty = QuakeCollection::from_value(json!({"type": "FeatureCollection", "features": []}))
        .unwrap();

    assert_eq!(map.attach_earthquakes(&empty).unwrap(), 0);
    assert_eq!(map.attach_heat(&empty).unwrap(), 0);
    assert!(map.earthquakes().unwrap().is_empty());
    assert!(map.heat().unwrap().points().is_empty());
}

#[test]
fn test_base_layers_are_exclusive_and_overlays_independent() {
    init_logging();
    let mut map = offline_map();

    map.apply_layer_change(&LayerChange::SelectBase("Dark Map".into()))
        .unwrap();
    assert_eq!(map.registry().active_base(), Some("Dark Map"));
    let visible_bases = map
        .registry()
        .base_names()
        .iter()
        .filter(|n| map.registry().get(n).unwrap().is_visible())
        .count();
    assert_eq!(visible_bases, 1);

    map.apply_layer_change(&LayerChange::SetOverlay("Tectonic Plates".into(), true))
        .unwrap();
    map.apply_layer_change(&LayerChange::SetOverlay("Earthquakes".into(), false))
        .unwrap();
    assert!(map.registry().is_overlay_visible("Tectonic Plates"));
    assert!(!map.registry().is_overlay_visible("Earthquakes"));

    assert!(map
        .apply_layer_change(&LayerChange::SelectBase("Satellite".into()))
        .is_err());
}

#[test]
fn test_plate_group_rejects_second_attach() {
    init_logging();
    let mut map = offline_map();
    let plates = BoundaryCollection::from_value(json!({
        "features": [
            {"geometry": {"type": "LineString", "coordinates": [[-125.0, 40.0], [-120.0, 35.0]]}}
        ]
    }))
    .unwrap();

    assert_eq!(map.attach_plates(&plates).unwrap(), 1);
    let second = map.apply_feed_event(quakemap::FeedEvent {
        kind: FeedKind::Plates,
        url: "again".into(),
        result: Ok(FeedPayload::Plates(BoundaryCollection::default())),
    });
    assert!(matches!(second, Err(MapError::Layer(_))));
    assert_eq!(map.plates().unwrap().line_count(), 1);
}

#[tokio::test]
async fn test_hidden_overlays_are_not_drawn() {
    init_logging();
    let mut map = offline_map();
    map.set_view(LatLng::new(37.5, -95.0), 4.0);
    map.attach_earthquakes(&QuakeCollection::from_value(two_features()).unwrap())
        .unwrap();

    let mut ctx = RenderContext::new(1024, 768);
    map.render(&mut ctx).unwrap();
    let points = |ctx: &RenderContext| {
        ctx.get_drawing_queue()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Point { .. }))
            .count()
    };
    assert_eq!(points(&ctx), 2);

    map.apply_layer_change(&LayerChange::SetOverlay("Earthquakes".into(), false))
        .unwrap();
    map.render(&mut ctx).unwrap();
    assert_eq!(points(&ctx), 0);
}

#[tokio::test]
async fn test_widget_frame_without_scroll_zoom() {
    init_logging();
    let ctx = egui::Context::default();
    let mut map = offline_map();
    map.attach_earthquakes(&QuakeCollection::from_value(two_features()).unwrap())
        .unwrap();

    let input = egui::RawInput {
        screen_rect: Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(800.0, 600.0),
        )),
        events: vec![egui::Event::Scroll(egui::vec2(0.0, 120.0))],
        ..Default::default()
    };

    let mut rect = egui::Rect::NOTHING;
    let _ = ctx.run(input, |ctx| {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                rect = ui.quake_map(&mut map).rect;
            });
    });

    assert!(rect.width() > 0.0 && rect.height() > 0.0);
    assert_eq!(map.viewport().size, Point::new(rect.width() as f64, rect.height() as f64));
    assert_eq!(map.viewport().zoom, 5.0);
}

#[tokio::test]
async fn test_ctrl_wheel_does_not_zoom_when_wheel_zoom_is_off() {
    init_logging();
    let ctx = egui::Context::default();
    let mut map = offline_map();
    let screen = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0));

    let frames = [
        (
            egui::Modifiers::NONE,
            vec![egui::Event::PointerMoved(egui::pos2(400.0, 300.0))],
        ),
        (
            egui::Modifiers::CTRL,
            vec![
                egui::Event::Zoom(1.5),
                egui::Event::Scroll(egui::vec2(0.0, 120.0)),
            ],
        ),
    ];
    for (modifiers, events) in frames {
        let input = egui::RawInput {
            screen_rect: Some(screen),
            modifiers,
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default()
                .frame(egui::Frame::none())
                .show(ctx, |ui| {
                    ui.quake_map(&mut map);
                });
        });
    }

    assert_eq!(map.viewport().zoom, 5.0);
}

use async_trait::async_trait;
use quakemap::{
    feed::client::FeedTransport, FeedClient, FeedEvent, FeedKind, FeedPayload, MapConfig,
    MapError, Result,
};
use serde_json::json;
use std::{collections::HashMap, sync::Arc, time::Duration};

/// Shows the crate's fetch logs under `cargo test -- --nocapture`
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Serves fixed JSON per URL; unknown URLs answer 404
struct FixtureTransport {
    routes: HashMap<String, serde_json::Value>,
}

#[async_trait]
impl FeedTransport for FixtureTransport {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        self.routes.get(url).cloned().ok_or_else(|| MapError::Http {
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

fn quake_fixture() -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {"properties": {"mag": 3.0, "place": "A", "time": 0},
             "geometry": {"type": "Point", "coordinates": [-100.0, 40.0, 10.0]}},
            {"properties": {"mag": 9.0, "place": "B", "time": 0},
             "geometry": {"type": "Point", "coordinates": [-90.0, 35.0, 5.0]}}
        ]
    })
}

fn plate_fixture() -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {"properties": {"Name": "NA-PA"},
             "geometry": {"type": "LineString", "coordinates": [[-125.0, 40.0], [-120.0, 35.0]]}}
        ]
    })
}

fn config() -> MapConfig {
    MapConfig::default().with_feed_urls("fixture://quakes", "fixture://plates")
}

async fn collect(client: &FeedClient, config: &MapConfig) -> Vec<FeedEvent> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _handles = client.spawn_all(config, move |event| {
        let _ = tx.send(event);
    });

    let mut events = Vec::new();
    while events.len() < 3 {
        match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            Ok(Some(event)) => events.push(event),
            _ => break,
        }
    }
    events
}

#[tokio::test]
async fn test_each_event_carries_its_own_kind() {
    init_logging();
    let mut routes = HashMap::new();
    routes.insert("fixture://quakes".to_string(), quake_fixture());
    routes.insert("fixture://plates".to_string(), plate_fixture());
    let client = FeedClient::with_transport(Arc::new(FixtureTransport { routes }));

    let mut events = collect(&client, &config()).await;
    assert_eq!(events.len(), 3);
    events.sort_by_key(|e| e.kind as u8);

    assert_eq!(events[0].kind, FeedKind::Earthquakes);
    assert_eq!(events[1].kind, FeedKind::Plates);
    assert_eq!(events[2].kind, FeedKind::Heat);

    for event in &events {
        match (event.kind, event.result.as_ref().unwrap()) {
            (FeedKind::Earthquakes | FeedKind::Heat, FeedPayload::Quakes(c)) => {
                assert_eq!(c.len(), 2);
                assert_eq!(event.url, "fixture://quakes");
            }
            (FeedKind::Plates, FeedPayload::Plates(c)) => {
                assert_eq!(c.lines().len(), 1);
                assert_eq!(event.url, "fixture://plates");
            }
            (kind, payload) => panic!("{} delivered {:?}", kind, payload),
        }
    }
}

#[tokio::test]
async fn test_failure_reaches_only_its_own_event() {
    init_logging();
    let mut routes = HashMap::new();
    routes.insert("fixture://quakes".to_string(), quake_fixture());
    let client = FeedClient::with_transport(Arc::new(FixtureTransport { routes }));

    let events = collect(&client, &config()).await;
    assert_eq!(events.len(), 3);

    for event in events {
        match event.kind {
            FeedKind::Plates => assert!(matches!(
                event.result,
                Err(MapError::Http { status: 404, .. })
            )),
            _ => assert!(event.result.is_ok()),
        }
    }
}

#[tokio::test]
async fn test_malformed_feature_rejects_collection() {
    init_logging();
    let mut routes = HashMap::new();
    routes.insert(
        "fixture://quakes".to_string(),
        json!({"features": [{"properties": {"mag": 1.0}, "geometry": {"coordinates": [-100.0]}}]}),
    );
    routes.insert(
        "fixture://plates".to_string(),
        json!({"features": [{"properties": {"mag": 1.0}}]}),
    );
    let client = FeedClient::with_transport(Arc::new(FixtureTransport { routes }));

    assert!(matches!(
        client.fetch_quakes("fixture://quakes").await,
        Err(MapError::ParseError(_))
    ));
    let without_geometry = FixtureTransport {
        routes: HashMap::from([(
            "q".to_string(),
            json!({"features": [{"properties": {"mag": 1.0}}]}),
        )]),
    };
    let client = FeedClient::with_transport(Arc::new(without_geometry));
    assert!(matches!(
        client.fetch_quakes("q").await,
        Err(MapError::Serialization(_))
    ));
}

use crate::{
    core::{config::MapConfig, constants::USER_AGENT},
    data::geojson::{BoundaryCollection, QuakeCollection},
    runtime::{self, AsyncHandle},
    MapError, Result,
};
use async_trait::async_trait;
use crossbeam_channel::Sender;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::sync::Arc;

/// Shared HTTP client with a custom User-Agent so that public endpoints
/// don't reject the request. Building it once reuses the connection pool
/// across feeds and tiles.
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            Client::new()
        })
});

/// Something that can GET a URL. Abstracted so the feeds can be served from
/// fixtures.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// GET and parse the body as JSON. A body that is not JSON is a
    /// `MapError::Serialization`.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let bytes = self.get_bytes(url).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}

/// Which of the three independent requests an event answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    /// Earthquake feed, feeding the marker layer
    Earthquakes,
    /// Plate boundary dataset, feeding the plate layer group
    Plates,
    /// Earthquake feed again, feeding the heat overlay
    Heat,
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedKind::Earthquakes => write!(f, "earthquakes"),
            FeedKind::Plates => write!(f, "plates"),
            FeedKind::Heat => write!(f, "heat"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedPayload {
    Quakes(QuakeCollection),
    Plates(BoundaryCollection),
}

/// Result of one request, delivered to that request's continuation only
#[derive(Debug)]
pub struct FeedEvent {
    pub kind: FeedKind,
    pub url: String,
    pub result: Result<FeedPayload>,
}

/// Fetches and parses the feeds
#[derive(Clone)]
pub struct FeedClient {
    transport: Arc<dyn FeedTransport>,
}

impl FeedClient {
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(transport: Arc<dyn FeedTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> Arc<dyn FeedTransport> {
        Arc::clone(&self.transport)
    }

    pub async fn fetch_quakes(&self, url: &str) -> Result<QuakeCollection> {
        log::debug!("fetching earthquake feed {}", url);
        QuakeCollection::from_value(self.transport.get_json(url).await?)
    }

    pub async fn fetch_plates(&self, url: &str) -> Result<BoundaryCollection> {
        log::debug!("fetching plate boundaries {}", url);
        BoundaryCollection::from_value(self.transport.get_json(url).await?)
    }

    /// Fetch and parse the payload appropriate for `kind`
    pub async fn fetch(&self, kind: FeedKind, url: &str) -> Result<FeedPayload> {
        match kind {
            FeedKind::Earthquakes | FeedKind::Heat => {
                self.fetch_quakes(url).await.map(FeedPayload::Quakes)
            }
            FeedKind::Plates => self.fetch_plates(url).await.map(FeedPayload::Plates),
        }
    }

    /// Issue one request in the background and hand its result to
    /// `continuation` whenever it arrives.
    pub fn spawn_fetch<F>(
        &self,
        kind: FeedKind,
        url: String,
        continuation: F,
    ) -> Box<dyn AsyncHandle>
    where
        F: FnOnce(FeedEvent) + Send + 'static,
    {
        let client = self.clone();
        runtime::spawn(async move {
            let result = client.fetch(kind, &url).await;
            continuation(FeedEvent { kind, url, result });
        })
    }

    /// Like [`FeedClient::spawn_fetch`] with a channel as the continuation
    pub fn spawn_fetch_into(
        &self,
        kind: FeedKind,
        url: String,
        sink: Sender<FeedEvent>,
    ) -> Box<dyn AsyncHandle> {
        self.spawn_fetch(kind, url, move |event| {
            if sink.send(event).is_err() {
                log::debug!("feed receiver dropped before {} arrived", kind);
            }
        })
    }

    /// Issue the three requests of the map without waiting on each other:
    /// earthquakes for markers, plate boundaries, earthquakes for the heat
    /// overlay. Every event goes to its own call of `continuation`.
    pub fn spawn_all<F>(&self, config: &MapConfig, continuation: F) -> Vec<Box<dyn AsyncHandle>>
    where
        F: Fn(FeedEvent) + Clone + Send + 'static,
    {
        [
            (FeedKind::Earthquakes, config.earthquake_feed_url.clone()),
            (FeedKind::Plates, config.plate_boundaries_url.clone()),
            (FeedKind::Heat, config.earthquake_feed_url.clone()),
        ]
        .into_iter()
        .map(|(kind, url)| self.spawn_fetch(kind, url, continuation.clone()))
        .collect()
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

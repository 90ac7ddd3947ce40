//! # quakemap
//!
//! Earthquake feed visualization on a natively rendered slippy map.
//!
//! The weekly USGS feed is fetched over HTTP, each event becomes a circle
//! marker classified by magnitude, tectonic plate boundaries are drawn as
//! polylines, and a heat overlay is computed from the event coordinates.
//! Base tile styles and overlays are switched from an on-map layer control
//! and a magnitude legend sits in the bottom-right corner.

pub mod classify;
pub mod core;
pub mod data;
pub mod feed;
pub mod layers;
pub mod plugins;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod spatial;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::MapConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::QuakeMap,
    viewport::Viewport,
};

pub use classify::{color, radius, MagnitudeBucket, LEGEND_GRADES};

pub use data::geojson::{BoundaryCollection, QuakeCollection, QuakeFeature};

pub use feed::client::{FeedClient, FeedEvent, FeedKind, FeedPayload};

pub use layers::{
    base::LayerTrait, marker::CircleMarker, marker::EarthquakeLayer, registry::LayerRegistry,
    tile::TileLayer, vector::PlateLayerGroup,
};

pub use plugins::heatmap::{HeatAggregator, HeatmapPlugin};

pub use ui::{legend::Legend, widget::MapWidget};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Error type alias for convenience
pub type Error = MapError;

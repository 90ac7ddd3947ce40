//! Common quakemap types for `use quakemap::prelude::*;`

pub use crate::core::{
    config::{BaseStyle, HeatOptions, MapConfig},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::QuakeMap,
    viewport::Viewport,
};

pub use crate::classify::{color, radius, MagnitudeBucket, LEGEND_GRADES};

pub use crate::data::geojson::{BoundaryCollection, QuakeCollection, QuakeFeature};

pub use crate::feed::client::{FeedClient, FeedEvent, FeedKind, FeedPayload, FeedTransport};

pub use crate::layers::{
    base::LayerTrait,
    marker::{CircleMarker, EarthquakeLayer},
    registry::LayerRegistry,
    tile::TileLayer,
    vector::PlateLayerGroup,
};

pub use crate::plugins::heatmap::{HeatAggregator, HeatmapPlugin};

pub use crate::runtime::{runtime, spawn, AsyncHandle, AsyncSpawner};

pub use crate::rendering::context::{DrawCommand, RenderContext};

pub use crate::ui::{legend::Legend, widget::MapWidget};

pub use crate::{MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

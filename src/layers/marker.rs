//! Earthquake circle markers.
//!
//! Each feature of the feed becomes exactly one [`CircleMarker`]: placed at
//! the epicenter, sized by [`classify::radius`], coloured by
//! [`classify::color`], and carrying popup text made of the place and the
//! event time.

use crate::{
    classify::{self, MagnitudeBucket},
    core::{
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    data::geojson::{QuakeCollection, QuakeFeature},
    layers::base::{LayerProperties, LayerTrait, LayerType},
    rendering::context::{PointRenderStyle, RenderContext},
    spatial::index::{SpatialIndex, SpatialItem},
    MapError, Result,
};
use chrono::{TimeZone, Utc};

/// Stroke weight and fill opacity of a circle marker
const MARKER_STROKE_WIDTH: f32 = 3.0;
const MARKER_FILL_OPACITY: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct CircleMarker {
    pub id: String,
    pub position: LatLng,
    pub magnitude: f64,
    /// Radius in pixels, as classified. May be zero or negative.
    pub radius: f64,
    pub bucket: MagnitudeBucket,
    pub popup: String,
}

impl CircleMarker {
    /// Build the marker for the feature at `index` of its collection
    pub fn from_feature(index: usize, feature: &QuakeFeature) -> Result<Self> {
        let position = feature.position().ok_or_else(|| {
            MapError::ParseError(format!("feature {} has no usable coordinates", index))
        })?;
        let magnitude = feature.magnitude();

        Ok(Self {
            id: format!("quake-{}", index),
            position,
            magnitude,
            radius: classify::radius(magnitude),
            bucket: classify::color(magnitude),
            popup: popup_text(feature),
        })
    }

    /// Radius actually drawn; non-positive radii draw nothing
    pub fn draw_radius(&self) -> f32 {
        self.radius.max(0.0) as f32
    }

    pub fn style(&self, opacity: f32) -> PointRenderStyle {
        let color = self.bucket.color();
        PointRenderStyle {
            fill_color: color,
            stroke_color: color,
            stroke_width: MARKER_STROKE_WIDTH,
            radius: self.draw_radius(),
            fill_opacity: MARKER_FILL_OPACITY * opacity,
        }
    }
}

/// Popup body: the place on the first line, the event time on the second
pub fn popup_text(feature: &QuakeFeature) -> String {
    format!("{}\n{}", feature.place(), format_time(feature.time_millis()))
}

/// Human readable UTC rendering of an epoch-milliseconds timestamp. Values
/// outside chrono's range fall back to the raw number.
pub fn format_time(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%a, %d %b %Y %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// One marker per feature, in feed order
pub fn build_markers(collection: &QuakeCollection) -> Result<Vec<CircleMarker>> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| CircleMarker::from_feature(index, feature))
        .collect()
}

/// Overlay holding the earthquake markers
pub struct EarthquakeLayer {
    properties: LayerProperties,
    markers: Vec<CircleMarker>,
    index: SpatialIndex<usize>,
    bounds: Option<LatLngBounds>,
}

impl EarthquakeLayer {
    pub fn new(id: String, name: String, markers: Vec<CircleMarker>) -> Self {
        let mut layer = Self {
            properties: LayerProperties::new(id, name, LayerType::Marker),
            markers: Vec::new(),
            index: SpatialIndex::new(),
            bounds: None,
        };
        layer.set_markers(markers);
        layer
    }

    /// Replace every marker, keeping visibility and opacity
    pub fn set_markers(&mut self, markers: Vec<CircleMarker>) {
        self.index = SpatialIndex::bulk_load(
            markers
                .iter()
                .enumerate()
                .map(|(i, m)| SpatialItem::from_lat_lng(m.position, i))
                .collect(),
        );
        self.bounds = LatLngBounds::from_points(markers.iter().map(|m| &m.position));
        self.markers = markers;
    }

    pub fn from_collection(id: String, name: String, collection: &QuakeCollection) -> Result<Self> {
        Ok(Self::new(id, name, build_markers(collection)?))
    }

    pub fn markers(&self) -> &[CircleMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Marker under a viewport-relative pixel. When circles overlap the one
    /// whose center is closest wins.
    pub fn marker_at(&self, viewport: &Viewport, pixel: Point) -> Option<&CircleMarker> {
        let max_radius = self
            .markers
            .iter()
            .map(|m| m.draw_radius() as f64)
            .fold(0.0, f64::max);
        let world = Viewport::world_size(viewport.zoom);
        let query = viewport.pixel_to_lat_lng(&pixel).to_unit_mercator();

        for item in self.index.nearest_iter(query) {
            let distance_px = item.point.distance_to(&query) * world;
            if distance_px > max_radius {
                break;
            }
            let marker = &self.markers[item.data];
            if distance_px <= marker.draw_radius() as f64 {
                return Some(marker);
            }
        }
        None
    }
}

impl LayerTrait for EarthquakeLayer {
    crate::impl_layer_trait!(EarthquakeLayer, properties);

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let opacity = self.properties.opacity;
        // Larger circles first so small events stay clickable on top
        let mut order: Vec<&CircleMarker> = self.markers.iter().collect();
        order.sort_by(|a, b| b.radius.total_cmp(&a.radius));

        for marker in order {
            if marker.draw_radius() <= 0.0 {
                continue;
            }
            let position = viewport.lat_lng_to_pixel(&marker.position);
            context.render_point(&position, &marker.style(opacity));
        }
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        self.bounds.clone()
    }

    /// Circles are sized in pixels, so a circle can reach into the view while
    /// every epicenter lies outside it. Culling is left to each point.
    fn intersects_bounds(&self, _bounds: &LatLngBounds) -> bool {
        true
    }
}

//! Tectonic plate boundaries.
//!
//! The plate overlay is registered with the layer control before its data
//! exists. [`PlateLayerGroup`] is that container: it starts empty, receives
//! the boundary dataset once through [`PlateLayerGroup::attach`], and
//! refuses any later attach so a slow duplicate response can't replace it.

use crate::{
    core::{
        constants::{PLATE_COLOR, PLATE_WEIGHT},
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    data::geojson::BoundaryCollection,
    layers::base::{LayerProperties, LayerTrait, LayerType},
    rendering::context::{LineRenderStyle, RenderContext},
    MapError, Result,
};
use egui::Color32;
use serde::{Deserialize, Serialize};

/// Style for line features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Line color as RGB
    pub color: (u8, u8, u8),
    pub width: f32,
    pub opacity: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: PLATE_COLOR,
            width: PLATE_WEIGHT,
            opacity: 1.0,
        }
    }
}

impl LineStyle {
    fn to_render_style(&self, opacity_multiplier: f32) -> LineRenderStyle {
        let (r, g, b) = self.color;
        LineRenderStyle {
            color: Color32::from_rgb(r, g, b),
            width: self.width,
            opacity: self.opacity * opacity_multiplier,
        }
    }
}

/// Write-once polyline overlay for the plate boundary dataset
pub struct PlateLayerGroup {
    properties: LayerProperties,
    style: LineStyle,
    lines: Option<Vec<Vec<LatLng>>>,
    bounds: Option<LatLngBounds>,
}

impl PlateLayerGroup {
    pub fn new(id: String, name: String) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::Vector),
            style: LineStyle::default(),
            lines: None,
            bounds: None,
        }
    }

    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }

    /// Populate the group. Returns the number of polylines attached.
    pub fn attach(&mut self, collection: &BoundaryCollection) -> Result<usize> {
        if self.lines.is_some() {
            return Err(MapError::Layer(format!(
                "layer '{}' already holds plate boundaries",
                self.properties.name
            )));
        }

        let lines = collection.lines();
        self.bounds = LatLngBounds::from_points(lines.iter().flatten());
        let count = lines.len();
        self.lines = Some(lines);
        Ok(count)
    }

    pub fn is_attached(&self) -> bool {
        self.lines.is_some()
    }

    pub fn line_count(&self) -> usize {
        self.lines.as_ref().map_or(0, Vec::len)
    }
}

/// Splits a projected polyline wherever it jumps across the antimeridian,
/// so no segment is drawn across the whole map.
fn split_at_antimeridian(line: &[LatLng], viewport: &Viewport) -> Vec<Vec<Point>> {
    let mut parts = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut previous: Option<&LatLng> = None;

    for p in line {
        if let Some(prev) = previous {
            if (p.lng - prev.lng).abs() > 180.0 {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(viewport.lat_lng_to_pixel(p));
        previous = Some(p);
    }
    parts.push(current);
    parts.retain(|part| part.len() >= 2);
    parts
}

impl LayerTrait for PlateLayerGroup {
    crate::impl_layer_trait!(PlateLayerGroup, properties);

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let Some(lines) = &self.lines else {
            return Ok(());
        };
        let style = self.style.to_render_style(self.properties.opacity);
        for line in lines {
            for part in split_at_antimeridian(line, viewport) {
                context.render_line(&part, &style);
            }
        }
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        self.bounds.clone()
    }
}

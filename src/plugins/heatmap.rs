//! Earthquake density overlay.
//!
//! [`HeatAggregator`] turns a fetched collection into heat points and
//! [`HeatmapPlugin`] renders them. The plugin is not part of the layer
//! control: once its data arrives it is always drawn.

use crate::{
    core::{
        config::HeatOptions,
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    data::geojson::QuakeCollection,
    plugins::base::PluginTrait,
    rendering::context::RenderContext,
    spatial::index::{SpatialIndex, SpatialItem},
    MapError, Result,
};
use egui::Color32;

/// Side of one heat cell in pixels
const HEAT_CELL_SIZE: f64 = 5.0;

/// Cells whose normalized intensity is below this are not drawn
const MIN_VISIBLE_INTENSITY: f64 = 0.01;

/// Extracts heat points from an earthquake collection.
pub struct HeatAggregator;

impl HeatAggregator {
    /// `(lat, lng)` of every feature after the first one. The first feature
    /// never contributes, so empty and single-feature collections give
    /// nothing.
    pub fn aggregate(collection: &QuakeCollection) -> Vec<LatLng> {
        collection
            .features
            .iter()
            .skip(1)
            .filter_map(|feature| feature.position())
            .collect()
    }
}

/// Configuration for the heatmap
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapConfig {
    /// Radius of influence for each data point (in pixels)
    pub radius: f64,
    /// Intensity at which the gradient saturates
    pub max_intensity: f64,
    pub blur: f64,
    /// Gradient colors from low to high intensity, sorted by position
    pub gradient: Vec<(f64, Color32)>,
    /// Alpha of fully saturated cells
    pub opacity: f32,
    pub cell_size: f64,
}

impl HeatmapConfig {
    pub fn from_options(options: &HeatOptions) -> Result<Self> {
        let mut gradient = options
            .gradient
            .iter()
            .map(|(stop, hex)| Ok((*stop, parse_hex_color(hex)?)))
            .collect::<Result<Vec<_>>>()?;
        if gradient.is_empty() {
            return Err(MapError::ParseError("heat gradient has no stops".into()));
        }
        gradient.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Self {
            radius: options.radius,
            max_intensity: options.max,
            blur: options.blur,
            gradient,
            opacity: 0.6,
            cell_size: HEAT_CELL_SIZE,
        })
    }

    /// Map intensity to color using the gradient. Below the first stop the
    /// first color fades out towards transparent.
    pub fn intensity_to_color(&self, intensity: f64) -> Option<Color32> {
        let normalized = if self.max_intensity > 0.0 {
            (intensity / self.max_intensity).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if normalized < MIN_VISIBLE_INTENSITY {
            return None;
        }

        let alpha = |factor: f64| (self.opacity as f64 * factor * 255.0).round() as u8;

        let (first_stop, first_color) = self.gradient[0];
        if normalized < first_stop {
            let [r, g, b, _] = first_color.to_array();
            return Some(Color32::from_rgba_unmultiplied(
                r,
                g,
                b,
                alpha(normalized / first_stop),
            ));
        }

        for pair in self.gradient.windows(2) {
            let (t1, c1) = pair[0];
            let (t2, c2) = pair[1];
            if normalized <= t2 {
                let t = if t2 > t1 { (normalized - t1) / (t2 - t1) } else { 1.0 };
                let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
                return Some(Color32::from_rgba_unmultiplied(
                    mix(c1.r(), c2.r()),
                    mix(c1.g(), c2.g()),
                    mix(c1.b(), c2.b()),
                    alpha(1.0),
                ));
            }
        }

        let [r, g, b, _] = self.gradient[self.gradient.len() - 1].1.to_array();
        Some(Color32::from_rgba_unmultiplied(r, g, b, alpha(1.0)))
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            radius: crate::core::constants::HEAT_RADIUS,
            max_intensity: crate::core::constants::HEAT_MAX,
            blur: crate::core::constants::HEAT_BLUR,
            gradient: vec![
                (0.4, Color32::from_rgb(0, 0, 255)),
                (0.65, Color32::from_rgb(0, 255, 0)),
                (1.0, Color32::from_rgb(255, 0, 0)),
            ],
            opacity: 0.6,
            cell_size: HEAT_CELL_SIZE,
        }
    }
}

/// `#rrggbb` to a color
pub fn parse_hex_color(hex: &str) -> Result<Color32> {
    let digits = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .ok_or_else(|| MapError::ParseError(format!("invalid color '{}'", hex)))
    };
    if digits.len() != 6 {
        return Err(MapError::ParseError(format!("invalid color '{}'", hex)));
    }
    Ok(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[derive(Debug, Clone)]
struct HeatCell {
    min: Point,
    max: Point,
    color: Color32,
}

/// Cells in world pixels for one zoom level. A pan reuses them as long as
/// the view stays inside `covered`.
struct HeatmapCache {
    zoom: f64,
    covered: (Point, Point),
    cells: Vec<HeatCell>,
}

impl HeatmapCache {
    fn covers(&self, viewport: &Viewport) -> bool {
        let min = viewport.origin();
        let max = min.add(&viewport.size);
        self.zoom == viewport.zoom
            && min.x >= self.covered.0.x
            && min.y >= self.covered.0.y
            && max.x <= self.covered.1.x
            && max.y <= self.covered.1.y
    }
}

/// Heatmap plugin implementation
pub struct HeatmapPlugin {
    config: HeatmapConfig,
    points: Vec<LatLng>,
    cache: Option<HeatmapCache>,
    /// Number of grid rebuilds
    generated: usize,
}

impl HeatmapPlugin {
    pub fn new(points: Vec<LatLng>) -> Self {
        Self::with_config(HeatmapConfig::default(), points)
    }

    pub fn with_config(config: HeatmapConfig, points: Vec<LatLng>) -> Self {
        Self {
            config,
            points,
            cache: None,
            generated: 0,
        }
    }

    /// Aggregate `collection` and build the overlay from `options`
    pub fn from_collection(collection: &QuakeCollection, options: &HeatOptions) -> Result<Self> {
        let config = HeatmapConfig::from_options(options)?;
        Ok(Self::with_config(config, HeatAggregator::aggregate(collection)))
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Accumulated intensity at a viewport pixel
    pub fn intensity_at(&self, viewport: &Viewport, pixel: Point) -> f64 {
        let at = pixel.add(&viewport.origin());
        let index = self.project_points(viewport, (at, at));
        self.accumulate(&index, at)
    }

    /// Points in world pixels that can reach into the `area` rectangle
    fn project_points(&self, viewport: &Viewport, area: (Point, Point)) -> SpatialIndex<()> {
        let margin = self.config.radius;
        let items = self
            .points
            .iter()
            .map(|p| viewport.project(p))
            .filter(|p| {
                p.x >= area.0.x - margin
                    && p.y >= area.0.y - margin
                    && p.x <= area.1.x + margin
                    && p.y <= area.1.y + margin
            })
            .map(|p| SpatialItem::new(p, ()))
            .collect();
        SpatialIndex::bulk_load(items)
    }

    fn accumulate(&self, index: &SpatialIndex<()>, at: Point) -> f64 {
        let two_blur_sq = 2.0 * self.config.blur * self.config.blur;
        index
            .query_radius(at, self.config.radius)
            .iter()
            .map(|item| {
                let d = item.point.distance_to(&at);
                (-d * d / two_blur_sq).exp()
            })
            .sum()
    }

    /// Grid over the view plus half a view on every side, aligned to world
    /// pixels so that cells line up across pans
    fn generate(&self, viewport: &Viewport) -> HeatmapCache {
        let size = self.config.cell_size.max(1.0);
        let pad = viewport.size.multiply(0.5);
        let origin = viewport.origin();
        let snap = |v: f64| (v / size).floor() * size;
        let min = Point::new(snap(origin.x - pad.x), snap(origin.y - pad.y));
        let max = origin.add(&viewport.size).add(&pad);
        let covered = (min, max);

        HeatmapCache {
            zoom: viewport.zoom,
            covered,
            cells: self.generate_cells(viewport, covered, size),
        }
    }

    fn generate_cells(
        &self,
        viewport: &Viewport,
        covered: (Point, Point),
        size: f64,
    ) -> Vec<HeatCell> {
        let index = self.project_points(viewport, covered);
        if index.is_empty() {
            return Vec::new();
        }

        let cols = ((covered.1.x - covered.0.x) / size).ceil().max(0.0) as usize;
        let rows = ((covered.1.y - covered.0.y) / size).ceil().max(0.0) as usize;

        let mut cells = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                let min = covered.0.add(&Point::new(col as f64 * size, row as f64 * size));
                let center = min.add(&Point::new(size / 2.0, size / 2.0));
                let intensity = self.accumulate(&index, center);
                if let Some(color) = self.config.intensity_to_color(intensity) {
                    cells.push(HeatCell {
                        min,
                        max: min.add(&Point::new(size, size)),
                        color,
                    });
                }
            }
        }
        cells
    }
}

impl PluginTrait for HeatmapPlugin {
    fn name(&self) -> &str {
        "Heatmap"
    }

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        if self.points.is_empty() {
            return Ok(());
        }

        let stale = self
            .cache
            .as_ref()
            .map_or(true, |cache| !cache.covers(viewport));
        if stale {
            self.cache = Some(self.generate(viewport));
            self.generated += 1;
        }

        if let Some(cache) = &self.cache {
            let origin = viewport.origin();
            for cell in &cache.cells {
                let min = cell.min.subtract(&origin);
                let max = cell.max.subtract(&origin);
                let outside = max.x < 0.0
                    || max.y < 0.0
                    || min.x > viewport.size.x
                    || min.y > viewport.size.y;
                if outside {
                    continue;
                }
                context.render_cell(min, max, cell.color);
            }
        }
        Ok(())
    }
}

//! Map configuration.
//!
//! There is no configuration file. `MapConfig::default()` is built from the
//! literals in [`crate::core::constants`] and callers adjust it with the
//! `with_*` builders; the viewer binary overrides the tile access token from
//! its environment.

use crate::core::constants::*;
use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// One selectable base map style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStyle {
    /// Name shown in the layer control
    pub name: String,
    /// Mapbox style id, e.g. `mapbox/dark-v9`
    pub style: String,
}

impl BaseStyle {
    pub fn new(name: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: style.into(),
        }
    }
}

/// Heat overlay rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatOptions {
    /// Radius of influence per point, in pixels
    pub radius: f64,
    /// Intensity at which the gradient saturates
    pub max: f64,
    pub blur: f64,
    /// Gradient stops as (position in 0..=1, hex colour)
    pub gradient: Vec<(f64, String)>,
}

impl Default for HeatOptions {
    fn default() -> Self {
        Self {
            radius: HEAT_RADIUS,
            max: HEAT_MAX,
            blur: HEAT_BLUR,
            gradient: vec![
                (0.4, "#0000ff".to_string()),
                (0.65, "#00ff00".to_string()),
                (1.0, "#ff0000".to_string()),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub earthquake_feed_url: String,
    pub plate_boundaries_url: String,
    pub tile_url_template: String,
    pub access_token: String,
    /// Base styles in layer-control order; the first one starts active
    pub base_styles: Vec<BaseStyle>,
    pub center: LatLng,
    pub zoom: f64,
    pub scroll_wheel_zoom: bool,
    /// Keep the layer control expanded
    pub layer_control_expanded: bool,
    pub heat: HeatOptions,
    pub tile_cache_capacity: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            earthquake_feed_url: EARTHQUAKE_FEED_URL.to_string(),
            plate_boundaries_url: PLATE_BOUNDARIES_URL.to_string(),
            tile_url_template: MAPBOX_TILE_TEMPLATE.to_string(),
            access_token: String::new(),
            base_styles: vec![
                BaseStyle::new(STREET_MAP_NAME, STREET_STYLE),
                BaseStyle::new(DARK_MAP_NAME, DARK_STYLE),
            ],
            center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom: DEFAULT_ZOOM,
            scroll_wheel_zoom: false,
            layer_control_expanded: true,
            heat: HeatOptions::default(),
            tile_cache_capacity: TILE_CACHE_CAPACITY,
        }
    }
}

impl MapConfig {
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    pub fn with_feed_urls(
        mut self,
        earthquakes: impl Into<String>,
        plates: impl Into<String>,
    ) -> Self {
        self.earthquake_feed_url = earthquakes.into();
        self.plate_boundaries_url = plates.into();
        self
    }

    pub fn with_view(mut self, center: LatLng, zoom: f64) -> Self {
        self.center = center;
        self.zoom = zoom;
        self
    }

    pub fn with_scroll_wheel_zoom(mut self, enabled: bool) -> Self {
        self.scroll_wheel_zoom = enabled;
        self
    }

    pub fn with_heat(mut self, heat: HeatOptions) -> Self {
        self.heat = heat;
        self
    }
}

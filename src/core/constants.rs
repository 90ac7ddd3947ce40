//! Literal endpoints and defaults of the earthquake map.
//! Everything the viewer needs to start lives here; `MapConfig::default()`
//! is assembled from these values.

/// USGS summary feed: all events of the past week.
pub const EARTHQUAKE_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";

/// PB2002 plate boundary dataset.
pub const PLATE_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// Mapbox static styles tile endpoint. `{style}`, `{z}`, `{x}`, `{y}` and
/// `{token}` are substituted per request.
pub const MAPBOX_TILE_TEMPLATE: &str =
    "https://api.mapbox.com/styles/v1/{style}/tiles/256/{z}/{x}/{y}?access_token={token}";

pub const STREET_STYLE: &str = "mapbox/outdoors-v10";
pub const DARK_STYLE: &str = "mapbox/dark-v9";

pub const STREET_MAP_NAME: &str = "Street Map";
pub const DARK_MAP_NAME: &str = "Dark Map";
pub const EARTHQUAKES_NAME: &str = "Earthquakes";
pub const TECTONIC_PLATES_NAME: &str = "Tectonic Plates";

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Initial map center (contiguous United States).
pub const DEFAULT_CENTER: (f64, f64) = (37.09, -95.71);
pub const DEFAULT_ZOOM: f64 = 5.0;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 18.0;

/// Largest latitude representable in Web Mercator.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Plate boundary stroke.
pub const PLATE_COLOR: (u8, u8, u8) = (255, 165, 0);
pub const PLATE_WEIGHT: f32 = 2.0;

/// Heat overlay options.
pub const HEAT_RADIUS: f64 = 75.0;
pub const HEAT_MAX: f64 = 1.0;
pub const HEAT_BLUR: f64 = 15.0;

/// Number of decoded tiles kept per base layer.
pub const TILE_CACHE_CAPACITY: usize = 512;

/// Attribution shown in the bottom-left corner.
pub const ATTRIBUTION: &str = "© Mapbox © OpenStreetMap | Data: USGS, PB2002";

/// User agent sent with every HTTP request.
pub const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

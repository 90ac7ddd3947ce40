use crate::core::constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point, TileCoord};
use serde::{Deserialize, Serialize};

/// Current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center: LatLng::new(LatLng::clamp_lat(center.lat), center.lng),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng);
    }

    /// Sets the zoom level, clamping to the allowed range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Width of the whole world in pixels at the given zoom
    pub fn world_size(zoom: f64) -> f64 {
        TILE_SIZE as f64 * 2_f64.powf(zoom)
    }

    /// Projects a coordinate to world pixels at the current zoom
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        lat_lng
            .to_unit_mercator()
            .multiply(Self::world_size(self.zoom))
    }

    /// Inverse of [`Viewport::project`]
    pub fn unproject(&self, pixel: &Point) -> LatLng {
        LatLng::from_unit_mercator(pixel.multiply(1.0 / Self::world_size(self.zoom)))
    }

    fn half_size(&self) -> Point {
        self.size.multiply(0.5)
    }

    /// World pixel under the top-left corner of the viewport
    pub fn origin(&self) -> Point {
        self.project(&self.center).subtract(&self.half_size())
    }

    /// Converts a coordinate to pixels relative to the top-left corner of
    /// the viewport
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng)
            .subtract(&self.project(&self.center))
            .add(&self.half_size())
    }

    /// Converts a viewport-relative pixel back to a coordinate
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let world = pixel
            .subtract(&self.half_size())
            .add(&self.project(&self.center));
        self.unproject(&world)
    }

    /// Moves the view by a screen-space delta, as when dragging the map
    pub fn pan_by(&mut self, delta: Point) {
        let center_px = self.project(&self.center).subtract(&delta);
        let mut center = self.unproject(&center_px);
        center.lng = wrap_lng(center.lng);
        self.set_center(center);
    }

    /// Geographic bounds of the visible area
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&self.size);
        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Integer zoom used to pick tiles
    pub fn tile_zoom(&self) -> u8 {
        self.zoom.round().clamp(0.0, MAX_ZOOM) as u8
    }

    /// Tiles covering the viewport, each with its screen rectangle (min, max)
    /// relative to the viewport's top-left corner.
    pub fn visible_tiles(&self) -> Vec<(TileCoord, (Point, Point))> {
        let z = self.tile_zoom();
        let scale = 2_f64.powf(self.zoom - z as f64);
        let tile_px = TILE_SIZE as f64 * scale;

        let top_left = self.origin();
        let bottom_right = top_left.add(&self.size);

        let min_x = (top_left.x / tile_px).floor() as i64;
        let min_y = (top_left.y / tile_px).floor() as i64;
        let max_x = (bottom_right.x / tile_px).floor() as i64;
        let max_y = (bottom_right.y / tile_px).floor() as i64;

        let mut tiles = Vec::new();
        for ty in min_y..=max_y {
            for tx in min_x..=max_x {
                if let Some(coord) = TileCoord::wrapped(tx, ty, z) {
                    let min = Point::new(tx as f64 * tile_px, ty as f64 * tile_px)
                        .subtract(&top_left);
                    let max = min.add(&Point::new(tile_px, tile_px));
                    tiles.push((coord, (min, max)));
                }
            }
        }
        tiles
    }
}

fn wrap_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

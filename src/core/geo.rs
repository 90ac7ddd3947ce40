use crate::core::constants::MAX_LATITUDE;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a coordinate from a GeoJSON position, which is ordered
    /// longitude first.
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] => Some(Self::new(*lat, *lng)),
            _ => None,
        }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Clamps latitude to the Web Mercator range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Projects into normalized Web Mercator space where the whole world is
    /// the unit square, x growing east and y growing south.
    pub fn to_unit_mercator(&self) -> Point {
        let lat_rad = Self::clamp_lat(self.lat).to_radians();
        let x = (self.lng + 180.0) / 360.0;
        let y = (1.0 - (PI / 4.0 + lat_rad / 2.0).tan().ln() / PI) / 2.0;
        Point::new(x, y)
    }

    /// Inverse of [`LatLng::to_unit_mercator`]
    pub fn from_unit_mercator(point: Point) -> Self {
        let lng = point.x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * point.y)).sinh().atan().to_degrees();
        Self::new(lat, lng)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Geographic bounding box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn from_point(point: LatLng) -> Self {
        Self::new(point, point)
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    pub fn intersects(&self, other: &LatLngBounds) -> bool {
        !(other.north_east.lat < self.south_west.lat
            || other.south_west.lat > self.north_east.lat
            || other.north_east.lng < self.south_west.lng
            || other.south_west.lng > self.north_east.lng)
    }

    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Smallest bounds covering every point, `None` for an empty iterator
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(*iter.next()?);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }
}

/// Slippy map tile address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles along one axis at this zoom
    pub fn tiles_per_axis(z: u8) -> u32 {
        1u32 << z.min(31)
    }

    /// Wraps a possibly out-of-range column onto the world and rejects rows
    /// beyond the poles.
    pub fn wrapped(x: i64, y: i64, z: u8) -> Option<Self> {
        let n = Self::tiles_per_axis(z) as i64;
        if y < 0 || y >= n {
            return None;
        }
        Some(Self::new(x.rem_euclid(n) as u32, y as u32, z))
    }

    pub fn is_valid(&self) -> bool {
        let n = Self::tiles_per_axis(self.z);
        self.x < n && self.y < n
    }
}

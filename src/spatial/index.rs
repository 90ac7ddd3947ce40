use crate::core::geo::{LatLng, Point};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A point item indexed in normalized Web Mercator space, so distances are
/// proportional to screen distances at any zoom.
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    pub point: Point,
    pub data: T,
}

impl<T> SpatialItem<T> {
    pub fn new(point: Point, data: T) -> Self {
        Self { point, data }
    }

    pub fn from_lat_lng(lat_lng: LatLng, data: T) -> Self {
        Self::new(lat_lng.to_unit_mercator(), data)
    }
}

// --- rstar integration -------------------------------------------------------------------------

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.x, self.point.y])
    }
}

impl<T> PointDistance for SpatialItem<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point.x - point[0];
        let dy = self.point.y - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree of point items
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
}

impl<T> SpatialIndex<T> {
    pub fn new() -> Self {
        Self {
            rtree: RTree::new(),
        }
    }

    pub fn bulk_load(items: Vec<SpatialItem<T>>) -> Self {
        Self {
            rtree: RTree::bulk_load(items),
        }
    }

    pub fn insert(&mut self, item: SpatialItem<T>) {
        self.rtree.insert(item);
    }

    /// Items ordered by increasing distance from `point`
    pub fn nearest_iter(&self, point: Point) -> impl Iterator<Item = &SpatialItem<T>> {
        self.rtree.nearest_neighbor_iter(&[point.x, point.y])
    }

    /// Items within `radius` of `point` (same units as the indexed points)
    pub fn query_radius(&self, point: Point, radius: f64) -> Vec<&SpatialItem<T>> {
        self.rtree
            .locate_within_distance([point.x, point.y], radius * radius)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

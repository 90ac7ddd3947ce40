pub mod geojson;

pub use geojson::{
    BoundaryCollection, BoundaryFeature, BoundaryGeometry, QuakeCollection, QuakeFeature,
    QuakeGeometry, QuakeProperties,
};

//! Raster base layers
//!
//! A [`TileLayer`] draws one Mapbox style. Missing tiles are requested from
//! the [`TileLoader`], which downloads and decodes them in the background;
//! decoded tiles are uploaded as egui textures on the UI thread and kept in
//! an LRU cache.

pub mod layer;
pub mod loader;
pub mod source;

pub use layer::TileLayer;
pub use loader::{DecodedTile, TileLoader, TileResult};
pub use source::{MapboxStyleSource, TileSource};

//! Everything the layer control can switch: raster base layers, the
//! earthquake markers and the plate boundaries.

pub mod base;
#[macro_use]
pub mod macros;
pub mod marker;
pub mod registry;
pub mod tile;
pub mod vector;

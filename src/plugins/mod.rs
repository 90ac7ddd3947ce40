//! Map additions drawn outside the layer registry
pub mod base;
pub mod heatmap;

pub use base::PluginTrait;
pub use heatmap::{HeatAggregator, HeatmapConfig, HeatmapPlugin};

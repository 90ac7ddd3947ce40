pub mod context;

pub use context::{DrawCommand, LineRenderStyle, PointRenderStyle, RenderContext};

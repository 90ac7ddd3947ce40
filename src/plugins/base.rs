use crate::{core::viewport::Viewport, rendering::context::RenderContext, Result};

/// Something drawn on the map that is not toggled from the layer control
pub trait PluginTrait: Send + Sync {
    fn name(&self) -> &str;

    fn is_visible(&self) -> bool {
        true
    }

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()>;
}

use crate::{
    core::viewport::Viewport, layers::base::LayerTrait, prelude::HashMap,
    rendering::context::RenderContext, MapError, Result,
};

/// Which partition of the registry a layer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerGroup {
    /// Mutually exclusive background layers
    Base,
    /// Independently toggleable layers drawn over the base
    Overlay,
}

/// Display name to layer, partitioned into base layers and overlays.
///
/// Exactly one base layer is active once any is registered. Overlays are
/// drawn over the active base layer in registration order.
pub struct LayerRegistry {
    /// All layers indexed by display name
    layers: HashMap<String, Box<dyn LayerTrait>>,
    base: Vec<String>,
    overlays: Vec<String>,
    active_base: Option<String>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            base: Vec::new(),
            overlays: Vec::new(),
            active_base: None,
        }
    }

    fn insert(&mut self, layer: Box<dyn LayerTrait>) -> Result<String> {
        let name = layer.name().to_string();
        if self.layers.contains_key(&name) {
            return Err(MapError::Layer(format!("layer '{}' already registered", name)));
        }
        self.layers.insert(name.clone(), layer);
        Ok(name)
    }

    /// Registers a base layer. The first one registered becomes active.
    pub fn add_base(&mut self, mut layer: Box<dyn LayerTrait>) -> Result<()> {
        let first = self.active_base.is_none();
        layer.set_visible(first);
        let name = self.insert(layer)?;
        if first {
            self.active_base = Some(name.clone());
        }
        self.base.push(name);
        Ok(())
    }

    pub fn add_overlay(&mut self, mut layer: Box<dyn LayerTrait>, visible: bool) -> Result<()> {
        layer.set_visible(visible);
        let name = self.insert(layer)?;
        self.overlays.push(name);
        Ok(())
    }

    /// Makes `name` the active base layer and hides every other base layer
    pub fn select_base(&mut self, name: &str) -> Result<()> {
        if !self.base.iter().any(|b| b == name) {
            return Err(MapError::Layer(format!("no base layer named '{}'", name)));
        }
        for base in &self.base {
            if let Some(layer) = self.layers.get_mut(base) {
                layer.set_visible(base == name);
            }
        }
        self.active_base = Some(name.to_string());
        Ok(())
    }

    pub fn set_overlay_visible(&mut self, name: &str, visible: bool) -> Result<()> {
        if !self.overlays.iter().any(|o| o == name) {
            return Err(MapError::Layer(format!("no overlay named '{}'", name)));
        }
        if let Some(layer) = self.layers.get_mut(name) {
            layer.set_visible(visible);
        }
        Ok(())
    }

    /// Flips an overlay and returns its new visibility
    pub fn toggle_overlay(&mut self, name: &str) -> Result<bool> {
        let visible = !self.is_overlay_visible(name);
        self.set_overlay_visible(name, visible)?;
        Ok(visible)
    }

    pub fn is_overlay_visible(&self, name: &str) -> bool {
        self.overlays.iter().any(|o| o == name)
            && self.layers.get(name).is_some_and(|l| l.is_visible())
    }

    pub fn active_base(&self) -> Option<&str> {
        self.active_base.as_deref()
    }

    pub fn base_names(&self) -> &[String] {
        &self.base
    }

    pub fn overlay_names(&self) -> &[String] {
        &self.overlays
    }

    pub fn group_of(&self, name: &str) -> Option<LayerGroup> {
        if self.base.iter().any(|b| b == name) {
            Some(LayerGroup::Base)
        } else if self.overlays.iter().any(|o| o == name) {
            Some(LayerGroup::Overlay)
        } else {
            None
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(name).map(|l| l.as_ref())
    }

    /// Concrete access to a registered layer
    pub fn get_as<T: 'static>(&self, name: &str) -> Option<&T> {
        self.layers.get(name)?.as_any().downcast_ref::<T>()
    }

    pub fn get_as_mut<T: 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.layers.get_mut(name)?.as_any_mut().downcast_mut::<T>()
    }

    /// Names in draw order: bases first, then overlays
    fn render_order(&self) -> impl Iterator<Item = &String> {
        self.base.iter().chain(self.overlays.iter())
    }

    /// Applies a function to each layer mutably in draw order
    pub fn for_each_layer_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut dyn LayerTrait),
    {
        let order: Vec<String> = self.render_order().cloned().collect();
        for name in order {
            if let Some(layer) = self.layers.get_mut(&name) {
                f(layer.as_mut());
            }
        }
    }

    /// Renders every visible layer that intersects the viewport
    pub fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let viewport_bounds = viewport.bounds();
        let order: Vec<String> = self.render_order().cloned().collect();

        for name in order {
            if let Some(layer) = self.layers.get_mut(&name) {
                if layer.is_visible() && layer.intersects_bounds(&viewport_bounds) {
                    layer.render(context, viewport)?;
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! egui front end: the map widget and the controls drawn over it

pub mod controls;
pub mod legend;
pub mod popup;
pub mod widget;

pub use controls::{LayerChange, LayerControl, Position};
pub use legend::{Legend, LegendEntry};
pub use popup::{Popup, PopupStyle};
pub use widget::MapWidget;

/// Extension for adding the map widget to a `Ui`
pub trait UiMapExt {
    fn quake_map(&mut self, map: &mut crate::core::map::QuakeMap) -> egui::Response;
}

impl UiMapExt for egui::Ui {
    fn quake_map(&mut self, map: &mut crate::core::map::QuakeMap) -> egui::Response {
        self.add(MapWidget::new(map))
    }
}

use crate::{
    layers::registry::{LayerGroup, LayerRegistry},
    Result,
};
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};

/// Corner of the map a control is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Position {
    pub fn calculate_rect(&self, container: Rect, size: Vec2, margin: f32) -> Rect {
        let min = match self {
            Position::TopLeft => container.min + Vec2::splat(margin),
            Position::TopRight => Pos2::new(
                container.max.x - margin - size.x,
                container.min.y + margin,
            ),
            Position::BottomLeft => Pos2::new(
                container.min.x + margin,
                container.max.y - margin - size.y,
            ),
            Position::BottomRight => container.max - Vec2::splat(margin) - size,
        };
        Rect::from_min_size(min, size)
    }
}

/// A user action on the layer control
#[derive(Debug, Clone, PartialEq)]
pub enum LayerChange {
    SelectBase(String),
    SetOverlay(String, bool),
}

impl LayerChange {
    pub fn apply(&self, registry: &mut LayerRegistry) -> Result<()> {
        match self {
            LayerChange::SelectBase(name) => registry.select_base(name),
            LayerChange::SetOverlay(name, visible) => registry.set_overlay_visible(name, *visible),
        }
    }
}

/// One line of the layer control
#[derive(Debug, Clone, PartialEq)]
pub struct ControlRow {
    pub name: String,
    pub group: LayerGroup,
    /// Radio selected or checkbox ticked
    pub checked: bool,
}

impl ControlRow {
    /// The change a click on this row requests, if any. Clicking the active
    /// base layer does nothing.
    pub fn click(&self) -> Option<LayerChange> {
        match self.group {
            LayerGroup::Base if self.checked => None,
            LayerGroup::Base => Some(LayerChange::SelectBase(self.name.clone())),
            LayerGroup::Overlay => Some(LayerChange::SetOverlay(self.name.clone(), !self.checked)),
        }
    }
}

const ROW_HEIGHT: f32 = 22.0;
const CONTROL_WIDTH: f32 = 150.0;
const SEPARATOR: f32 = 9.0;
const PADDING: f32 = 6.0;

/// Layer switcher: radio buttons for base layers, checkboxes for overlays
#[derive(Debug, Clone)]
pub struct LayerControl {
    pub expanded: bool,
    pub position: Position,
    pub margin: f32,
}

impl LayerControl {
    pub fn new(expanded: bool) -> Self {
        Self {
            expanded,
            position: Position::TopRight,
            margin: 10.0,
        }
    }

    /// Base rows first, then overlay rows, each in registration order
    pub fn rows(&self, registry: &LayerRegistry) -> Vec<ControlRow> {
        let active = registry.active_base();
        let bases = registry.base_names().iter().map(|name| ControlRow {
            name: name.clone(),
            group: LayerGroup::Base,
            checked: active == Some(name.as_str()),
        });
        let overlays = registry.overlay_names().iter().map(|name| ControlRow {
            name: name.clone(),
            group: LayerGroup::Overlay,
            checked: registry.is_overlay_visible(name),
        });
        bases.chain(overlays).collect()
    }

    /// Draw the control and return its screen rect plus the change the user
    /// clicked this frame
    pub fn show(
        &mut self,
        ui: &mut Ui,
        map_rect: Rect,
        registry: &LayerRegistry,
    ) -> (Rect, Option<LayerChange>) {
        let painter = ui.painter().clone();

        if !self.expanded {
            let rect = self
                .position
                .calculate_rect(map_rect, Vec2::splat(36.0), self.margin);
            paint_panel(&painter, rect);
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "☰",
                FontId::proportional(18.0),
                Color32::from_gray(60),
            );
            if ui.allocate_rect(rect, Sense::click()).clicked() {
                self.expanded = true;
            }
            return (rect, None);
        }

        let rows = self.rows(registry);
        let has_separator =
            !registry.base_names().is_empty() && !registry.overlay_names().is_empty();
        let height = rows.len() as f32 * ROW_HEIGHT
            + if has_separator { SEPARATOR } else { 0.0 }
            + PADDING * 2.0;
        let rect = self
            .position
            .calculate_rect(map_rect, Vec2::new(CONTROL_WIDTH, height), self.margin);
        paint_panel(&painter, rect);

        let mut change = None;
        let mut y = rect.min.y + PADDING;
        let mut previous_group = None;

        for row in &rows {
            if previous_group == Some(LayerGroup::Base) && row.group == LayerGroup::Overlay {
                let mid = y + SEPARATOR / 2.0;
                painter.hline(
                    (rect.min.x + PADDING)..=(rect.max.x - PADDING),
                    mid,
                    Stroke::new(1.0, Color32::from_gray(210)),
                );
                y += SEPARATOR;
            }
            previous_group = Some(row.group);

            let row_rect = Rect::from_min_size(
                Pos2::new(rect.min.x + PADDING, y),
                Vec2::new(CONTROL_WIDTH - PADDING * 2.0, ROW_HEIGHT),
            );
            paint_row(&painter, row_rect, row);
            if ui.allocate_rect(row_rect, Sense::click()).clicked() {
                change = row.click();
            }
            y += ROW_HEIGHT;
        }

        (rect, change)
    }
}

impl Default for LayerControl {
    fn default() -> Self {
        Self::new(true)
    }
}

pub(crate) fn paint_panel(painter: &egui::Painter, rect: Rect) {
    painter.rect_filled(rect, 5.0, Color32::from_rgba_unmultiplied(255, 255, 255, 230));
    painter.rect_stroke(rect, 5.0, Stroke::new(1.0, Color32::from_gray(170)));
}

fn paint_row(painter: &egui::Painter, rect: Rect, row: &ControlRow) {
    let mark_center = Pos2::new(rect.min.x + 8.0, rect.center().y);
    let ink = Color32::from_gray(60);

    match row.group {
        LayerGroup::Base => {
            painter.circle_stroke(mark_center, 6.0, Stroke::new(1.0, ink));
            if row.checked {
                painter.circle_filled(mark_center, 3.5, ink);
            }
        }
        LayerGroup::Overlay => {
            let mark = Rect::from_center_size(mark_center, Vec2::splat(12.0));
            painter.rect_stroke(mark, 2.0, Stroke::new(1.0, ink));
            if row.checked {
                painter.text(
                    mark_center,
                    Align2::CENTER_CENTER,
                    "✔",
                    FontId::proportional(11.0),
                    ink,
                );
            }
        }
    }

    painter.text(
        Pos2::new(rect.min.x + 22.0, rect.center().y),
        Align2::LEFT_CENTER,
        &row.name,
        FontId::proportional(13.0),
        Color32::BLACK,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::vector::PlateLayerGroup;

    fn registry() -> LayerRegistry {
        let mut registry = LayerRegistry::new();
        for name in ["Street Map", "Dark Map"] {
            registry
                .add_base(Box::new(PlateLayerGroup::new(name.into(), name.into())))
                .unwrap();
        }
        registry
            .add_overlay(Box::new(PlateLayerGroup::new("q".into(), "Earthquakes".into())), true)
            .unwrap();
        registry
            .add_overlay(
                Box::new(PlateLayerGroup::new("p".into(), "Tectonic Plates".into())),
                false,
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_rows_reflect_registry() {
        let control = LayerControl::default();
        let rows = control.rows(&registry());
        let checked: Vec<_> = rows.iter().map(|r| (r.name.as_str(), r.checked)).collect();
        assert_eq!(
            checked,
            vec![
                ("Street Map", true),
                ("Dark Map", false),
                ("Earthquakes", true),
                ("Tectonic Plates", false)
            ]
        );
    }

    #[test]
    fn test_row_clicks() {
        let mut registry = registry();
        let control = LayerControl::default();
        let rows = control.rows(&registry);

        assert_eq!(rows[0].click(), None);
        let select_dark = rows[1].click().unwrap();
        assert_eq!(select_dark, LayerChange::SelectBase("Dark Map".into()));
        select_dark.apply(&mut registry).unwrap();
        assert_eq!(registry.active_base(), Some("Dark Map"));

        let show_plates = rows[3].click().unwrap();
        assert_eq!(show_plates, LayerChange::SetOverlay("Tectonic Plates".into(), true));
        show_plates.apply(&mut registry).unwrap();
        assert!(registry.is_overlay_visible("Tectonic Plates"));
        assert!(registry.is_overlay_visible("Earthquakes"));
    }

    #[test]
    fn test_corner_rects() {
        let container = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let size = Vec2::new(100.0, 50.0);
        let top_right = Position::TopRight.calculate_rect(container, size, 10.0);
        assert_eq!(top_right.min, Pos2::new(690.0, 10.0));
        let bottom_right = Position::BottomRight.calculate_rect(container, size, 10.0);
        assert_eq!(bottom_right.max, Pos2::new(790.0, 590.0));
        let bottom_left = Position::BottomLeft.calculate_rect(container, size, 10.0);
        assert_eq!(bottom_left.min, Pos2::new(10.0, 540.0));
    }
}

use crate::{
    core::{geo::LatLng, viewport::Viewport},
    layers::marker::CircleMarker,
};
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct PopupStyle {
    pub background_color: Color32,
    pub border_color: Color32,
    pub border_width: f32,
    pub rounding: f32,
    pub padding: f32,
    pub font_id: FontId,
    pub text_color: Color32,
    pub max_width: f32,
    /// Gap between the anchor and the bottom of the popup
    pub offset: f32,
}

impl Default for PopupStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::WHITE,
            border_color: Color32::GRAY,
            border_width: 1.0,
            rounding: 4.0,
            padding: 8.0,
            font_id: FontId::proportional(12.0),
            text_color: Color32::BLACK,
            max_width: 300.0,
            offset: 10.0,
        }
    }
}

/// Text bubble anchored to a marker
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub marker_id: String,
    pub position: LatLng,
    pub content: String,
    pub style: PopupStyle,
}

impl Popup {
    pub fn for_marker(marker: &CircleMarker) -> Self {
        Self {
            marker_id: marker.id.clone(),
            position: marker.position,
            content: marker.popup.clone(),
            style: PopupStyle::default(),
        }
    }

    /// Paint above the anchor. Returns the popup rect and whether it was
    /// clicked, which closes it.
    pub fn show(&self, ui: &mut Ui, map_rect: Rect, viewport: &Viewport) -> (Rect, bool) {
        let anchor = viewport.lat_lng_to_pixel(&self.position);
        let anchor = map_rect.min + Vec2::new(anchor.x as f32, anchor.y as f32);

        let galley = ui.fonts(|f| {
            f.layout(
                self.content.clone(),
                self.style.font_id.clone(),
                self.style.text_color,
                self.style.max_width,
            )
        });
        let size = galley.size() + Vec2::splat(self.style.padding * 2.0);
        let rect = Rect::from_min_size(
            Pos2::new(anchor.x - size.x / 2.0, anchor.y - self.style.offset - size.y),
            size,
        );

        let painter = ui.painter().clone();
        painter.rect_filled(rect, self.style.rounding, self.style.background_color);
        painter.rect_stroke(
            rect,
            self.style.rounding,
            Stroke::new(self.style.border_width, self.style.border_color),
        );
        painter.galley(rect.min + Vec2::splat(self.style.padding), galley, self.style.text_color);
        painter.text(
            Pos2::new(anchor.x, rect.max.y + self.style.offset / 2.0),
            Align2::CENTER_CENTER,
            "▼",
            FontId::proportional(10.0),
            self.style.background_color,
        );

        let clicked = ui.allocate_rect(rect, Sense::click()).clicked();
        (rect, clicked)
    }
}

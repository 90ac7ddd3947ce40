use crate::{
    core::{constants::ATTRIBUTION, geo::Point, map::QuakeMap},
    rendering::context::{DrawCommand, RenderContext},
};
use egui::{Align2, Color32, FontId, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2, Widget};
use std::time::Duration;

/// Scroll wheel points per zoom level, when wheel zoom is enabled
const SCROLL_ZOOM_SPEED: f64 = 0.005;

/// The map drawn into the available space of a `Ui`.
///
/// Drag pans, the `+`/`−` buttons zoom by one level, pinch zooms, and the
/// wheel zooms only when the map config allows it. Clicking a marker opens
/// its popup.
pub struct MapWidget<'a> {
    map: &'a mut QuakeMap,
    show_zoom_controls: bool,
    show_attribution: bool,
}

impl<'a> MapWidget<'a> {
    pub fn new(map: &'a mut QuakeMap) -> Self {
        Self {
            map,
            show_zoom_controls: true,
            show_attribution: true,
        }
    }

    pub fn zoom_controls(mut self, show: bool) -> Self {
        self.show_zoom_controls = show;
        self
    }

    pub fn attribution(mut self, show: bool) -> Self {
        self.show_attribution = show;
        self
    }
}

fn to_screen(rect: Rect, point: &Point) -> Pos2 {
    rect.min + Vec2::new(point.x as f32, point.y as f32)
}

fn tile_rect(rect: Rect, bounds: &(Point, Point)) -> Rect {
    Rect::from_two_pos(to_screen(rect, &bounds.0), to_screen(rect, &bounds.1))
}

fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let [r, g, b, a] = color.to_array();
    Color32::from_rgba_unmultiplied(r, g, b, (a as f32 * opacity.clamp(0.0, 1.0)) as u8)
}

/// Replay one frame of draw commands onto the painter
fn paint_queue(painter: &egui::Painter, rect: Rect, queue: &[DrawCommand]) {
    for command in queue {
        match command {
            DrawCommand::TilePlaceholder { bounds } => {
                let tile = tile_rect(rect, bounds);
                painter.rect_filled(tile, 0.0, Color32::from_gray(221));
                painter.rect_stroke(tile, 0.0, Stroke::new(0.5, Color32::from_gray(200)));
            }
            DrawCommand::TileTextured {
                texture_id,
                bounds,
                opacity,
            } => {
                let tile = tile_rect(rect, bounds);
                painter.image(
                    *texture_id,
                    tile,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE.gamma_multiply(*opacity),
                );
            }
            DrawCommand::Point { position, style } => {
                painter.circle(
                    to_screen(rect, position),
                    style.radius,
                    with_opacity(style.fill_color, style.fill_opacity),
                    Stroke::new(style.stroke_width, style.stroke_color),
                );
            }
            DrawCommand::Line { points, style } => {
                let points = points.iter().map(|p| to_screen(rect, p)).collect();
                painter.add(egui::Shape::line(
                    points,
                    Stroke::new(style.width, with_opacity(style.color, style.opacity)),
                ));
            }
            DrawCommand::Cell { min, max, color } => {
                painter.rect_filled(
                    Rect::from_min_max(to_screen(rect, min), to_screen(rect, max)),
                    0.0,
                    *color,
                );
            }
        }
    }
}

fn paint_button(painter: &egui::Painter, rect: Rect, label: &str) {
    painter.rect_filled(rect, 3.0, Color32::from_rgba_unmultiplied(255, 255, 255, 220));
    painter.rect_stroke(rect, 3.0, Stroke::new(1.0, Color32::from_gray(100)));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        label,
        FontId::proportional(16.0),
        Color32::BLACK,
    );
}

impl Widget for MapWidget<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let map = self.map;
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        map.set_size(rect.width() as f64, rect.height() as f64);

        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.0 {
                map.pan_by(Point::new(delta.x as f64, delta.y as f64));
            }
        }

        if response.hovered() {
            // Touch only; zoom_delta() would also report ctrl+wheel
            let pinch = ui.input(|i| i.multi_touch().map_or(1.0, |touch| touch.zoom_delta));
            if (pinch - 1.0).abs() > f32::EPSILON {
                map.zoom_by((pinch as f64).log2());
            }
            if map.config().scroll_wheel_zoom {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll.abs() > 0.1 {
                    map.zoom_by(scroll as f64 * SCROLL_ZOOM_SPEED);
                }
            }
        }

        let mut blocked: Vec<Rect> = Vec::new();

        let zoom_rects = self.show_zoom_controls.then(|| {
            let zoom_in = Rect::from_min_size(rect.min + Vec2::new(10.0, 10.0), Vec2::splat(30.0));
            (zoom_in, zoom_in.translate(Vec2::new(0.0, 35.0)))
        });
        if let Some((zoom_in, zoom_out)) = zoom_rects {
            if ui.allocate_rect(zoom_in, Sense::click()).clicked() {
                map.zoom_by(1.0);
            }
            if ui.allocate_rect(zoom_out, Sense::click()).clicked() {
                map.zoom_by(-1.0);
            }
            blocked.extend([zoom_in, zoom_out]);
        }

        map.process_downloads(ui.ctx());

        let mut context =
            RenderContext::new(rect.width().max(0.0) as u32, rect.height().max(0.0) as u32);
        if let Err(e) = map.render(&mut context) {
            log::error!("map render failed: {}", e);
        }
        let painter = ui.painter_at(rect);
        paint_queue(&painter, rect, context.get_drawing_queue());

        if let Some((zoom_in, zoom_out)) = zoom_rects {
            paint_button(&painter, zoom_in, "+");
            paint_button(&painter, zoom_out, "−");
        }

        blocked.push(map.legend().show(ui, rect));

        let mut control = map.layer_control().clone();
        let (control_rect, change) = control.show(ui, rect, map.registry());
        *map.layer_control_mut() = control;
        blocked.push(control_rect);
        if let Some(change) = change {
            if let Err(e) = map.apply_layer_change(&change) {
                log::error!("layer change {:?} failed: {}", change, e);
            }
        }

        if let Some(popup) = map.popup().cloned() {
            let (popup_rect, clicked) = popup.show(ui, rect, map.viewport());
            blocked.push(popup_rect);
            if clicked {
                map.close_popup();
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if !blocked.iter().any(|r| r.contains(pos)) {
                    let local = pos - rect.min;
                    map.click_at(Point::new(local.x as f64, local.y as f64));
                }
            }
        }

        if self.show_attribution {
            painter.text(
                rect.left_bottom() + Vec2::new(5.0, -5.0),
                Align2::LEFT_BOTTOM,
                ATTRIBUTION,
                FontId::proportional(10.0),
                Color32::from_gray(90),
            );
        }

        if map.has_pending_tiles() {
            ui.ctx().request_repaint_after(Duration::from_millis(100));
        }

        response
    }
}

use crate::core::geo::Point;
use egui::Color32;

/// Styles for circle markers and heat cells
#[derive(Debug, Clone, PartialEq)]
pub struct PointRenderStyle {
    pub fill_color: Color32,
    pub stroke_color: Color32,
    pub stroke_width: f32,
    pub radius: f32,
    pub fill_opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineRenderStyle {
    pub color: Color32,
    pub width: f32,
    pub opacity: f32,
}

/// Commands that can be issued to the render context. Positions are in
/// pixels relative to the top-left corner of the map.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Point {
        position: Point,
        style: PointRenderStyle,
    },
    Line {
        points: Vec<Point>,
        style: LineRenderStyle,
    },
    /// Axis-aligned filled square, used by the heat overlay
    Cell {
        min: Point,
        max: Point,
        color: Color32,
    },
    /// Tile that already lives in an egui texture
    TileTextured {
        texture_id: egui::TextureId,
        bounds: (Point, Point),
        opacity: f32,
    },
    /// Tile not downloaded yet
    TilePlaceholder { bounds: (Point, Point) },
}

/// Collects draw commands for one frame. Layers push into it; the map
/// widget replays the queue onto an egui painter.
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    drawing_queue: Vec<DrawCommand>,
}

impl RenderContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
        }
    }

    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
    }

    /// Whether a circle at `position` could touch the visible area
    pub fn is_visible(&self, position: &Point, radius: f64) -> bool {
        let r = radius.abs();
        position.x + r >= 0.0
            && position.y + r >= 0.0
            && position.x - r <= self.width as f64
            && position.y - r <= self.height as f64
    }

    pub fn render_point(&mut self, position: &Point, style: &PointRenderStyle) {
        if self.is_visible(position, style.radius as f64) {
            self.drawing_queue.push(DrawCommand::Point {
                position: *position,
                style: style.clone(),
            });
        }
    }

    pub fn render_line(&mut self, points: &[Point], style: &LineRenderStyle) {
        if points.len() >= 2 {
            self.drawing_queue.push(DrawCommand::Line {
                points: points.to_vec(),
                style: style.clone(),
            });
        }
    }

    pub fn render_cell(&mut self, min: Point, max: Point, color: Color32) {
        self.drawing_queue.push(DrawCommand::Cell { min, max, color });
    }

    pub fn render_tile_textured(
        &mut self,
        texture_id: egui::TextureId,
        bounds: (Point, Point),
        opacity: f32,
    ) {
        self.drawing_queue.push(DrawCommand::TileTextured {
            texture_id,
            bounds,
            opacity,
        });
    }

    pub fn render_tile_placeholder(&mut self, bounds: (Point, Point)) {
        self.drawing_queue.push(DrawCommand::TilePlaceholder { bounds });
    }

    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(radius: f32) -> PointRenderStyle {
        PointRenderStyle {
            fill_color: Color32::RED,
            stroke_color: Color32::RED,
            stroke_width: 1.0,
            radius,
            fill_opacity: 0.5,
        }
    }

    #[test]
    fn test_offscreen_points_are_culled() {
        let mut ctx = RenderContext::new(100, 100);
        ctx.render_point(&Point::new(50.0, 50.0), &style(5.0));
        ctx.render_point(&Point::new(-20.0, 50.0), &style(5.0));
        ctx.render_point(&Point::new(-3.0, 50.0), &style(5.0));
        assert_eq!(ctx.get_drawing_queue().len(), 2);
    }

    #[test]
    fn test_degenerate_lines_are_skipped() {
        let mut ctx = RenderContext::new(100, 100);
        let line = LineRenderStyle {
            color: Color32::WHITE,
            width: 2.0,
            opacity: 1.0,
        };
        ctx.render_line(&[Point::new(0.0, 0.0)], &line);
        ctx.render_line(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)], &line);
        assert_eq!(ctx.get_drawing_queue().len(), 1);

        ctx.begin_frame();
        assert!(ctx.get_drawing_queue().is_empty());
    }
}

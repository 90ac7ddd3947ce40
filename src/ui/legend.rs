//! Magnitude legend pinned to the bottom-right corner of the map.

use crate::{
    classify::{self, MagnitudeBucket, LEGEND_GRADES},
    ui::controls::{paint_panel, Position},
};
use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Ui, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// Lower bound of the bucket
    pub grade: f64,
    pub label: String,
    /// Swatch colour, sampled one unit above the grade
    pub bucket: MagnitudeBucket,
}

#[derive(Debug, Clone)]
pub struct Legend {
    entries: Vec<LegendEntry>,
    pub position: Position,
    pub margin: f32,
}

const SWATCH: f32 = 18.0;
const ROW_HEIGHT: f32 = 22.0;
const WIDTH: f32 = 80.0;

impl Legend {
    pub fn new() -> Self {
        Self::from_grades(&LEGEND_GRADES)
    }

    pub fn from_grades(grades: &[f64]) -> Self {
        let entries = grades
            .iter()
            .enumerate()
            .map(|(i, &grade)| LegendEntry {
                grade,
                label: match grades.get(i + 1) {
                    Some(next) => format!("{}–{}", grade, next),
                    None => format!("{}+", grade),
                },
                bucket: classify::color(grade + 1.0),
            })
            .collect();

        Self {
            entries,
            position: Position::BottomRight,
            margin: 10.0,
        }
    }

    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    /// Paint the legend and return the rect it covers
    pub fn show(&self, ui: &Ui, map_rect: Rect) -> Rect {
        let size = Vec2::new(WIDTH, self.entries.len() as f32 * ROW_HEIGHT + 12.0);
        let rect = self.position.calculate_rect(map_rect, size, self.margin);
        let painter = ui.painter();
        paint_panel(painter, rect);

        for (i, entry) in self.entries.iter().enumerate() {
            let top = rect.min.y + 6.0 + i as f32 * ROW_HEIGHT;
            let swatch = Rect::from_min_size(
                Pos2::new(rect.min.x + 8.0, top + (ROW_HEIGHT - SWATCH) / 2.0),
                Vec2::splat(SWATCH),
            );
            painter.rect_filled(swatch, 0.0, entry.bucket.color());
            painter.rect_stroke(swatch, 0.0, Stroke::new(0.5, Color32::from_gray(120)));
            painter.text(
                Pos2::new(swatch.max.x + 8.0, swatch.center().y),
                Align2::LEFT_CENTER,
                &entry.label,
                FontId::proportional(13.0),
                Color32::BLACK,
            );
        }
        rect
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let labels: Vec<_> = Legend::new()
            .entries()
            .iter()
            .map(|e| e.label.clone())
            .collect();
        assert_eq!(labels, vec!["0–2", "2–4", "4–6", "6–8", "8+"]);
    }

    #[test]
    fn test_swatch_matches_marker_color_above_grade() {
        for entry in Legend::new().entries() {
            assert_eq!(entry.bucket, classify::color(entry.grade + 1.0));
        }
        let buckets: Vec<_> = Legend::new().entries().iter().map(|e| e.bucket).collect();
        assert_eq!(buckets, MagnitudeBucket::ALL.to_vec());
    }

    #[test]
    fn test_pinned_bottom_right() {
        assert_eq!(Legend::default().position, Position::BottomRight);
    }
}

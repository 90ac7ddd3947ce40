//! Magnitude classification shared by markers and the legend.
//!
//! Both functions are total over `f64`. The colour ladder uses strict `>`
//! comparisons evaluated from the highest threshold down, so a magnitude that
//! sits exactly on a threshold belongs to the lower bucket. The legend
//! samples the same ladder at `grade + 1`, which keeps swatches and markers
//! in agreement.

use egui::Color32;

/// Lower bounds of the legend buckets, in display order.
pub const LEGEND_GRADES: [f64; 5] = [0.0, 2.0, 4.0, 6.0, 8.0];

/// Marker radius scale factor (pixels per unit of magnitude).
pub const RADIUS_SCALE: f64 = 5.0;

/// One of the five colour buckets a magnitude can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MagnitudeBucket {
    /// `mag <= 2`, including non-positive and `NaN` magnitudes
    C1,
    /// `2 < mag <= 4`
    C2,
    /// `4 < mag <= 6`
    C3,
    /// `6 < mag <= 8`
    C4,
    /// `mag > 8`
    C5,
}

impl MagnitudeBucket {
    pub const ALL: [MagnitudeBucket; 5] = [
        MagnitudeBucket::C1,
        MagnitudeBucket::C2,
        MagnitudeBucket::C3,
        MagnitudeBucket::C4,
        MagnitudeBucket::C5,
    ];

    /// Hex colour string of the bucket.
    pub fn hex(&self) -> &'static str {
        match self {
            MagnitudeBucket::C1 => "#74a9cf",
            MagnitudeBucket::C2 => "#2b8cbe",
            MagnitudeBucket::C3 => "#045a8d",
            MagnitudeBucket::C4 => "#e34a33",
            MagnitudeBucket::C5 => "#b30000",
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            MagnitudeBucket::C1 => Color32::from_rgb(0x74, 0xa9, 0xcf),
            MagnitudeBucket::C2 => Color32::from_rgb(0x2b, 0x8c, 0xbe),
            MagnitudeBucket::C3 => Color32::from_rgb(0x04, 0x5a, 0x8d),
            MagnitudeBucket::C4 => Color32::from_rgb(0xe3, 0x4a, 0x33),
            MagnitudeBucket::C5 => Color32::from_rgb(0xb3, 0x00, 0x00),
        }
    }
}

impl std::fmt::Display for MagnitudeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.hex())
    }
}

/// Marker radius for a magnitude. Not clamped: zero and negative magnitudes
/// produce zero and negative radii.
pub fn radius(mag: f64) -> f64 {
    mag * RADIUS_SCALE
}

/// Colour bucket for a magnitude.
pub fn color(mag: f64) -> MagnitudeBucket {
    if mag > 8.0 {
        MagnitudeBucket::C5
    } else if mag > 6.0 {
        MagnitudeBucket::C4
    } else if mag > 4.0 {
        MagnitudeBucket::C3
    } else if mag > 2.0 {
        MagnitudeBucket::C2
    } else {
        MagnitudeBucket::C1
    }
}

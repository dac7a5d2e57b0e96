//! Text metrics calculations

use crate::FontMetrics;

/// The measured box of a piece of text.
///
/// `height` is the full line height, `extent` the ink height of the glyphs
/// and `baseline` the distance from the top of the line box to the baseline.
/// `ink_ascent` is how far the ink reaches above the baseline, so the ink
/// box starts `baseline - ink_ascent` below the top of the line box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
    pub extent: f32,
    pub baseline: f32,
    pub ink_ascent: f32,
    pub overhang_leading: f32,
    pub overhang_trailing: f32,
}

impl TextExtent {
    /// Depth of the line box below the baseline
    pub fn descent(&self) -> f32 {
        self.height - self.baseline
    }

    /// Width of the ink, with the overhangs removed
    pub fn ink_width(&self) -> f32 {
        (self.width - self.overhang_leading - self.overhang_trailing).max(0.0)
    }
}

/// Calculate line height from font metrics and font size
pub fn calculate_line_height(metrics: &FontMetrics, font_size: f32) -> f32 {
    let upm = metrics.units_per_em as f32;
    let ascender = metrics.ascender as f32 / upm * font_size;
    let descender = metrics.descender.unsigned_abs() as f32 / upm * font_size;
    let line_gap = metrics.line_gap as f32 / upm * font_size;

    ascender + descender + line_gap
}

/// Calculate baseline offset from top of line
pub fn calculate_baseline_offset(metrics: &FontMetrics, font_size: f32) -> f32 {
    metrics.ascender as f32 / metrics.units_per_em as f32 * font_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_height_scales_with_size() {
        let metrics = FontMetrics::default();
        assert!((calculate_line_height(&metrics, 10.0) - 10.0).abs() < 1e-4);
        assert!((calculate_line_height(&metrics, 20.0) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_baseline_offset() {
        let metrics = FontMetrics::default();
        assert!((calculate_baseline_offset(&metrics, 10.0) - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_descent_and_ink_width() {
        let extent = TextExtent {
            width: 10.0,
            height: 12.0,
            extent: 11.0,
            baseline: 9.0,
            ink_ascent: 8.0,
            overhang_leading: 1.0,
            overhang_trailing: 0.5,
        };
        assert_eq!(extent.descent(), 3.0);
        assert_eq!(extent.ink_width(), 8.5);
    }
}

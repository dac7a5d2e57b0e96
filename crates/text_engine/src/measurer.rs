//! The measurement service seam
//!
//! Layout code talks to a `&dyn TextMeasurer` and nothing else. The
//! approximate measurer below needs no font files, which makes layout
//! deterministic in tests and usable before fonts are loaded.

use crate::{
    calculate_baseline_offset, calculate_line_height, FontMetrics, FontRequest, FontWeight,
    TextExtent,
};

/// Measures text for layout
pub trait TextMeasurer {
    /// Measure `text` set in the requested font.
    ///
    /// Empty text still reports the line height and baseline of the font,
    /// with zero width.
    fn measure(&self, text: &str, font: &FontRequest) -> TextExtent;
}

/// Estimates glyph advances from character classes
#[derive(Debug, Clone, Default)]
pub struct ApproxMeasurer {
    metrics: FontMetrics,
}

impl ApproxMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom vertical metrics
    pub fn with_metrics(metrics: FontMetrics) -> Self {
        Self { metrics }
    }

    /// Estimated advance of one character, in font units
    pub(crate) fn estimate_char_width(ch: char, units_per_em: u16) -> i32 {
        let em = units_per_em as i32;

        match ch {
            // Narrow characters
            ' ' | 'i' | 'l' | 'j' | 't' | 'f' | 'r' | '!' | '|' | '\'' | '`' | '.' | ',' | ':'
            | ';' => em * 30 / 100,
            // Very narrow
            'I' | '1' => em * 35 / 100,
            // Wide characters
            'm' | 'w' | 'M' | 'W' | '@' | '%' => em * 90 / 100,
            // Uppercase typically wider
            'A'..='Z' => em * 70 / 100,
            // Lowercase average
            'a'..='z' => em * 55 / 100,
            // Digits are typically monospaced
            '0'..='9' => em * 60 / 100,
            // Binary operators and relations get their surrounding space
            '+' | '-' | '=' | '<' | '>' | '\u{00B1}' | '\u{00D7}' | '\u{00F7}' | '\u{2212}'
            | '\u{2264}' | '\u{2265}' | '\u{2260}' => em * 78 / 100,
            // Big operators
            '\u{2211}' | '\u{220F}' | '\u{2210}' | '\u{22C2}' | '\u{22C3}' => em * 90 / 100,
            // Integral signs are slanted and narrow
            '\u{222B}'..='\u{2233}' => em * 45 / 100,
            // Zero-width characters
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => 0,
            // Default width
            _ => em * 60 / 100,
        }
    }
}

impl TextMeasurer for ApproxMeasurer {
    fn measure(&self, text: &str, font: &FontRequest) -> TextExtent {
        let units_per_em = self.metrics.units_per_em;
        let scale = font.font_size / units_per_em as f32;

        let advance: i32 = if font.font_type.is_monospace() {
            text.chars().count() as i32 * units_per_em as i32 * 60 / 100
        } else {
            text.chars()
                .map(|ch| Self::estimate_char_width(ch, units_per_em))
                .sum()
        };
        let mut width = advance as f32 * scale;
        if font.weight == FontWeight::Bold {
            width *= 1.05;
        }

        let height = calculate_line_height(&self.metrics, font.font_size);
        let baseline = calculate_baseline_offset(&self.metrics, font.font_size);
        let extent = (self.metrics.ascender as f32 - self.metrics.descender as f32) * scale;

        TextExtent {
            width,
            height,
            extent,
            baseline,
            ink_ascent: self.metrics.ascender as f32 * scale,
            overhang_leading: 0.0,
            overhang_trailing: 0.0,
        }
    }
}

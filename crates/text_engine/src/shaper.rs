//! Text measurement using rustybuzz
//!
//! Faces are borrowed from caller-owned font data, so the measurer lives no
//! longer than the bytes it shapes with. Font types without a loaded face
//! fall back to the approximate measurer.

use crate::{
    ApproxMeasurer, FontRequest, FontType, FontWeight, Result, TextError, TextExtent, TextMeasurer,
};
use rustybuzz::ttf_parser::GlyphId;
use std::collections::HashMap;

/// Measurer that shapes text with real font data
pub struct ShapingMeasurer<'a> {
    /// Loaded faces per font type
    faces: HashMap<FontType, rustybuzz::Face<'a>>,
    /// Used for font types that have no face
    fallback: ApproxMeasurer,
}

impl<'a> ShapingMeasurer<'a> {
    pub fn new() -> Self {
        Self {
            faces: HashMap::new(),
            fallback: ApproxMeasurer::new(),
        }
    }

    /// Load a face for a font type from raw font data
    pub fn load_font(&mut self, font_type: FontType, data: &'a [u8]) -> Result<()> {
        let face = rustybuzz::Face::from_slice(data, 0).ok_or_else(|| {
            TextError::InvalidFontData(format!("failed to parse face for {}", font_type))
        })?;
        tracing::debug!(font = %font_type, units_per_em = face.units_per_em(), "loaded font face");
        self.faces.insert(font_type, face);
        Ok(())
    }

    /// Check if a face is loaded for the font type
    pub fn has_font(&self, font_type: FontType) -> bool {
        self.faces.contains_key(&font_type)
    }

    fn measure_with_face(
        &self,
        text: &str,
        font: &FontRequest,
        face: &rustybuzz::Face<'_>,
    ) -> TextExtent {
        let units_per_em = face.units_per_em() as f32;
        let scale = font.font_size / units_per_em;

        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        let output = rustybuzz::shape(face, &[], buffer);

        let glyph_infos = output.glyph_infos();
        let glyph_positions = output.glyph_positions();

        let mut total_advance = 0i32;
        let mut ink_top = i32::MIN;
        let mut ink_bottom = i32::MAX;
        let mut overhang_leading = 0.0;
        let mut overhang_trailing = 0.0;
        let last = glyph_infos.len().saturating_sub(1);

        for (index, (info, pos)) in glyph_infos.iter().zip(glyph_positions.iter()).enumerate() {
            let glyph = GlyphId(info.glyph_id as u16);
            if let Some(bbox) = face.glyph_bounding_box(glyph) {
                ink_top = ink_top.max(bbox.y_max as i32);
                ink_bottom = ink_bottom.min(bbox.y_min as i32);
                if index == 0 {
                    overhang_leading = bbox.x_min as f32 * scale;
                }
                if index == last {
                    overhang_trailing = (pos.x_advance - bbox.x_max as i32) as f32 * scale;
                }
            }
            total_advance += pos.x_advance;
        }

        let ascender = face.ascender() as f32 * scale;
        let descender = (face.descender() as f32 * scale).abs();
        let line_gap = face.line_gap() as f32 * scale;
        let (extent, ink_ascent) = if ink_top >= ink_bottom {
            ((ink_top - ink_bottom) as f32 * scale, ink_top as f32 * scale)
        } else {
            (ascender + descender, ascender)
        };

        let mut width = total_advance as f32 * scale;
        if font.weight == FontWeight::Bold && !face.is_bold() {
            width *= 1.05;
        }

        TextExtent {
            width,
            height: ascender + descender + line_gap,
            extent,
            baseline: ascender,
            ink_ascent,
            overhang_leading,
            overhang_trailing,
        }
    }
}

impl Default for ShapingMeasurer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for ShapingMeasurer<'_> {
    fn measure(&self, text: &str, font: &FontRequest) -> TextExtent {
        match self.faces.get(&font.font_type) {
            Some(face) => self.measure_with_face(text, font, face),
            None => self.fallback.measure(text, font),
        }
    }
}

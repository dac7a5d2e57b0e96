//! Layout context shared by the size calculation pass

use crate::format::{FormatId, FormatTable};
use text_engine::{FontRequest, FontType, TextExtent, TextMeasurer};

/// Font family used for construct signs (brackets, big operators, arrows)
pub const SIGN_FONT: FontType = FontType::StixGeneral;

/// What a node needs to size itself
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub measurer: &'a dyn TextMeasurer,
    pub formats: &'a FormatTable,
}

impl<'a> LayoutContext<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, formats: &'a FormatTable) -> Self {
        Self { measurer, formats }
    }

    /// Measure text set in a format from the table
    pub fn measure(&self, text: &str, format: FormatId) -> TextExtent {
        let request = self.formats.get(format).font_request();
        self.measurer.measure(text, &request)
    }

    /// Font for signs drawn at `font_size`
    pub fn sign_font(&self, font_size: f32) -> FontRequest {
        FontRequest::new(SIGN_FONT, font_size)
    }
}

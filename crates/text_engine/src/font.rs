//! Font descriptors

use crate::TextError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The font families an equation can be typeset in.
///
/// The STIX families carry the big operators and bracket pieces; the others
/// are ordinary text faces users pick for runs of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontType {
    #[default]
    StixGeneral,
    StixIntegralsD,
    StixSizeOneSym,
    StixSizeTwoSym,
    CambriaMath,
    TimesNewRoman,
    Arial,
    CourierNew,
    Symbol,
}

impl FontType {
    pub const ALL: [FontType; 9] = [
        FontType::StixGeneral,
        FontType::StixIntegralsD,
        FontType::StixSizeOneSym,
        FontType::StixSizeTwoSym,
        FontType::CambriaMath,
        FontType::TimesNewRoman,
        FontType::Arial,
        FontType::CourierNew,
        FontType::Symbol,
    ];

    /// Name used when serializing the font type
    pub fn as_str(&self) -> &'static str {
        match self {
            FontType::StixGeneral => "StixGeneral",
            FontType::StixIntegralsD => "StixIntegralsD",
            FontType::StixSizeOneSym => "StixSizeOneSym",
            FontType::StixSizeTwoSym => "StixSizeTwoSym",
            FontType::CambriaMath => "CambriaMath",
            FontType::TimesNewRoman => "TimesNewRoman",
            FontType::Arial => "Arial",
            FontType::CourierNew => "CourierNew",
            FontType::Symbol => "Symbol",
        }
    }

    /// Family name as installed on the system
    pub fn family_name(&self) -> &'static str {
        match self {
            FontType::StixGeneral => "STIXGeneral",
            FontType::StixIntegralsD => "STIXIntegralsD",
            FontType::StixSizeOneSym => "STIXSizeOneSym",
            FontType::StixSizeTwoSym => "STIXSizeTwoSym",
            FontType::CambriaMath => "Cambria Math",
            FontType::TimesNewRoman => "Times New Roman",
            FontType::Arial => "Arial",
            FontType::CourierNew => "Courier New",
            FontType::Symbol => "Symbol",
        }
    }

    /// True for the monospaced families
    pub fn is_monospace(&self) -> bool {
        matches!(self, FontType::CourierNew)
    }
}

impl fmt::Display for FontType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontType {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontType::ALL
            .iter()
            .copied()
            .find(|font| font.as_str() == s)
            .ok_or_else(|| TextError::UnknownFontType(s.to_string()))
    }
}

/// Font style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontStyle::Normal => f.write_str("Normal"),
            FontStyle::Italic => f.write_str("Italic"),
        }
    }
}

impl FromStr for FontStyle {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" => Ok(FontStyle::Normal),
            "Italic" => Ok(FontStyle::Italic),
            other => Err(TextError::UnknownFontStyle(other.to_string())),
        }
    }
}

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontWeight::Normal => f.write_str("Normal"),
            FontWeight::Bold => f.write_str("Bold"),
        }
    }
}

impl FromStr for FontWeight {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" => Ok(FontWeight::Normal),
            "Bold" => Ok(FontWeight::Bold),
            other => Err(TextError::UnknownFontWeight(other.to_string())),
        }
    }
}

/// Everything the measurer needs to know about the font of a piece of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontRequest {
    pub font_type: FontType,
    pub font_size: f32,
    pub style: FontStyle,
    pub weight: FontWeight,
}

impl FontRequest {
    pub fn new(font_type: FontType, font_size: f32) -> Self {
        Self {
            font_type,
            font_size,
            style: FontStyle::Normal,
            weight: FontWeight::Normal,
        }
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }
}

/// Font metrics in font units
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Units per em
    pub units_per_em: u16,
    /// Ascender (positive)
    pub ascender: i16,
    /// Descender (negative)
    pub descender: i16,
    /// Line gap
    pub line_gap: i16,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            line_gap: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_type_name_roundtrip() {
        for font in FontType::ALL {
            assert_eq!(font.as_str().parse::<FontType>().unwrap(), font);
        }
    }

    #[test]
    fn test_unknown_font_type() {
        let err = "Papyrus".parse::<FontType>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown font type: Papyrus");
    }

    #[test]
    fn test_style_and_weight_parse() {
        assert_eq!("Italic".parse::<FontStyle>().unwrap(), FontStyle::Italic);
        assert_eq!("Bold".parse::<FontWeight>().unwrap(), FontWeight::Bold);
        assert!("Oblique".parse::<FontStyle>().is_err());
    }

    #[test]
    fn test_font_request_builder() {
        let request = FontRequest::new(FontType::Arial, 12.0)
            .with_style(FontStyle::Italic)
            .with_weight(FontWeight::Bold)
            .with_size(14.0);
        assert_eq!(request.font_size, 14.0);
        assert_eq!(request.style, FontStyle::Italic);
        assert_eq!(request.weight, FontWeight::Bold);
    }
}

//! Editor settings
//!
//! Settings decide how new documents start out: the default text format,
//! the base font size, the undo history length and the size of newly
//! inserted matrices.

use crate::error::EquationResult;
use crate::format::{Color, TextFormat};
use serde::{Deserialize, Serialize};
use text_engine::{FontStyle, FontType, FontWeight};

/// Settings for one editor instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    /// Base font size of the document body in points
    pub font_size: f32,
    pub font_type: FontType,
    pub font_style: FontStyle,
    pub font_weight: FontWeight,
    pub color: Color,
    /// Maximum number of entries on the undo stack
    pub undo_limit: usize,
    pub matrix_defaults: MatrixDefaults,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            font_size: 20.0,
            font_type: FontType::StixGeneral,
            font_style: FontStyle::Italic,
            font_weight: FontWeight::Normal,
            color: Color::BLACK,
            undo_limit: edit_engine::DEFAULT_UNDO_LIMIT,
            matrix_defaults: MatrixDefaults::default(),
        }
    }
}

/// Shape of a matrix inserted without explicit dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatrixDefaults {
    pub rows: usize,
    pub columns: usize,
}

impl Default for MatrixDefaults {
    fn default() -> Self {
        Self { rows: 2, columns: 2 }
    }
}

impl EditorSettings {
    /// Parse settings, reporting malformed input as an error
    pub fn parse_json(json: &str) -> EquationResult<Self> {
        let settings: EditorSettings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Parse settings, falling back to the defaults on malformed input
    pub fn from_json(json: &str) -> Self {
        match Self::parse_json(json) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to load editor settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> EquationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Format new text is typed in
    pub fn default_format(&self) -> TextFormat {
        TextFormat::new(self.font_size, self.font_type)
            .with_style(self.font_style)
            .with_weight(self.font_weight)
            .with_color(self.color)
    }

    /// Replace out-of-range values with their defaults
    pub(crate) fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            self.font_size = defaults.font_size;
        }
        if self.undo_limit == 0 {
            self.undo_limit = defaults.undo_limit;
        }
        if self.matrix_defaults.rows == 0 || self.matrix_defaults.columns == 0 {
            self.matrix_defaults = defaults.matrix_defaults;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EditorSettings::default();
        assert_eq!(settings.font_size, 20.0);
        assert_eq!(settings.undo_limit, 100);
        assert_eq!(settings.matrix_defaults, MatrixDefaults { rows: 2, columns: 2 });
    }

    #[test]
    fn test_partial_json_uses_defaults_for_missing_fields() {
        let settings = EditorSettings::from_json(r#"{"font_size": 14.0, "font_weight": "Bold"}"#);
        assert_eq!(settings.font_size, 14.0);
        assert_eq!(settings.font_weight, FontWeight::Bold);
        assert_eq!(settings.font_type, FontType::StixGeneral);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        assert_eq!(EditorSettings::from_json("{not json"), EditorSettings::default());
        assert!(EditorSettings::parse_json("{not json").is_err());
    }

    #[test]
    fn test_out_of_range_values_are_replaced() {
        let settings = EditorSettings::from_json(
            r#"{"font_size": -3.0, "undo_limit": 0, "matrix_defaults": {"rows": 0, "columns": 4}}"#,
        );
        assert_eq!(settings.font_size, 20.0);
        assert_eq!(settings.undo_limit, 100);
        assert_eq!(settings.matrix_defaults.columns, 2);
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = EditorSettings::default();
        settings.color = Color::BLUE;
        settings.matrix_defaults.rows = 3;
        let json = settings.to_json().unwrap();
        assert_eq!(EditorSettings::parse_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_default_format() {
        let format = EditorSettings::default().default_format();
        assert_eq!(format.font_style, FontStyle::Italic);
        assert_eq!(format.font_size, 20.0);
    }
}

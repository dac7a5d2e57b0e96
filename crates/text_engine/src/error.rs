//! Error types for text engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("Unknown font type: {0}")]
    UnknownFontType(String),

    #[error("Unknown font style: {0}")]
    UnknownFontStyle(String),

    #[error("Unknown font weight: {0}")]
    UnknownFontWeight(String),

    #[error("Invalid font data: {0}")]
    InvalidFontData(String),
}

pub type Result<T> = std::result::Result<T, TextError>;

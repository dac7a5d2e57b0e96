//! Error types for the equation crate

use thiserror::Error;

/// Errors that can occur in equation operations
#[derive(Error, Debug)]
pub enum EquationError {
    /// Malformed document, unknown parameter value or wrong child count
    #[error("Deserialization error: {0}")]
    Deserialize(String),

    /// Element name that is not part of the document schema
    #[error("Unknown element: {0}")]
    UnknownElement(String),

    /// Error writing the document
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// An offset or path that does not address anything in the tree
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// Invalid settings file
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    /// XML error from quick-xml
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Font descriptor that does not parse
    #[error("Font error: {0}")]
    Font(#[from] text_engine::TextError),

    /// UTF-8 decoding error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result type for equation operations
pub type EquationResult<T> = Result<T, EquationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EquationError::Deserialize("Matrix expects 4 cells, found 3".to_string());
        assert_eq!(
            err.to_string(),
            "Deserialization error: Matrix expects 4 cells, found 3"
        );
    }

    #[test]
    fn test_error_from_xml() {
        let xml_err = quick_xml::Error::Io(std::sync::Arc::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            "test error",
        )));
        let err: EquationError = xml_err.into();
        assert!(matches!(err, EquationError::Xml(_)));
    }

    #[test]
    fn test_error_from_font() {
        let err: EquationError = "Wingdings"
            .parse::<text_engine::FontType>()
            .unwrap_err()
            .into();
        assert!(matches!(err, EquationError::Font(_)));
    }
}

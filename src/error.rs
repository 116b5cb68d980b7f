//! Error types for quizpdf library.

use std::io;
use thiserror::Error;

/// Result type alias for quizpdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while laying out or writing a quiz document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading quiz files or saving documents.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No usable document backend, or unusable page geometry.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An image reference could not be decoded.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Rich content that could not be normalized (empty Delta, broken markup).
    #[error("Malformed rich content: {0}")]
    MalformedRichContent(String),

    /// A question violates a quiz invariant.
    #[error("Invalid quiz: {0}")]
    InvalidQuiz(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error while serializing a document (PDF, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Quiz JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecode(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::ImageDecode(format!("invalid base64 payload: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Configuration("no document backend".to_string());
        assert_eq!(err.to_string(), "Configuration error: no document backend");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}

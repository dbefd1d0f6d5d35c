//! Error types for pdfsect.

use std::io;
use thiserror::Error;

/// Result type alias for pdfsect operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting or segmenting a document.
///
/// An empty segmentation is not an error: it is reported through
/// [`Document::is_empty`](crate::model::Document::is_empty) and handled by
/// the correction loop.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Style map or document (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Error extracting the character stream of a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// The style map file does not exist.
    #[error("Style map not found: {0}")]
    MissingStyleMap(String),

    /// The layout source produced no character stream for a document.
    #[error("No character stream for document {0}")]
    MissingStream(String),

    /// Error during rendering (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

//! Error types for the slidemaker library.

use std::io;
use thiserror::Error;

use crate::validate::ValidationError;

/// Result type alias for slidemaker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, editing, or writing a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file is an Office document, but not a presentation.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading or writing the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Error serializing XML content.
    #[error("XML write error: {0}")]
    XmlWrite(String),

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required document component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// The uploaded bytes could not be opened as a presentation.
    #[error("Invalid or corrupted PowerPoint file: {0}")]
    CorruptPresentation(String),

    /// The presentation declares no slide master.
    #[error("No slide masters found in presentation")]
    NoSlideMaster,

    /// The first slide master has no layouts to build a slide from.
    #[error("Presentation has no slide layouts")]
    NoSlideLayouts,

    /// A slide index outside the slide list.
    #[error("Slide index {index} is out of range (presentation has {count} slides)")]
    SlideOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of slides in the presentation.
        count: usize,
    },

    /// Request input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Image bytes could not be decoded or are in an unsupported format.
    #[error("Image error: {0}")]
    Image(String),

    /// Neither a body placeholder nor a fallback text box could take the content.
    #[error("Could not add content to slide: {0}")]
    ContentPlacement(String),

    /// The modified presentation could not be serialized.
    #[error("Failed to save presentation: {0}")]
    Save(String),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than by the service.
    ///
    /// Client errors map to HTTP 400; everything else is an internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownFormat
                | Error::UnsupportedFormat(_)
                | Error::CorruptPresentation(_)
                | Error::NoSlideMaster
                | Error::NoSlideLayouts
                | Error::Validation(_)
                | Error::ContentPlacement(_)
        )
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

//! Error types for pdf-wrangler.

use std::io;
use thiserror::Error;

/// Result type alias for pdf-wrangler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the caller.
///
/// Only failures that prevent a [`Document`](crate::Document) from being built
/// (or an image from being written) end up here. Text, metadata and image
/// decoding failures degrade locally instead, see [`Outcome`](crate::Outcome).
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and could not be opened.
    #[error("Document is encrypted")]
    Encrypted,

    /// The provided password is incorrect.
    #[error("Invalid password")]
    InvalidPassword,

    /// The document's permissions forbid content extraction.
    #[error("Text extraction is not allowed by the document permissions")]
    ExtractionNotAllowed,

    /// A required PDF object is missing.
    #[error("Missing required object: {0}")]
    MissingObject(String),

    /// Pages could not be tokenized or iterated.
    #[error("Unable to parse PDF pages of {path}: {source}")]
    PageExtraction {
        /// Path of the document being opened.
        path: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// The image has no decoded pixel buffer to write.
    #[error("Image {index} on page {page} has no decoded pixel data")]
    ImageUnavailable { page: u32, index: u32 },

    /// Error encoding or writing an image.
    #[error("Image encoding error: {0}")]
    ImageEncode(#[from] image::ImageError),

    /// Error during rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Wrap a page-level failure with the path of the document being opened.
    pub(crate) fn page_extraction(path: impl Into<String>, source: Error) -> Self {
        Error::PageExtraction {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        use lopdf::encryption::DecryptionError;

        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => Error::InvalidPassword,
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

/// Reasons an embedded image could not be reconstructed.
///
/// These never abort extraction; they are kept on the
/// [`PdfImage`](crate::PdfImage) that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The stream uses a filter this crate does not decode.
    #[error("unsupported stream filter {0}")]
    UnsupportedFilter(String),

    /// Flate streams with a PNG/TIFF predictor are not reconstructed.
    #[error("unsupported predictor {0}")]
    UnsupportedPredictor(i64),

    /// Width or height is missing, zero or negative.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    /// The decoded stream is shorter than the declared dimensions need.
    #[error("not enough image data: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The compressed stream itself is damaged.
    #[error("corrupt {filter} stream: {reason}")]
    Corrupt { filter: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::ImageUnavailable { page: 2, index: 3 };
        assert_eq!(
            err.to_string(),
            "Image 3 on page 2 has no decoded pixel data"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_page_extraction_keeps_source() {
        let err = Error::page_extraction("a.pdf", Error::InvalidPassword);
        assert_eq!(
            err.to_string(),
            "Unable to parse PDF pages of a.pdf: Invalid password"
        );
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Invalid password"));
    }

    #[test]
    fn test_lopdf_decryption_mapping() {
        use lopdf::encryption::DecryptionError;

        let err: Error = lopdf::Error::Decryption(DecryptionError::IncorrectPassword).into();
        assert!(matches!(err, Error::InvalidPassword));

        let err: Error = lopdf::Error::Decryption(DecryptionError::UnsupportedEncryption).into();
        assert!(matches!(err, Error::Encrypted));

        let err: Error = lopdf::Error::Trailer.into();
        assert!(matches!(err, Error::PdfParse(_)));
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::Truncated {
            expected: 12,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "not enough image data: expected 12 bytes, found 4"
        );
    }
}

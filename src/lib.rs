//! # pdf-wrangler
//!
//! Page text and embedded image extraction from PDF files.
//!
//! The PDF object model, text aggregation and decryption come from `lopdf`;
//! this crate walks each page's content into a small layout tree, takes the
//! page text and reconstructs embedded images as `image::DynamicImage`s.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_wrangler::Document;
//!
//! fn main() -> pdf_wrangler::Result<()> {
//!     let doc = Document::open("document.pdf", None)?;
//!     println!("{}", doc.get_text());
//!
//!     for image in doc.images().filter(|i| i.is_decoded()) {
//!         image.save(format!("page{}-{}.png", image.page_number(), image.index()))?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Only failures that prevent pages from being read are returned as
//! errors. Text and metadata extraction degrade to empty values (see
//! [`Outcome`]) and images that cannot be decoded keep their
//! [`DecodeError`] instead of a pixel buffer.

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_version, detect_version_from_path, is_pdf_bytes, PdfVersion};
pub use error::{DecodeError, Error, Result};
pub use model::{read_metadata, Document, Metadata, Outcome, Page, PdfImage, PixelFormat};
pub use parser::{ParseOptions, PdfBackend};
pub use render::{to_json, JsonFormat};

use std::io::Read;
use std::path::Path;

/// Open a PDF file without a password.
///
/// # Example
///
/// ```no_run
/// let doc = pdf_wrangler::open("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn open<P: AsRef<Path>>(path: P) -> Result<Document> {
    Document::open(path, None)
}

/// Open a PDF from a reader.
///
/// The reader is consumed to the end before parsing starts.
///
/// # Example
///
/// ```no_run
/// use std::fs::File;
///
/// let file = File::open("document.pdf").unwrap();
/// let doc = pdf_wrangler::open_reader(file, pdf_wrangler::ParseOptions::default()).unwrap();
/// ```
pub fn open_reader<R: Read>(mut reader: R, options: ParseOptions) -> Result<Document> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Document::from_bytes(&data, options)
}

/// Extract the text of every page, pages separated by a blank line.
///
/// Images are not decoded.
pub fn extract_text<P: AsRef<Path>>(path: P, password: Option<&str>) -> Result<String> {
    let mut options = ParseOptions::new().text_only();
    options.password = password.map(str::to_string);
    Ok(Document::open_with_options(path, options)?.get_text())
}

/// Render a PDF file as a JSON summary.
pub fn to_json_file<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = Document::open(path, None)?;
    to_json(&doc, format)
}

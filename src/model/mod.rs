//! Document model types.
//!
//! A [`Document`] owns its [`Page`]s and each page owns its [`PdfImage`]s.
//! Everything is built once when the document is opened and is immutable
//! afterwards.

mod document;
mod image;
mod metadata;
mod outcome;
mod page;

pub use document::{read_metadata, read_metadata_from, Document, MEMORY_PATH};
pub use self::image::{PdfImage, PixelFormat};
pub use metadata::{parse_pdf_date, Metadata};
pub use outcome::Outcome;
pub use page::Page;

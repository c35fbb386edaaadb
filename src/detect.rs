//! PDF header detection.
//!
//! A cheap check run before handing bytes to the PDF library, so that
//! obviously wrong inputs fail with [`Error::UnknownFormat`] instead of an
//! opaque parser error.

use crate::error::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers accept the header anywhere in the first 1024 bytes.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Version declared in a PDF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Detect the PDF version from the leading bytes of a file.
///
/// # Returns
/// * `Ok(PdfVersion)` if a `%PDF-x.y` header is found
/// * `Err(Error::UnknownFormat)` if there is no header
/// * `Err(Error::UnsupportedVersion)` if the version is not `1.x` or `2.x`
pub fn detect_version(data: &[u8]) -> Result<PdfVersion> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let version = window
        .get(start + PDF_MAGIC.len()..start + PDF_MAGIC.len() + 3)
        .ok_or(Error::UnknownFormat)?;

    match version {
        [major @ b'1'..=b'2', b'.', minor @ b'0'..=b'9'] => Ok(PdfVersion {
            major: major - b'0',
            minor: minor - b'0',
        }),
        other => Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(other).into_owned(),
        )),
    }
}

/// Detect the PDF version of a file by reading only its header window.
pub fn detect_version_from_path<P: AsRef<Path>>(path: P) -> Result<PdfVersion> {
    let mut buffer = Vec::with_capacity(HEADER_SEARCH_WINDOW);
    File::open(path)?
        .take(HEADER_SEARCH_WINDOW as u64)
        .read_to_end(&mut buffer)?;
    detect_version(&buffer)
}

/// Check if bytes start like a PDF file.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_version(data).is_ok()
}

//! Document-level types.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use super::page::serialize_outcome;
use super::{Metadata, Outcome, Page, PdfImage};
use crate::detect::detect_version;
use crate::error::{Error, Result};
use crate::parser::{LopdfBackend, ParseOptions, PdfBackend};

/// Path shown for documents opened from memory.
pub const MEMORY_PATH: &str = "<memory>";

/// An opened PDF document.
///
/// Pages are materialized eagerly on open; the source file is not held
/// open afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Source path, for display and diagnostics
    path: String,

    /// Document metadata (title, author, etc.)
    #[serde(serialize_with = "serialize_outcome")]
    metadata: Outcome<Metadata>,

    /// Pages in document order
    pages: Vec<Page>,
}

impl Document {
    /// Open a PDF file, decrypting it with `password` if one is given.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pdf_wrangler::Document;
    ///
    /// let doc = Document::open("report.pdf", None)?;
    /// println!("{} has {} pages", doc, doc.page_count());
    /// # Ok::<(), pdf_wrangler::Error>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P, password: Option<&str>) -> Result<Self> {
        let options = match password {
            Some(password) => ParseOptions::new().with_password(password),
            None => ParseOptions::new(),
        };
        Self::open_with_options(path, options)
    }

    /// Open a PDF file with explicit options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let data = std::fs::read(path)?;
        Self::load(display, &data, &options)
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(data: &[u8], options: ParseOptions) -> Result<Self> {
        Self::load(MEMORY_PATH.to_string(), data, &options)
    }

    fn load(path: String, data: &[u8], options: &ParseOptions) -> Result<Self> {
        let version = detect_version(data)?;
        log::debug!("Opening {} (PDF {})", path, version);

        let backend =
            LopdfBackend::load_bytes(data, options).map_err(|e| Error::page_extraction(&path, e))?;
        Self::from_backend(path, &backend, options)
    }

    /// Build a document from any backend.
    ///
    /// Pages are interpreted one at a time; the first page that cannot be
    /// interpreted aborts with [`Error::PageExtraction`]. A failure to read
    /// the information dictionary only degrades the metadata.
    pub fn from_backend<B>(path: impl Into<String>, backend: &B, options: &ParseOptions) -> Result<Self>
    where
        B: PdfBackend + ?Sized,
    {
        let path = path.into();

        let mut pages = Vec::new();
        for (index, (number, id)) in backend.pages().into_iter().enumerate() {
            let layout = backend
                .layout_page(number, id)
                .map_err(|e| Error::page_extraction(&path, e))?;
            log::debug!("Page {}: {} image node(s)", number, layout.images().len());
            pages.push(Page::from_layout(&layout, index, path.as_str(), options.extract_images));
        }

        let metadata = read_metadata_from(backend, &path);

        Ok(Self {
            path,
            metadata,
            pages,
        })
    }

    /// Path the document was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// All images, page by page.
    pub fn images(&self) -> impl Iterator<Item = &PdfImage> {
        self.pages.iter().flat_map(|page| page.images())
    }

    /// Get plain text content of the entire document.
    pub fn get_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Document metadata; empty if the information dictionary was unreadable.
    pub fn get_metadata(&self) -> &Metadata {
        self.metadata.value()
    }

    /// Metadata together with whether reading it degraded.
    pub fn metadata_outcome(&self) -> &Outcome<Metadata> {
        &self.metadata
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PDF from {}", self.path)
    }
}

/// Read only the metadata of a PDF file.
///
/// Never fails: any error (unreadable file, wrong password, damaged info
/// dictionary) yields empty metadata marked as degraded.
pub fn read_metadata<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Outcome<Metadata> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let backend = std::fs::read(path)
        .map_err(Error::from)
        .and_then(|data| LopdfBackend::load_bytes(&data, options));
    match backend {
        Ok(backend) => read_metadata_from(&backend, &display),
        Err(e) => {
            log::warn!("Could not read metadata of {}: {}", display, e);
            Outcome::degraded(Metadata::new(), e.to_string())
        }
    }
}

/// Read the metadata a backend exposes, degrading on failure.
pub fn read_metadata_from<B>(backend: &B, path: &str) -> Outcome<Metadata>
where
    B: PdfBackend + ?Sized,
{
    match backend.info() {
        Ok(info) => Outcome::Complete(Metadata::from_info(info)),
        Err(e) => {
            log::warn!("Could not read metadata of {}: {}", path, e);
            Outcome::degraded(Metadata::new(), e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{LayoutPage, PageId, PdfValue};
    use std::collections::BTreeMap;

    struct StubBackend {
        texts: Vec<&'static str>,
    }

    impl PdfBackend for StubBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            (1..=self.texts.len() as u32).map(|n| (n, (n + 10, 0))).collect()
        }

        fn layout_page(&self, page_number: u32, _page: PageId) -> Result<LayoutPage> {
            Ok(LayoutPage::new().with_group(self.texts[page_number as usize - 1]))
        }

        fn info(&self) -> Result<Vec<(String, PdfValue)>> {
            Ok(vec![("Title".to_string(), PdfValue::Str(b"Stub".to_vec()))])
        }
    }

    #[test]
    fn test_document_from_backend() {
        let backend = StubBackend {
            texts: vec!["one", "two", "three"],
        };
        let doc = Document::from_backend("stub.pdf", &backend, &ParseOptions::default()).unwrap();

        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.get_text(), "one\n\ntwo\n\nthree");
        assert_eq!(doc.get_metadata().title(), Some("Stub"));
        assert_eq!(doc.to_string(), "PDF from stub.pdf");
        assert_eq!(doc.get_page(2).map(Page::text), Some("two"));
        assert!(doc.get_page(0).is_none());
        assert!(doc.get_page(4).is_none());
    }

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        let result = Document::from_bytes(b"GIF89a", ParseOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_from_bytes_wraps_parse_failures() {
        let result = Document::from_bytes(b"%PDF-1.4\ngarbage", ParseOptions::default());
        match result {
            Err(Error::PageExtraction { path, .. }) => assert_eq!(path, MEMORY_PATH),
            other => panic!("expected PageExtraction, got {:?}", other),
        }
    }

    #[test]
    fn test_read_metadata_missing_file_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = read_metadata(dir.path().join("missing.pdf"), &ParseOptions::default());

        assert!(outcome.is_degraded());
        assert!(outcome.value().is_empty());
    }
}

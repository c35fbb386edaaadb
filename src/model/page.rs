//! Page-level types.

use serde::Serialize;
use std::fmt;

use super::{Outcome, PdfImage};
use crate::parser::LayoutPage;

/// A single page of a document.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Page number (1-indexed)
    number: u32,

    /// Rotation in degrees, within `[0, 360)`
    rotation: u16,

    /// Flattened page text
    #[serde(serialize_with = "serialize_outcome")]
    text: Outcome<String>,

    /// Embedded images in pre-order
    images: Vec<PdfImage>,

    #[serde(skip)]
    path: String,
}

impl Page {
    /// Materialize a page from its layout tree.
    ///
    /// `index` is 0-based; the page stores it 1-based. `path` is only used
    /// for display.
    pub fn from_layout(
        layout: &LayoutPage,
        index: usize,
        path: impl Into<String>,
        extract_images: bool,
    ) -> Self {
        let number = index as u32 + 1;
        let path = path.into();

        let text = match (&layout.text_error, layout.groups.first()) {
            (Some(reason), _) => {
                log::warn!("Could not extract text from page {} of {}: {}", number, path, reason);
                Outcome::degraded(String::new(), reason.clone())
            }
            (None, Some(group)) => Outcome::Complete(group.text.clone()),
            (None, None) => {
                log::debug!("Page {} of {} has no text", number, path);
                Outcome::Complete(String::new())
            }
        };

        let images = if extract_images {
            layout
                .images()
                .into_iter()
                .enumerate()
                .map(|(i, raw)| PdfImage::from_raw(raw, i, number))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            number,
            rotation: layout.normalized_rotation(),
            text,
            images,
            path,
        }
    }

    /// Page number (1-indexed).
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Rotation in degrees, one of the values in `[0, 360)`.
    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    /// Plain text of the page; empty if extraction failed.
    pub fn text(&self) -> &str {
        self.text.value()
    }

    /// Text together with whether extraction degraded.
    pub fn text_outcome(&self) -> &Outcome<String> {
        &self.text
    }

    pub fn images(&self) -> &[PdfImage] {
        &self.images
    }

    /// Get an image by its 1-based index.
    pub fn get_image(&self, index: u32) -> Option<&PdfImage> {
        index
            .checked_sub(1)
            .and_then(|i| self.images.get(i as usize))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PDF page {} for {}", self.number, self.path)
    }
}

pub(crate) fn serialize_outcome<T, S>(
    outcome: &Outcome<T>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    T: Serialize,
    S: serde::Serializer,
{
    outcome.value().serialize(serializer)
}

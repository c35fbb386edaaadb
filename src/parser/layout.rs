//! Layout tree produced by a [`PdfBackend`](super::PdfBackend).
//!
//! These types carry no library handles: a backend copies what the model
//! needs out of its own object graph, so a tree outlives the backend that
//! produced it and tests can build trees by hand.

/// Nesting limit for Form XObjects placed inside Form XObjects.
pub const MAX_FIGURE_DEPTH: usize = 32;

/// Image and figure nodes a backend builds for one page before it stops
/// interpreting that page's XObjects.
pub const MAX_LAYOUT_NODES: usize = 10_000;

/// One page as interpreted by a backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPage {
    /// `/Rotate` as found in the page tree, not yet normalized.
    pub rotation: i64,

    /// Text regions; the first one carries the page's flattened text.
    pub groups: Vec<TextGroup>,

    /// Set when the backend failed to aggregate the page's text.
    pub text_error: Option<String>,

    /// Image and figure nodes in content-stream order.
    pub items: Vec<LayoutItem>,
}

impl LayoutPage {
    /// Create an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw rotation.
    pub fn with_rotation(mut self, rotation: i64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Add a text group.
    pub fn with_group(mut self, text: impl Into<String>) -> Self {
        self.groups.push(TextGroup::new(text));
        self
    }

    /// Record a text aggregation failure.
    pub fn with_text_error(mut self, reason: impl Into<String>) -> Self {
        self.text_error = Some(reason.into());
        self
    }

    /// Add a top-level node.
    pub fn with_item(mut self, item: LayoutItem) -> Self {
        self.items.push(item);
        self
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> u16 {
        normalize_rotation(self.rotation)
    }

    /// Image nodes worth decoding, in pre-order.
    pub fn images(&self) -> Vec<&RawImage> {
        collect_images(&self.items)
    }
}

/// Fold any rotation (negative or past a full turn) into `[0, 360)`.
pub fn normalize_rotation(rotation: i64) -> u16 {
    rotation.rem_euclid(360) as u16
}

/// A block of text as aggregated by the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextGroup {
    pub text: String,
}

impl TextGroup {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutItem {
    /// An image XObject
    Image(RawImage),
    /// A form XObject and whatever it paints
    Figure(Figure),
}

/// A group of nodes painted by one Form XObject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figure {
    /// Resource name the form was invoked by.
    pub name: String,
    pub items: Vec<LayoutItem>,
}

impl Figure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: LayoutItem) -> Self {
        self.items.push(item);
        self
    }
}

/// An image XObject exactly as stored in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawImage {
    /// Resource name the image was invoked by.
    pub name: String,

    /// Declared width in pixels
    pub width: Option<i64>,

    /// Declared height in pixels
    pub height: Option<i64>,

    /// Color space family name (e.g. "DeviceRGB")
    pub color_space: Option<String>,

    /// Bits per color component
    pub bits_per_component: Option<i64>,

    /// Filters in decoding order
    pub filters: Vec<String>,

    /// `/Predictor` from the decode parameters, if any
    pub predictor: Option<i64>,

    /// Stream bytes, still encoded
    pub data: Vec<u8>,
}

impl RawImage {
    /// Create an unfiltered image node.
    pub fn new(name: impl Into<String>, width: i64, height: i64, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            width: Some(width),
            height: Some(height),
            data,
            ..Default::default()
        }
    }

    /// Set the color space name.
    pub fn with_color_space(mut self, color_space: impl Into<String>) -> Self {
        self.color_space = Some(color_space.into());
        self
    }

    /// Set bits per component.
    pub fn with_bits_per_component(mut self, bits: i64) -> Self {
        self.bits_per_component = Some(bits);
        self
    }

    /// Append a filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Whether the node carries any stream data.
    pub fn has_stream(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Collect image nodes with stream data, descending into figures.
///
/// Order is pre-order, left to right, so an image inside a figure comes
/// before anything that follows the figure.
pub fn collect_images(items: &[LayoutItem]) -> Vec<&RawImage> {
    fn walk<'a>(items: &'a [LayoutItem], images: &mut Vec<&'a RawImage>) {
        for item in items {
            match item {
                LayoutItem::Image(image) => {
                    if image.has_stream() {
                        images.push(image);
                    }
                }
                LayoutItem::Figure(figure) => walk(&figure.items, images),
            }
        }
    }

    let mut images = Vec::new();
    walk(items, &mut images);
    images
}

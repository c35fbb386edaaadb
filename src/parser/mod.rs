//! PDF access: the backend seam, its layout tree and open options.

mod backend;
mod layout;
mod options;

pub use backend::{decode_text_string, LopdfBackend, PageId, PdfBackend, PdfValue};
pub use layout::{
    collect_images, normalize_rotation, Figure, LayoutItem, LayoutPage, RawImage, TextGroup,
    MAX_FIGURE_DEPTH, MAX_LAYOUT_NODES,
};
pub use options::ParseOptions;

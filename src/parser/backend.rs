//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the few PDF operations the model
//! needs, isolating the concrete PDF library (lopdf) from page and image
//! construction.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

use super::layout::{
    Figure, LayoutItem, LayoutPage, RawImage, TextGroup, MAX_FIGURE_DEPTH, MAX_LAYOUT_NODES,
};
use super::options::ParseOptions;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Limit on `/Parent` hops when resolving inherited page attributes.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// "Copy or otherwise extract text and graphics" permission bit of `/P`.
const PERMISSION_EXTRACT: i64 = 1 << 4;

/// A value from the document information dictionary.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Boolean(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Other,
}

/// Abstract interface for PDF document access.
///
/// Implementations enumerate pages, interpret each page into a
/// [`LayoutPage`] and expose the information dictionary, without leaking
/// any concrete PDF library types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId), 1-based, in document order.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Interpret one page into a layout tree.
    ///
    /// An `Err` means the page could not be tokenized at all. Text
    /// aggregation failures are reported through
    /// [`LayoutPage::text_error`] instead.
    fn layout_page(&self, page_number: u32, page: PageId) -> Result<LayoutPage>;

    /// Entries of the document information dictionary, in file order.
    fn info(&self) -> Result<Vec<(String, PdfValue)>>;
}

/// Decode a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(b"\xFE\xFF") {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

/// State of one page's XObject walk.
struct Walk {
    page_number: u32,
    /// Form XObjects currently being interpreted, outermost first.
    active_forms: Vec<ObjectId>,
    depth: usize,
    nodes: usize,
    exhausted: bool,
}

impl Walk {
    fn new(page_number: u32) -> Self {
        Self {
            page_number,
            active_forms: Vec::new(),
            depth: 0,
            nodes: 0,
            exhausted: false,
        }
    }

    /// Count one more layout node. Returns false once the page's budget is spent.
    fn admit(&mut self) -> bool {
        if self.nodes >= MAX_LAYOUT_NODES {
            if !self.exhausted {
                log::warn!(
                    "Page {} has more than {} XObject nodes; ignoring the rest",
                    self.page_number,
                    MAX_LAYOUT_NODES
                );
                self.exhausted = true;
            }
            return false;
        }
        self.nodes += 1;
        true
    }
}

impl LopdfBackend {
    /// Load from an in-memory byte slice, decrypting with the configured
    /// password and enforcing the extraction permission if requested.
    pub fn load_bytes(data: &[u8], options: &ParseOptions) -> Result<Self> {
        let mut doc = LopdfDocument::load_mem(data)?;

        if doc.is_encrypted() {
            let permissions = doc
                .get_encrypted()
                .and_then(|dict| dict.get(b"P"))
                .and_then(Object::as_i64)
                .ok();

            let password = options.password.as_deref().unwrap_or("");
            doc.decrypt(password).map_err(|e| match Error::from(e) {
                Error::InvalidPassword if options.password.is_none() => Error::Encrypted,
                other => other,
            })?;

            if options.check_extractable {
                if let Some(p) = permissions {
                    if p & PERMISSION_EXTRACT == 0 {
                        return Err(Error::ExtractionNotAllowed);
                    }
                }
            }
        } else if options.password.is_some() {
            log::debug!("Password supplied for an unencrypted document; ignoring it");
        }

        Ok(Self { doc })
    }

    /// `/Rotate` of a page, inherited from the page tree when absent.
    fn inherited_rotation(&self, page: PageId) -> i64 {
        let mut node = self.doc.get_dictionary(page).ok();
        for _ in 0..MAX_PAGE_TREE_DEPTH {
            let Some(dict) = node else { break };
            if let Ok(rotate) = dict.get(b"Rotate").and_then(|o| self.resolve_i64(o)) {
                return rotate;
            }
            node = dict
                .get(b"Parent")
                .and_then(Object::as_reference)
                .and_then(|id| self.doc.get_dictionary(id))
                .ok();
        }
        0
    }

    /// Resource dictionaries visible from a page, nearest first.
    fn page_resources(&self, page: PageId) -> Result<Vec<&Dictionary>> {
        let (inline, inherited) = self.doc.get_page_resources(page)?;
        let mut resources: Vec<&Dictionary> = inline.into_iter().collect();
        resources.extend(
            inherited
                .into_iter()
                .filter_map(|id| self.doc.get_dictionary(id).ok()),
        );
        Ok(resources)
    }

    /// Find a named XObject stream in the first resource dictionary defining
    /// it, with its object id when it is an indirect object.
    fn find_xobject<'a>(
        &'a self,
        resources: &[&'a Dictionary],
        name: &[u8],
    ) -> Option<(Option<ObjectId>, &'a Stream)> {
        resources.iter().copied().find_map(|res| {
            let xobjects = res.get(b"XObject").ok()?;
            let (_, xobjects) = self.doc.dereference(xobjects).ok()?;
            let entry = xobjects.as_dict().ok()?.get(name).ok()?;
            let (id, object) = self.doc.dereference(entry).ok()?;
            Some((id, object.as_stream().ok()?))
        })
    }

    /// Turn a content stream's `Do` operations into layout nodes.
    fn interpret(
        &self,
        operations: &[Operation],
        resources: &[&Dictionary],
        walk: &mut Walk,
    ) -> Vec<LayoutItem> {
        let mut items = Vec::new();

        for op in operations.iter().filter(|op| op.operator == "Do") {
            if walk.exhausted {
                break;
            }
            let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) else {
                continue;
            };
            let display_name = String::from_utf8_lossy(name).into_owned();
            let Some((id, stream)) = self.find_xobject(resources, name) else {
                log::warn!("XObject /{} is not defined in the page resources", display_name);
                continue;
            };

            match stream.dict.get(b"Subtype").and_then(Object::as_name_str) {
                Ok("Image") => {
                    if !walk.admit() {
                        break;
                    }
                    items.push(LayoutItem::Image(self.raw_image(display_name, stream)));
                }
                Ok("Form") => {
                    if id.is_some_and(|id| walk.active_forms.contains(&id)) {
                        log::warn!("Form XObject /{} invokes itself; skipping", display_name);
                        continue;
                    }
                    if walk.depth >= MAX_FIGURE_DEPTH {
                        log::warn!("Form XObject /{} nested too deeply; skipping", display_name);
                        continue;
                    }
                    if !walk.admit() {
                        break;
                    }
                    items.push(LayoutItem::Figure(self.figure(
                        display_name,
                        id,
                        stream,
                        resources,
                        walk,
                    )));
                }
                _ => {}
            }
        }

        items
    }

    /// Interpret a Form XObject into a figure node.
    fn figure(
        &self,
        name: String,
        id: Option<ObjectId>,
        stream: &Stream,
        parent_resources: &[&Dictionary],
        walk: &mut Walk,
    ) -> Figure {
        let mut figure = Figure::new(name);

        let mut resources: Vec<&Dictionary> = stream
            .dict
            .get(b"Resources")
            .and_then(|o| self.doc.dereference(o))
            .and_then(|(_, o)| o.as_dict())
            .into_iter()
            .collect();
        resources.extend_from_slice(parent_resources);

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        match Content::decode(&data) {
            Ok(content) => {
                walk.active_forms.extend(id);
                walk.depth += 1;
                figure.items = self.interpret(&content.operations, &resources, walk);
                walk.depth -= 1;
                if id.is_some() {
                    walk.active_forms.pop();
                }
            }
            Err(e) => log::warn!("Could not decode Form XObject /{}: {}", figure.name, e),
        }

        figure
    }

    /// Copy an image XObject into a library-agnostic node.
    fn raw_image(&self, name: String, stream: &Stream) -> RawImage {
        let dict = &stream.dict;
        let filters = stream.filters().unwrap_or_default();
        RawImage {
            name,
            width: dict.get(b"Width").and_then(|o| self.resolve_i64(o)).ok(),
            height: dict.get(b"Height").and_then(|o| self.resolve_i64(o)).ok(),
            color_space: self.color_space_name(dict),
            bits_per_component: dict
                .get(b"BitsPerComponent")
                .and_then(|o| self.resolve_i64(o))
                .ok(),
            predictor: self.predictor(dict, &filters),
            filters,
            data: stream.content.clone(),
        }
    }

    /// Color space family name; ICC profiles are reported as the device
    /// space with the same number of components.
    fn color_space_name(&self, dict: &Dictionary) -> Option<String> {
        let (_, color_space) = self.doc.dereference(dict.get(b"ColorSpace").ok()?).ok()?;
        match color_space {
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            Object::Array(parts) => {
                let family = parts.first()?.as_name_str().ok()?;
                if family != "ICCBased" {
                    return Some(family.to_string());
                }
                let (_, profile) = self.doc.dereference(parts.get(1)?).ok()?;
                let components = profile.as_stream().ok()?.dict.get(b"N").ok()?.as_i64().ok()?;
                let device = match components {
                    1 => "DeviceGray",
                    3 => "DeviceRGB",
                    4 => "DeviceCMYK",
                    _ => family,
                };
                Some(device.to_string())
            }
            _ => None,
        }
    }

    /// `/Predictor` of the Flate filter. An array of `/DecodeParms` is
    /// matched to `/Filter` by position.
    fn predictor(&self, dict: &Dictionary, filters: &[String]) -> Option<i64> {
        let position = filters
            .iter()
            .position(|f| f == "FlateDecode" || f == "Fl")?;
        let (_, params) = self.doc.dereference(dict.get(b"DecodeParms").ok()?).ok()?;
        let params = match params {
            Object::Array(entries) => self.doc.dereference(entries.get(position)?).ok()?.1,
            other => other,
        };
        params.as_dict().ok()?.get(b"Predictor").ok()?.as_i64().ok()
    }

    fn resolve_i64(&self, object: &Object) -> lopdf::Result<i64> {
        self.doc.dereference(object).and_then(|(_, o)| o.as_i64())
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn layout_page(&self, page_number: u32, page: PageId) -> Result<LayoutPage> {
        let mut layout = LayoutPage::new().with_rotation(self.inherited_rotation(page));

        match self.doc.extract_text(&[page_number]) {
            Ok(text) if !text.trim().is_empty() => layout.groups.push(TextGroup::new(text)),
            Ok(_) => {}
            Err(e) => layout.text_error = Some(e.to_string()),
        }

        let data = self.doc.get_page_content(page)?;
        if !data.is_empty() {
            let content = Content::decode(&data)?;
            let resources = self.page_resources(page)?;
            layout.items = self.interpret(&content.operations, &resources, &mut Walk::new(page_number));
        }

        Ok(layout)
    }

    fn info(&self) -> Result<Vec<(String, PdfValue)>> {
        let Ok(info) = self.doc.trailer.get(b"Info") else {
            return Ok(Vec::new());
        };
        let (_, info) = self
            .doc
            .dereference(info)
            .map_err(|_| Error::MissingObject("document information dictionary".to_string()))?;

        Ok(info
            .as_dict()?
            .iter()
            .map(|(key, value)| {
                let value = self
                    .doc
                    .dereference(value)
                    .map(|(_, v)| convert_object(v))
                    .unwrap_or(PdfValue::Other);
                (String::from_utf8_lossy(key).into_owned(), value)
            })
            .collect())
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Boolean(b) => PdfValue::Boolean(*b),
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        _ => PdfValue::Other,
    }
}

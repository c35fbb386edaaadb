//! PDF fixtures built with lopdf.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// An XObject placed on a page, possibly nested inside forms.
pub enum XObject {
    Image(Stream),
    Form(Vec<(String, XObject)>),
    /// A form that runs `/<name> Do` `calls` times, with `<name>` bound to
    /// the form itself, then draws `/Im`.
    Recursive {
        name: String,
        calls: usize,
        image: Stream,
    },
    /// A chain of `depth` forms, each drawing the next one twice (as `/A`
    /// and `/B`). The last form draws `/Im`.
    Fanout { depth: usize, image: Stream },
}

/// A form that draws itself before drawing a one-pixel image.
pub fn recursive_form(name: &str, calls: usize) -> XObject {
    XObject::Recursive {
        name: name.to_string(),
        calls,
        image: image_stream(1, 1, "DeviceGray", 8, vec![0]),
    }
}

/// A non-cyclic chain of forms whose expansion doubles at every level.
pub fn fanout_forms(depth: usize) -> XObject {
    XObject::Fanout {
        depth,
        image: image_stream(1, 1, "DeviceGray", 8, vec![0]),
    }
}

pub fn gray_image(width: i64, height: i64, data: Vec<u8>) -> XObject {
    XObject::Image(image_stream(width, height, "DeviceGray", 8, data))
}

pub fn rgb_image(width: i64, height: i64, data: Vec<u8>) -> XObject {
    XObject::Image(image_stream(width, height, "DeviceRGB", 8, data))
}

pub fn bilevel_image(width: i64, height: i64, data: Vec<u8>) -> XObject {
    XObject::Image(image_stream(width, height, "DeviceGray", 1, data))
}

/// A gray image whose samples are zlib compressed.
pub fn flate_gray_image(width: i64, height: i64, samples: &[u8]) -> XObject {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(samples).unwrap();
    let mut stream = image_stream(width, height, "DeviceGray", 8, encoder.finish().unwrap());
    stream.dict.set("Filter", "FlateDecode");
    XObject::Image(stream)
}

/// A bilevel image using a filter nobody decodes.
pub fn jbig2_image(width: i64, height: i64) -> XObject {
    let mut stream = image_stream(width, height, "DeviceGray", 1, vec![0; 8]);
    stream.dict.set("Filter", "JBIG2Decode");
    XObject::Image(stream)
}

fn image_stream(width: i64, height: i64, color_space: &str, bits: i64, data: Vec<u8>) -> Stream {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "ColorSpace" => color_space,
        "BitsPerComponent" => bits,
    };
    Stream::new(dict, data)
}

/// One page of a fixture.
#[derive(Default)]
pub struct FixturePage {
    lines: Vec<String>,
    xobjects: Vec<(String, XObject)>,
    rotate: Option<i64>,
    broken_font: bool,
}

impl FixturePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn xobject(mut self, name: &str, xobject: XObject) -> Self {
        self.xobjects.push((name.to_string(), xobject));
        self
    }

    pub fn rotate(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    /// Use a font whose encoding lopdf cannot resolve.
    pub fn broken_font(mut self) -> Self {
        self.broken_font = true;
        self
    }
}

/// Builds a complete PDF file page by page.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    pages_rotate: Option<i64>,
    info: Dictionary,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            pages_rotate: None,
            info: Dictionary::new(),
        }
    }

    /// Rotation set on the page tree root, inherited by pages without one.
    pub fn inherited_rotate(mut self, degrees: i64) -> Self {
        self.pages_rotate = Some(degrees);
        self
    }

    pub fn info(mut self, key: &str, value: Object) -> Self {
        self.info.set(key, value);
        self
    }

    pub fn page(mut self, fixture: FixturePage) -> Self {
        let font = if fixture.broken_font {
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type0",
                "BaseFont" => "Missing",
                "Encoding" => "Identity-H",
            }
        } else {
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            }
        };
        let font_id = self.doc.add_object(font);

        let mut operations = Vec::new();
        for (i, line) in fixture.lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![72.into(), (720 - 14 * i as i64).into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
            operations.push(Operation::new("ET", vec![]));
        }

        let mut xobjects = Dictionary::new();
        for (name, xobject) in fixture.xobjects {
            operations.push(Operation::new("Do", vec![name.as_str().into()]));
            let id = self.add_xobject(xobject);
            xobjects.set(name, id);
        }

        let content = Content { operations }.encode().unwrap();
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => rect(612, 792),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
        };
        if let Some(rotate) = fixture.rotate {
            page.set("Rotate", rotate);
        }
        let page_id = self.doc.add_object(page);
        self.kids.push(page_id.into());
        self
    }

    fn add_xobject(&mut self, xobject: XObject) -> ObjectId {
        match xobject {
            XObject::Image(stream) => self.doc.add_object(stream),
            XObject::Form(children) => {
                let mut operations = Vec::new();
                let mut xobjects = Dictionary::new();
                for (name, child) in children {
                    operations.push(Operation::new("Do", vec![name.as_str().into()]));
                    let id = self.add_xobject(child);
                    xobjects.set(name, id);
                }
                self.doc.add_object(form_stream(operations, xobjects))
            }
            XObject::Recursive { name, calls, image } => {
                let form_id = self.doc.new_object_id();
                let image_id = self.doc.add_object(image);
                let mut operations: Vec<_> = (0..calls)
                    .map(|_| Operation::new("Do", vec![name.as_str().into()]))
                    .collect();
                operations.push(Operation::new("Do", vec!["Im".into()]));
                let xobjects = dictionary! { name => form_id, "Im" => image_id };
                self.doc
                    .objects
                    .insert(form_id, form_stream(operations, xobjects).into());
                form_id
            }
            XObject::Fanout { depth, image } => {
                let image_id = self.doc.add_object(image);
                let mut next = self.doc.add_object(form_stream(
                    vec![Operation::new("Do", vec!["Im".into()])],
                    dictionary! { "Im" => image_id },
                ));
                for _ in 1..depth {
                    let operations = vec![
                        Operation::new("Do", vec!["A".into()]),
                        Operation::new("Do", vec!["B".into()]),
                    ];
                    next = self
                        .doc
                        .add_object(form_stream(operations, dictionary! { "A" => next, "B" => next }));
                }
                next
            }
        }
    }

    pub fn build(mut self) -> Vec<u8> {
        let count = self.kids.len() as i64;
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
        };
        if let Some(rotate) = self.pages_rotate {
            pages.set("Rotate", rotate);
        }
        self.doc.objects.insert(self.pages_id, pages.into());

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        if !self.info.is_empty() {
            let info_id = self.doc.add_object(self.info);
            self.doc.trailer.set("Info", info_id);
        }

        let mut data = Vec::new();
        self.doc.save_to(&mut data).unwrap();
        data
    }

    /// Build and write the file into `dir`.
    pub fn write(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

/// Text lines of the pangram fixture.
pub const PANGRAMS: [&str; 3] = [
    "The quick brown fox jumps over the lazy dog.",
    "Pack my box with five dozen liquor jugs.",
    "Sphinx of black quartz, judge my vow.",
];

/// A one-page document with three lines of text.
pub fn pangram_pdf() -> PdfBuilder {
    let page = PANGRAMS
        .iter()
        .fold(FixturePage::new(), |page, line| page.text(line));
    PdfBuilder::new().page(page)
}

fn form_stream(operations: Vec<Operation>, xobjects: Dictionary) -> Stream {
    let content = Content { operations }.encode().unwrap();
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => rect(100, 100),
        "Resources" => dictionary! { "XObject" => xobjects },
    };
    Stream::new(dict, content)
}

fn rect(width: i64, height: i64) -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(width),
        Object::Integer(height),
    ]
}

//! Font resolution for PDF output.
//!
//! Each family is resolved once per document and cached by name:
//! registered font file first (embedded as TrueType), then the PDF
//! standard-14 fonts, then Helvetica.

use std::collections::HashMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use roadmapper_layout::{FontBook, FontFace};
use tracing::{debug, warn};

use super::flate_stream;

const FALLBACK: &str = "Helvetica";

const STANDARD_14: [&str; 14] = [
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
    "Symbol",
    "ZapfDingbats",
];

/// Characters of the WinAnsi 0x80..=0x9F block.
const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '€'),
    (0x82, '‚'),
    (0x83, 'ƒ'),
    (0x84, '„'),
    (0x85, '…'),
    (0x86, '†'),
    (0x87, '‡'),
    (0x88, 'ˆ'),
    (0x89, '‰'),
    (0x8A, 'Š'),
    (0x8B, '‹'),
    (0x8C, 'Œ'),
    (0x8E, 'Ž'),
    (0x91, '‘'),
    (0x92, '’'),
    (0x93, '“'),
    (0x94, '”'),
    (0x95, '•'),
    (0x96, '–'),
    (0x97, '—'),
    (0x98, '˜'),
    (0x99, '™'),
    (0x9A, 'š'),
    (0x9B, '›'),
    (0x9C, 'œ'),
    (0x9E, 'ž'),
    (0x9F, 'Ÿ'),
];

/// Encode text as WinAnsi bytes; unmappable characters become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if let Some((code, _)) = WIN_ANSI_HIGH.iter().find(|(_, ch)| *ch == c) {
                return *code;
            }
            match u32::from(c) {
                code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
                _ => b'?',
            }
        })
        .collect()
}

/// Character a WinAnsi code stands for.
pub fn win_ansi_char(code: u8) -> char {
    WIN_ANSI_HIGH
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(char::from(code), |(_, ch)| *ch)
}

/// A font usable in content streams.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontHandle {
    /// Resource name, e.g. `F1`
    pub resource: String,
    pub id: ObjectId,
    /// `BaseFont` written to the font dictionary
    pub base_font: String,
    pub embedded: bool,
}

/// Resolves family names to document fonts, once per name.
pub struct FontResolver<'b> {
    book: &'b FontBook,
    cache: HashMap<String, FontHandle>,
    order: Vec<String>,
}

impl<'b> FontResolver<'b> {
    pub fn new(book: &'b FontBook) -> Self {
        Self {
            book,
            cache: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Resolve `family`, adding font objects to `doc` the first time.
    pub fn resolve(&mut self, doc: &mut Document, family: &str) -> FontHandle {
        if let Some(handle) = self.cache.get(family) {
            return handle.clone();
        }

        let book = self.book;
        let handle = if let Some(face) = book.face(family) {
            let id = embed_truetype(doc, face);
            debug!(family, font = %face.postscript_name, "embedded font file");
            self.handle(id, &face.postscript_name, true)
        } else if STANDARD_14.contains(&family) {
            let id = doc.add_object(standard_font(family));
            self.handle(id, family, false)
        } else {
            warn!(family, "font not registered and not a standard PDF font, using Helvetica");
            self.resolve(doc, FALLBACK)
        };

        self.cache.insert(family.to_string(), handle.clone());
        handle
    }

    fn handle(&mut self, id: ObjectId, base_font: &str, embedded: bool) -> FontHandle {
        let resource = format!("F{}", self.order.len() + 1);
        self.order.push(resource.clone());
        FontHandle {
            resource,
            id,
            base_font: base_font.to_string(),
            embedded,
        }
    }

    /// Resource dictionary entries for every font resolved so far.
    pub fn resources(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        for handle in self.cache.values() {
            dict.set(handle.resource.as_bytes().to_vec(), handle.id);
        }
        dict
    }

    /// Number of distinct fonts added to the document.
    pub fn count(&self) -> usize {
        self.order.len()
    }
}

fn standard_font(name: &str) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(name.as_bytes().to_vec()),
    };
    if name != "Symbol" && name != "ZapfDingbats" {
        dict.set("Encoding", "WinAnsiEncoding");
    }
    dict
}

fn per_mille(face: &FontFace, value: i16) -> i64 {
    i64::from(value) * 1000 / i64::from(face.units_per_em)
}

fn embed_truetype(doc: &mut Document, face: &FontFace) -> ObjectId {
    let data = face.data.as_slice();
    let file = flate_stream(dictionary! { "Length1" => data.len() as i64 }, data);
    let file_id = doc.add_object(file);

    // Nonsymbolic, plus FixedPitch for monospaced faces
    let flags = if face.monospaced { 32 | 1 } else { 32 };
    let name = Object::Name(face.postscript_name.as_bytes().to_vec());
    let bbox: Vec<Object> = face.bbox.iter().map(|v| per_mille(face, *v).into()).collect();
    let descriptor = dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => name.clone(),
        "Flags" => flags,
        "FontBBox" => bbox,
        "ItalicAngle" => face.italic_angle,
        "Ascent" => per_mille(face, face.ascender),
        "Descent" => per_mille(face, face.descender),
        "CapHeight" => per_mille(face, face.cap_height),
        "StemV" => 80,
        "FontFile2" => file_id,
    };
    let descriptor_id = doc.add_object(descriptor);

    let widths: Vec<Object> = (32u8..=255)
        .map(|code| Object::Real(face.width_per_mille(win_ansi_char(code))))
        .collect();
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => name,
        "FirstChar" => 32,
        "LastChar" => 255,
        "Widths" => widths,
        "FontDescriptor" => descriptor_id,
        "Encoding" => "WinAnsiEncoding",
    })
}

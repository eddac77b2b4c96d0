//! Text metrics.
//!
//! Widths come from registered TrueType/OpenType files when a family has one,
//! otherwise from the built-in AFM tables of the PDF standard fonts. The PDF
//! writer resolves fonts through the same book, so measured and printed text
//! agree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use roadmapper_core::{TextMeasurer, TextMetrics, TextStyle, Typography};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FontError {
    #[error("Cannot read font file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse font file {0}")]
    Parse(PathBuf),
}

/// A parsed font file with the metrics needed for layout and PDF embedding.
///
/// Vertical metrics are in font units; divide by `units_per_em` and multiply
/// by the point size to get points.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub family: String,
    /// Family name stored in the font itself, as font databases know it
    pub family_name: String,
    pub path: PathBuf,
    pub postscript_name: String,
    pub data: Arc<Vec<u8>>,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub cap_height: i16,
    pub italic_angle: f32,
    pub bbox: [i16; 4],
    pub monospaced: bool,
    /// Advance widths in font units for code points 0..=255
    latin_advances: Vec<u16>,
    fallback_advance: u16,
}

impl FontFace {
    pub fn load(family: &str, path: &Path) -> Result<Self, FontError> {
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(family, path, data)
    }

    pub fn from_bytes(family: &str, path: &Path, data: Vec<u8>) -> Result<Self, FontError> {
        let face =
            ttf_parser::Face::parse(&data, 0).map_err(|_| FontError::Parse(path.to_path_buf()))?;

        let name = |id: u16| {
            face.names()
                .into_iter()
                .find(|n| n.name_id == id)
                .and_then(|n| n.to_string())
        };
        let postscript_name = name(ttf_parser::name_id::POST_SCRIPT_NAME)
            .or_else(|| name(ttf_parser::name_id::FULL_NAME))
            .unwrap_or_else(|| family.to_string())
            .replace(' ', "");
        let family_name = name(ttf_parser::name_id::TYPOGRAPHIC_FAMILY)
            .or_else(|| name(ttf_parser::name_id::FAMILY))
            .unwrap_or_else(|| family.to_string());

        let advance = |c: char| {
            face.glyph_index(c)
                .and_then(|gid| face.glyph_hor_advance(gid))
        };
        let units_per_em = face.units_per_em();
        let fallback_advance = advance(' ').unwrap_or(units_per_em / 2);
        let latin_advances = (0u8..=255)
            .map(|b| advance(char::from(b)).unwrap_or(fallback_advance))
            .collect();

        let bbox = face.global_bounding_box();
        let ascender = face.ascender();
        let cap_height = face.capital_height().unwrap_or(ascender);

        Ok(Self {
            family: family.to_string(),
            family_name,
            path: path.to_path_buf(),
            postscript_name,
            units_per_em,
            ascender,
            descender: face.descender(),
            cap_height,
            italic_angle: face.italic_angle(),
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            monospaced: face.is_monospaced(),
            latin_advances,
            fallback_advance,
            data: Arc::new(data),
        })
    }

    /// Advance of `c` in font units.
    pub fn advance(&self, c: char) -> u16 {
        let code = c as u32;
        if code < 256 {
            return self.latin_advances[code as usize];
        }
        ttf_parser::Face::parse(&self.data, 0)
            .ok()
            .and_then(|face| face.glyph_index(c).and_then(|g| face.glyph_hor_advance(g)))
            .unwrap_or(self.fallback_advance)
    }

    /// Advance of `c` scaled to 1000 units per em, as PDF `/Widths` expects.
    pub fn width_per_mille(&self, c: char) -> f32 {
        f32::from(self.advance(c)) * 1000.0 / f32::from(self.units_per_em)
    }

    fn measure(&self, text: &str, size: f32) -> TextMetrics {
        let scale = size / f32::from(self.units_per_em);
        let units: u32 = text.chars().map(|c| u32::from(self.advance(c))).sum();
        TextMetrics {
            width: units as f32 * scale,
            ascent: f32::from(self.ascender) * scale,
            descent: -f32::from(self.descender) * scale,
        }
    }
}

// ============================================================================
// Standard fonts
// ============================================================================

/// Helvetica advance widths for ASCII 32..=126, 1000 units per em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {..~
];

const HELVETICA_ASCENT: f32 = 718.0;
const HELVETICA_DESCENT: f32 = 207.0;
const COURIER_WIDTH: f32 = 600.0;
const COURIER_ASCENT: f32 = 629.0;
const COURIER_DESCENT: f32 = 157.0;

fn standard_metrics(family: &str, text: &str, size: f32) -> TextMetrics {
    let scale = size / 1000.0;
    if family.starts_with("Courier") {
        return TextMetrics {
            width: text.chars().count() as f32 * COURIER_WIDTH * scale,
            ascent: COURIER_ASCENT * scale,
            descent: COURIER_DESCENT * scale,
        };
    }
    // Times and the other standard faces are close enough to Helvetica for
    // layout purposes.
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => u32::from(HELVETICA_WIDTHS[(code - 32) as usize]),
            _ => 556,
        })
        .sum();
    TextMetrics {
        width: units as f32 * scale,
        ascent: HELVETICA_ASCENT * scale,
        descent: HELVETICA_DESCENT * scale,
    }
}

// ============================================================================
// Font book
// ============================================================================

/// Registered font files keyed by family.
///
/// Families without a file are measured with the fallback face when the book
/// has one, otherwise with the standard-font tables.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: HashMap<String, Arc<FontFace>>,
    fallback: Option<Arc<FontFace>>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book with every font file of `typography` registered.
    ///
    /// Files that cannot be read or parsed are skipped with a warning; text in
    /// those families falls back to the standard metrics.
    pub fn from_typography(typography: &Typography) -> Self {
        let mut book = Self::new();
        book.register_typography(typography);
        book
    }

    pub fn register_typography(&mut self, typography: &Typography) {
        for (family, path) in &typography.font_files {
            self.register_or_warn(family, path);
        }
        if let Some(body) = &typography.body_font {
            if let Some(path) = &body.file {
                self.register_or_warn(&body.name, path);
            }
        }
    }

    fn register_or_warn(&mut self, family: &str, path: &Path) {
        if self.faces.contains_key(family) {
            return;
        }
        if let Err(err) = self.register(family, path) {
            warn!(family, error = %err, "font registration failed, using Helvetica metrics");
        }
    }

    pub fn register(&mut self, family: &str, path: &Path) -> Result<(), FontError> {
        let face = FontFace::load(family, path)?;
        debug!(family, font = %face.postscript_name, "registered font file");
        self.faces.insert(family.to_string(), Arc::new(face));
        Ok(())
    }

    /// Measure every unregistered family with `face`.
    #[must_use]
    pub fn with_fallback(mut self, face: FontFace) -> Self {
        self.fallback = Some(Arc::new(face));
        self
    }

    /// The face registered for exactly `family`.
    pub fn face(&self, family: &str) -> Option<&Arc<FontFace>> {
        self.faces.get(family)
    }

    /// Registered faces, without the fallback.
    pub fn faces(&self) -> impl Iterator<Item = &Arc<FontFace>> {
        self.faces.values()
    }

    pub fn fallback(&self) -> Option<&Arc<FontFace>> {
        self.fallback.as_ref()
    }

    /// The face text in `family` is measured with: its registered file, else
    /// the fallback face.
    pub fn measuring_face(&self, family: &str) -> Option<&Arc<FontFace>> {
        self.faces.get(family).or(self.fallback.as_ref())
    }

}

impl TextMeasurer for FontBook {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        match self.measuring_face(&style.family) {
            Some(face) => face.measure(text, style.size),
            None => standard_metrics(&style.family, text, style.size),
        }
    }
}

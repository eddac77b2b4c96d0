//! Drawing surfaces.
//!
//! Painters issue every primitive in top-down canvas coordinates. The SVG
//! surface writes them as they are; the PDF page flips them at its own
//! boundary.

use std::path::Path;

use base64::Engine as _;
use roadmapper_core::{Colour, LineStyle, TextStyle};
use roadmapper_layout::{FontBook, Point, Rect, TextBox};
use svg::node::element::{Image, Line, Polygon, Rectangle, Text};
use svg::{Document, Node};
use tracing::warn;

/// Where a clickable area leads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    /// A named destination inside the same document
    Named(String),
    /// An external URL
    Uri(String),
}

/// Minimal drawing API shared by the raster and PDF backends.
pub trait Surface {
    /// Canvas width and height.
    fn size(&self) -> (f32, f32);

    fn fill_rect(&mut self, rect: Rect, colour: Colour);

    fn fill_round_rect(&mut self, rect: Rect, radius: f32, colour: Colour);

    /// Closed polygon through `points`.
    fn fill_polygon(&mut self, points: &[Point], colour: Colour);

    fn stroke_line(&mut self, from: Point, to: Point, colour: Colour, width: f32, style: LineStyle);

    /// Draw `text` with its baseline starting at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle, colour: Colour);

    /// Draw the image file at `path` scaled into `rect`. Unreadable images
    /// are skipped with a warning.
    fn draw_image(&mut self, path: &Path, rect: Rect);

    /// Make `rect` clickable. Surfaces without interactivity ignore it.
    fn link(&mut self, _rect: Rect, _target: LinkTarget) {}

    fn draw_text_box(&mut self, text: &TextBox) {
        self.draw_text(
            &text.text,
            Point::new(text.x, text.baseline),
            &text.style,
            text.colour,
        );
    }
}

// ============================================================================
// SVG
// ============================================================================

/// Builds an `svg::Document` of a fixed canvas size.
///
/// Text names the family of the face it was measured with, so a rasteriser
/// that has the book's faces loaded draws exactly the measured glyphs.
pub struct SvgSurface {
    width: f32,
    height: f32,
    document: Document,
    fonts: FontBook,
}

impl SvgSurface {
    pub fn new(width: f32, height: f32) -> Self {
        let document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg");
        Self {
            width,
            height,
            document,
            fonts: FontBook::default(),
        }
    }

    /// Name text families after the faces `fonts` measures them with.
    #[must_use]
    pub fn with_fonts(mut self, fonts: &FontBook) -> Self {
        self.fonts = fonts.clone();
        self
    }

    fn font_family(&self, style: &TextStyle) -> String {
        match self.fonts.measuring_face(&style.family) {
            Some(face) => format!("'{}', sans-serif", face.family_name),
            None => format!("'{}', Helvetica, Arial, sans-serif", style.family),
        }
    }

    fn push<T: Into<Box<dyn Node>>>(&mut self, node: T) {
        let document = std::mem::replace(&mut self.document, Document::new());
        self.document = document.add(node);
    }

    /// Serialised SVG text.
    pub fn finish(self) -> String {
        self.document.to_string()
    }
}

fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

impl Surface for SvgSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: Rect, colour: Colour) {
        self.push(
            Rectangle::new()
                .set("x", rect.x)
                .set("y", rect.y)
                .set("width", rect.width)
                .set("height", rect.height)
                .set("fill", colour.to_hex()),
        );
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f32, colour: Colour) {
        self.push(
            Rectangle::new()
                .set("x", rect.x)
                .set("y", rect.y)
                .set("width", rect.width)
                .set("height", rect.height)
                .set("rx", radius)
                .set("ry", radius)
                .set("fill", colour.to_hex()),
        );
    }

    fn fill_polygon(&mut self, points: &[Point], colour: Colour) {
        let points = points
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        self.push(
            Polygon::new()
                .set("points", points)
                .set("fill", colour.to_hex()),
        );
    }

    fn stroke_line(&mut self, from: Point, to: Point, colour: Colour, width: f32, style: LineStyle) {
        let mut line = Line::new()
            .set("x1", from.x)
            .set("y1", from.y)
            .set("x2", to.x)
            .set("y2", to.y)
            .set("stroke", colour.to_hex())
            .set("stroke-width", width);
        if style == LineStyle::Dashed {
            line = line.set("stroke-dasharray", "6 4");
        }
        self.push(line);
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle, colour: Colour) {
        let family = self.font_family(style);
        self.push(
            Text::new(text)
                .set("x", origin.x)
                .set("y", origin.y)
                .set("font-family", family)
                .set("font-size", style.size)
                .set("fill", colour.to_hex()),
        );
    }

    fn draw_image(&mut self, path: &Path, rect: Rect) {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "image could not be read, skipped");
                return;
            }
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.push(
            Image::new()
                .set("x", rect.x)
                .set("y", rect.y)
                .set("width", rect.width)
                .set("height", rect.height)
                .set("preserveAspectRatio", "xMidYMid meet")
                .set("href", format!("data:{};base64,{encoded}", mime_type(path))),
        );
    }
}

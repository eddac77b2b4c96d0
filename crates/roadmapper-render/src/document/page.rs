//! A PDF page as a drawing surface.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, StringFormat};
use roadmapper_core::{Colour, LineStyle, TextStyle};
use roadmapper_layout::{Point, Rect};

use super::fonts::to_win_ansi;
use super::{flate_stream, PdfWriter};
use crate::surface::{LinkTarget, Surface};
use crate::RenderError;

/// Control point distance for a quarter circle drawn with one cubic Bézier.
const KAPPA: f32 = 0.552_284_8;

/// Maps top-down canvas coordinates to bottom-up PDF coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DocTransform {
    height: f32,
}

impl DocTransform {
    pub const fn new(height: f32) -> Self {
        Self { height }
    }

    /// PDF y of a canvas y.
    pub fn y(&self, canvas_y: f32) -> f32 {
        self.height - canvas_y
    }

    /// Canvas y of a PDF y.
    pub fn canvas_y(&self, doc_y: f32) -> f32 {
        self.height - doc_y
    }

    /// PDF y of the bottom edge of a canvas rectangle.
    pub fn rect_bottom(&self, rect: &Rect) -> f32 {
        self.height - (rect.y + rect.height)
    }

    /// PDF rectangle array `[llx lly urx ury]`.
    pub fn pdf_rect(&self, rect: &Rect) -> [f32; 4] {
        [rect.x, self.rect_bottom(rect), rect.right(), self.y(rect.y)]
    }
}

fn colour_operands(colour: Colour) -> Vec<Object> {
    colour.unit().iter().map(|c| Object::Real(*c)).collect()
}

/// Collects the content stream, XObjects and link annotations of one page.
pub struct PdfPage<'w, 'b> {
    writer: &'w mut PdfWriter<'b>,
    width: f32,
    height: f32,
    transform: DocTransform,
    content: Content,
    xobjects: Dictionary,
    links: Vec<(Rect, LinkTarget)>,
}

impl<'w, 'b> PdfPage<'w, 'b> {
    pub(crate) fn new(writer: &'w mut PdfWriter<'b>, width: f32, height: f32) -> Self {
        Self {
            writer,
            width,
            height,
            transform: DocTransform::new(height),
            content: Content { operations: vec![] },
            xobjects: Dictionary::new(),
            links: Vec::new(),
        }
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.content
            .operations
            .push(Operation::new(operator, operands));
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.op("m", vec![x.into(), y.into()]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.op("l", vec![x.into(), y.into()]);
    }

    fn curve_to(&mut self, points: [f32; 6]) {
        self.op("c", points.iter().map(|v| Object::Real(*v)).collect());
    }

    /// Write the page objects and return the page id.
    pub(crate) fn finish(self) -> Result<ObjectId, RenderError> {
        let encoded = self.content.encode()?;
        let writer = self.writer;
        let contents = writer
            .document
            .add_object(flate_stream(Dictionary::new(), &encoded));

        let mut resources = dictionary! { "Font" => writer.font_dict_id };
        if !self.xobjects.is_empty() {
            resources.set("XObject", self.xobjects);
        }

        let annots: Vec<Object> = self
            .links
            .iter()
            .map(|(rect, target)| {
                let action = match target {
                    LinkTarget::Named(dest) => dictionary! {
                        "Type" => "Action",
                        "S" => "GoTo",
                        "D" => Object::Name(dest.as_bytes().to_vec()),
                    },
                    LinkTarget::Uri(url) => dictionary! {
                        "Type" => "Action",
                        "S" => "URI",
                        "URI" => Object::String(url.as_bytes().to_vec(), StringFormat::Literal),
                    },
                };
                let area: Vec<Object> = self
                    .transform
                    .pdf_rect(rect)
                    .iter()
                    .map(|v| Object::Real(*v))
                    .collect();
                let annot = dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => area,
                    "Border" => vec![0.into(), 0.into(), 0.into()],
                    "A" => action,
                };
                Object::Reference(writer.document.add_object(annot))
            })
            .collect();

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => writer.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), self.width.into(), self.height.into()],
            "Contents" => contents,
            "Resources" => resources,
        };
        if !annots.is_empty() {
            page.set("Annots", annots);
        }
        let id = writer.document.add_object(page);
        writer.page_ids.push(id);
        Ok(id)
    }
}

impl Surface for PdfPage<'_, '_> {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: Rect, colour: Colour) {
        self.op("rg", colour_operands(colour));
        let y = self.transform.rect_bottom(&rect);
        self.op(
            "re",
            vec![rect.x.into(), y.into(), rect.width.into(), rect.height.into()],
        );
        self.op("f", vec![]);
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f32, colour: Colour) {
        let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        if r == 0.0 {
            self.fill_rect(rect, colour);
            return;
        }
        let k = KAPPA * r;
        let (x, y) = (rect.x, self.transform.rect_bottom(&rect));
        let (right, top) = (x + rect.width, y + rect.height);

        self.op("rg", colour_operands(colour));
        self.move_to(x + r, y);
        self.line_to(right - r, y);
        self.curve_to([right - r + k, y, right, y + r - k, right, y + r]);
        self.line_to(right, top - r);
        self.curve_to([right, top - r + k, right - r + k, top, right - r, top]);
        self.line_to(x + r, top);
        self.curve_to([x + r - k, top, x, top - r + k, x, top - r]);
        self.line_to(x, y + r);
        self.curve_to([x, y + r - k, x + r - k, y, x + r, y]);
        self.op("h", vec![]);
        self.op("f", vec![]);
    }

    fn fill_polygon(&mut self, points: &[Point], colour: Colour) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.op("rg", colour_operands(colour));
        self.move_to(first.x, self.transform.y(first.y));
        for p in rest {
            self.line_to(p.x, self.transform.y(p.y));
        }
        self.op("h", vec![]);
        self.op("f", vec![]);
    }

    fn stroke_line(&mut self, from: Point, to: Point, colour: Colour, width: f32, style: LineStyle) {
        self.op("q", vec![]);
        self.op("w", vec![width.into()]);
        self.op("RG", colour_operands(colour));
        if style == LineStyle::Dashed {
            self.op("d", vec![Object::Array(vec![6.into(), 4.into()]), 0.into()]);
        }
        self.move_to(from.x, self.transform.y(from.y));
        self.line_to(to.x, self.transform.y(to.y));
        self.op("S", vec![]);
        self.op("Q", vec![]);
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle, colour: Colour) {
        let font = self
            .writer
            .fonts
            .resolve(&mut self.writer.document, &style.family);
        self.op("BT", vec![]);
        self.op("rg", colour_operands(colour));
        self.op(
            "Tf",
            vec![Object::Name(font.resource.into_bytes()), style.size.into()],
        );
        let y = self.transform.y(origin.y);
        self.op("Td", vec![origin.x.into(), y.into()]);
        self.op(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
    }

    fn draw_image(&mut self, path: &Path, rect: Rect) {
        let Some((id, w, h)) = self.writer.image(path) else {
            return;
        };
        // Fit inside the box, keeping the aspect ratio
        let scale = (rect.width / w as f32).min(rect.height / h as f32);
        let (dw, dh) = (w as f32 * scale, h as f32 * scale);
        let placed = Rect::new(
            rect.x + (rect.width - dw) / 2.0,
            rect.y + (rect.height - dh) / 2.0,
            dw,
            dh,
        );

        let name = format!("Im{}", self.xobjects.len() + 1);
        self.xobjects.set(name.as_bytes().to_vec(), id);
        let y = self.transform.rect_bottom(&placed);
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                dw.into(),
                0.into(),
                0.into(),
                dh.into(),
                placed.x.into(),
                y.into(),
            ],
        );
        self.op("Do", vec![Object::Name(name.into_bytes())]);
        self.op("Q", vec![]);
    }

    fn link(&mut self, rect: Rect, target: LinkTarget) {
        self.links.push((rect, target));
    }
}

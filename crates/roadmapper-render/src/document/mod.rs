//! Interactive PDF output.
//!
//! Page order is the overview, then for every detail task (groups, tasks,
//! then each task's parallel tasks) its detail page, immediately followed
//! by its nested roadmap page when it has one.
//!
//! Every nested roadmap is built and laid out before the first object is
//! written. A builder failure aborts the whole document with the label of
//! the task that owns it.

mod detail;
mod fonts;
mod page;

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use roadmapper_core::Roadmap;
use roadmapper_layout::{FontBook, LayoutEngine, LayoutSettings, RoadmapLayout};
use tracing::{debug, warn};

pub use detail::DEFAULT_BODY;
pub use fonts::{to_win_ansi, FontHandle, FontResolver};
pub use page::DocTransform;

use page::PdfPage;

use detail::{nav_button, DetailFonts, DetailPage};

use crate::overview;
use crate::surface::{LinkTarget, Surface};
use crate::{RenderError, Renderer};

/// Named destination of the overview page.
pub const OVERVIEW_DEST: &str = "roadmap_overview";

const PRODUCER: &str = "roadmapper";

/// Deflate `data` into a stream. Falls back to an unfiltered stream if
/// compression fails.
pub(crate) fn flate_stream(mut dict: Dictionary, data: &[u8]) -> Stream {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    match encoder.write_all(data).and_then(|()| encoder.finish()) {
        Ok(compressed) => {
            dict.set("Filter", "FlateDecode");
            Stream::new(dict, compressed)
        }
        Err(err) => {
            warn!(error = %err, "stream compression failed, writing it uncompressed");
            Stream::new(dict, data.to_vec())
        }
    }
}

// ============================================================================
// Writer state
// ============================================================================

/// Document under construction.
pub(crate) struct PdfWriter<'b> {
    pub(crate) document: Document,
    pub(crate) pages_id: ObjectId,
    pub(crate) font_dict_id: ObjectId,
    pub(crate) page_ids: Vec<ObjectId>,
    pub(crate) fonts: FontResolver<'b>,
    images: HashMap<PathBuf, Option<(ObjectId, u32, u32)>>,
    dests: BTreeMap<String, ObjectId>,
}

impl<'b> PdfWriter<'b> {
    fn new(book: &'b FontBook) -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let font_dict_id = document.new_object_id();
        Self {
            document,
            pages_id,
            font_dict_id,
            page_ids: Vec::new(),
            fonts: FontResolver::new(book),
            images: HashMap::new(),
            dests: BTreeMap::new(),
        }
    }

    fn page(&mut self, width: f32, height: f32) -> PdfPage<'_, 'b> {
        PdfPage::new(self, width, height)
    }

    fn bookmark(&mut self, name: impl Into<String>, page: ObjectId) {
        self.dests.insert(name.into(), page);
    }

    /// Image XObject for `path` with its pixel size, loaded once.
    pub(crate) fn image(&mut self, path: &Path) -> Option<(ObjectId, u32, u32)> {
        if let Some(cached) = self.images.get(path) {
            return *cached;
        }
        let loaded = match image_xobject(&mut self.document, path) {
            Ok(loaded) => Some(loaded),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "image skipped");
                None
            }
        };
        self.images.insert(path.to_path_buf(), loaded);
        loaded
    }

    fn finish(mut self, title: &str, outline: &OutlineNode) -> Result<Vec<u8>, RenderError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.page_ids.len() as i64,
            }),
        );
        self.document
            .objects
            .insert(self.font_dict_id, Object::Dictionary(self.fonts.resources()));

        let mut dests = Dictionary::new();
        for (name, page) in &self.dests {
            dests.set(
                name.as_bytes().to_vec(),
                vec![Object::Reference(*page), "Fit".into()],
            );
        }
        let outlines_id = write_outline(&mut self.document, outline, &self.dests);

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
            "Dests" => dests,
            "Outlines" => outlines_id,
            "PageMode" => "UseOutlines",
        });
        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::String(to_win_ansi(title), StringFormat::Literal),
            "Producer" => Object::string_literal(PRODUCER),
        });
        self.document.trailer.set("Root", catalog_id);
        self.document.trailer.set("Info", info_id);

        let mut out = Vec::new();
        self.document.save_to(&mut out)?;
        debug!(pages = self.page_ids.len(), fonts = self.fonts.count(), bytes = out.len(), "wrote PDF");
        Ok(out)
    }
}

fn image_xobject(doc: &mut Document, path: &Path) -> Result<(ObjectId, u32, u32), RenderError> {
    let image = image::open(path)
        .map_err(|err| RenderError::Image(format!("{}: {err}", path.display())))?
        .to_rgba8();
    let (width, height) = image.dimensions();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in image.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    if alpha.iter().any(|a| *a < u8::MAX) {
        let mask = flate_stream(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            &alpha,
        );
        dict.set("SMask", doc.add_object(mask));
    }
    let id = doc.add_object(flate_stream(dict, &rgb));
    Ok((id, width, height))
}

// ============================================================================
// Outline
// ============================================================================

/// One bookmark and its children.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineNode {
    pub title: String,
    pub dest: String,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn new(title: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            dest: dest.into(),
            children: Vec::new(),
        }
    }

    /// Number of open descendants.
    fn visible(&self) -> i64 {
        self.children.iter().map(|c| 1 + c.visible()).sum()
    }
}

fn write_outline(
    doc: &mut Document,
    root: &OutlineNode,
    dests: &BTreeMap<String, ObjectId>,
) -> ObjectId {
    let outlines_id = doc.new_object_id();
    let root_id = doc.new_object_id();
    write_outline_items(doc, std::slice::from_ref(root), &[root_id], outlines_id, dests);
    doc.objects.insert(
        outlines_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => root_id,
            "Last" => root_id,
            "Count" => 1 + root.visible(),
        }),
    );
    outlines_id
}

fn write_outline_items(
    doc: &mut Document,
    items: &[OutlineNode],
    ids: &[ObjectId],
    parent: ObjectId,
    dests: &BTreeMap<String, ObjectId>,
) {
    for (i, (item, id)) in items.iter().zip(ids).enumerate() {
        let mut dict = dictionary! {
            "Title" => Object::String(to_win_ansi(&item.title), StringFormat::Literal),
            "Parent" => parent,
        };
        if dests.contains_key(&item.dest) {
            dict.set("Dest", Object::Name(item.dest.as_bytes().to_vec()));
        }
        if i > 0 {
            dict.set("Prev", ids[i - 1]);
        }
        if let Some(next) = ids.get(i + 1) {
            dict.set("Next", *next);
        }
        if !item.children.is_empty() {
            let child_ids: Vec<ObjectId> =
                item.children.iter().map(|_| doc.new_object_id()).collect();
            dict.set("First", child_ids[0]);
            dict.set("Last", child_ids[child_ids.len() - 1]);
            dict.set("Count", item.visible());
            write_outline_items(doc, &item.children, &child_ids, *id, dests);
        }
        doc.objects.insert(*id, Object::Dictionary(dict));
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Interactive PDF renderer configuration
#[derive(Clone, Debug, Default)]
pub struct PdfRenderer {
    pub settings: LayoutSettings,
    /// Date used for undated markers; the local date when unset
    pub today: Option<NaiveDate>,
}

/// A nested roadmap ready to paint.
struct NestedPage {
    task: String,
    roadmap: Roadmap,
    layout: RoadmapLayout,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: LayoutSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn engine<'m>(&self, fonts: &'m FontBook) -> LayoutEngine<'m> {
        let engine = LayoutEngine::new(fonts).settings(self.settings.clone());
        match self.today {
            Some(today) => engine.today(today),
            None => engine,
        }
    }

    /// Build every nested roadmap once, keyed by the owning task's identifier.
    fn build_nested(
        &self,
        roadmap: &Roadmap,
        layout: &RoadmapLayout,
        fonts: &mut FontBook,
    ) -> Result<HashMap<String, (String, Roadmap)>, RenderError> {
        let mut built = HashMap::new();
        for task_layout in layout.detail_tasks() {
            if built.contains_key(&task_layout.id) {
                continue;
            }
            let Some(task) = task_layout.path.resolve(roadmap) else {
                continue;
            };
            let Some(nested) = task.detail_content().and_then(|d| d.nested.as_ref()) else {
                continue;
            };
            let nested = nested.build().map_err(|source| RenderError::NestedRoadmap {
                task: task.label.clone(),
                source,
            })?;
            fonts.register_typography(&nested.typography);
            debug!(task = %task.label, id = %task_layout.id, "built nested roadmap");
            built.insert(task_layout.id.clone(), (task.label.clone(), nested));
        }
        Ok(built)
    }
}

impl Renderer for PdfRenderer {
    type Output = Vec<u8>;

    fn render(&self, roadmap: &Roadmap) -> Result<Vec<u8>, RenderError> {
        let mut fonts = FontBook::from_typography(&roadmap.typography);
        let layout = self.engine(&fonts).layout(roadmap)?;
        let built = self.build_nested(roadmap, &layout, &mut fonts)?;

        let mut nested_pages = HashMap::with_capacity(built.len());
        for (id, (task, nested)) in built {
            let nested_layout = match self.engine(&fonts).id_prefix(id.clone()).layout(&nested) {
                Ok(nested_layout) => nested_layout,
                Err(source) => return Err(RenderError::NestedRoadmap { task, source }),
            };
            nested_pages.insert(
                id,
                NestedPage {
                    task,
                    roadmap: nested,
                    layout: nested_layout,
                },
            );
        }

        let title = roadmap.title().unwrap_or_default().to_string();
        let detail_fonts = DetailFonts::from_typography(&roadmap.typography);
        let mut writer = PdfWriter::new(&fonts);
        let mut outline = OutlineNode::new(title.clone(), OVERVIEW_DEST);

        // Overview
        let mut page = writer.page(layout.width, layout.height);
        overview::paint(&layout, &mut page);
        for task in layout.detail_tasks() {
            page.link(task.bar, LinkTarget::Named(task.id.clone()));
        }
        let overview_id = page.finish()?;
        writer.bookmark(OVERVIEW_DEST, overview_id);

        for task_layout in layout.detail_tasks() {
            let Some(task) = task_layout.path.resolve(roadmap) else {
                continue;
            };
            let Some(detail) = task.detail_content() else {
                continue;
            };
            let nested = nested_pages.get(&task_layout.id);

            let mut page = writer.page(layout.width, layout.height);
            DetailPage {
                id: &task_layout.id,
                task,
                detail,
                nested: nested.map(|n| &n.roadmap),
                top: &layout.top,
                fonts: &detail_fonts,
                tags: &roadmap.tags,
            }
            .paint(&mut page, &fonts);
            let detail_id = page.finish()?;
            writer.bookmark(task_layout.id.clone(), detail_id);

            let heading = detail.title.clone().unwrap_or_else(|| task.label.clone());
            let mut entry = OutlineNode::new(heading.clone(), task_layout.id.clone());

            if let Some(nested) = nested {
                let dest = format!("{}_roadmap", task_layout.id);
                let mut page = writer.page(nested.layout.width, nested.layout.height);
                overview::paint(&nested.layout, &mut page);
                nav_button(
                    &mut page,
                    &fonts,
                    &detail_fonts,
                    "Back to detail",
                    0,
                    LinkTarget::Named(task_layout.id.clone()),
                );
                nav_button(
                    &mut page,
                    &fonts,
                    &detail_fonts,
                    "Back to overview",
                    1,
                    LinkTarget::Named(OVERVIEW_DEST.to_string()),
                );
                let nested_id = page.finish()?;
                debug!(task = %nested.task, dest = %dest, "painted nested roadmap");
                writer.bookmark(dest.clone(), nested_id);

                let nested_title = nested.roadmap.title().map_or(heading, str::to_string);
                entry
                    .children
                    .push(OutlineNode::new(format!("{nested_title} Detail"), dest));
            }
            outline.children.push(entry);
        }

        writer.finish(&title, &outline)
    }
}

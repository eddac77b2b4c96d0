//! PNG and JPEG output.
//!
//! The overview is painted onto an [`SvgSurface`], parsed with `usvg` and
//! rasterised with `resvg` into a pixmap of the roadmap's canvas size.
//!
//! Only the roadmap's registered font files and the bundled DejaVu Sans face
//! are given to `usvg`. Families without a file are laid out and drawn with
//! DejaVu Sans, so the output does not depend on the fonts of the host.

use std::path::Path;

use chrono::NaiveDate;
use roadmapper_core::{Colour, Roadmap};
use roadmapper_layout::{FontBook, FontFace, LayoutEngine, LayoutSettings, RoadmapLayout};
use tracing::debug;

use crate::overview;
use crate::surface::SvgSurface;
use crate::{RenderError, Renderer};

const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
pub const BUNDLED_FAMILY: &str = "DejaVu Sans";

fn bundled_face() -> Result<FontFace, RenderError> {
    Ok(FontFace::from_bytes(
        BUNDLED_FAMILY,
        Path::new("DejaVuSans.ttf"),
        BUNDLED_FONT.to_vec(),
    )?)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RasterFormat {
    #[default]
    Png,
    Jpeg,
}

/// Raster renderer configuration
#[derive(Clone, Debug)]
pub struct RasterRenderer {
    pub format: RasterFormat,
    /// JPEG quality, 1 to 100
    pub jpeg_quality: u8,
    pub settings: LayoutSettings,
    /// Date used for an undated marker; the local date when unset
    pub today: Option<NaiveDate>,
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self {
            format: RasterFormat::Png,
            jpeg_quality: 90,
            settings: LayoutSettings::default(),
            today: None,
        }
    }
}

impl RasterRenderer {
    pub fn png() -> Self {
        Self::default()
    }

    pub fn jpeg() -> Self {
        Self {
            format: RasterFormat::Jpeg,
            ..Self::default()
        }
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn settings(mut self, settings: LayoutSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Font book of the raster output: the roadmap's font files, with the
    /// bundled face for everything else.
    pub fn font_book(&self, roadmap: &Roadmap) -> Result<FontBook, RenderError> {
        Ok(FontBook::from_typography(&roadmap.typography).with_fallback(bundled_face()?))
    }

    /// Geometry of the raster output.
    pub fn layout(&self, roadmap: &Roadmap) -> Result<RoadmapLayout, RenderError> {
        self.layout_with(&self.font_book(roadmap)?, roadmap)
    }

    fn layout_with(&self, fonts: &FontBook, roadmap: &Roadmap) -> Result<RoadmapLayout, RenderError> {
        let mut engine = LayoutEngine::new(fonts).settings(self.settings.clone());
        if let Some(today) = self.today {
            engine = engine.today(today);
        }
        Ok(engine.layout(roadmap)?)
    }

    /// The intermediate SVG document of the overview.
    pub fn svg(&self, roadmap: &Roadmap) -> Result<String, RenderError> {
        self.svg_with(&self.font_book(roadmap)?, roadmap)
    }

    fn svg_with(&self, fonts: &FontBook, roadmap: &Roadmap) -> Result<String, RenderError> {
        let layout = self.layout_with(fonts, roadmap)?;
        let mut surface = SvgSurface::new(layout.width, layout.height).with_fonts(fonts);
        overview::paint(&layout, &mut surface);
        Ok(surface.finish())
    }
}

impl Renderer for RasterRenderer {
    type Output = Vec<u8>;

    fn render(&self, roadmap: &Roadmap) -> Result<Vec<u8>, RenderError> {
        let fonts = self.font_book(roadmap)?;
        let svg = self.svg_with(&fonts, roadmap)?;
        let pixmap = rasterise(
            &svg,
            roadmap.width,
            roadmap.height,
            roadmap.palette.background,
            &fonts,
        )?;
        let bytes = match self.format {
            RasterFormat::Png => pixmap
                .encode_png()
                .map_err(|err| RenderError::Encode(err.to_string()))?,
            RasterFormat::Jpeg => encode_jpeg(&pixmap, self.jpeg_quality)?,
        };
        debug!(format = ?self.format, bytes = bytes.len(), "rasterised roadmap");
        Ok(bytes)
    }
}

fn rasterise(
    svg: &str,
    width: u32,
    height: u32,
    background: Colour,
    fonts: &FontBook,
) -> Result<tiny_skia::Pixmap, RenderError> {
    let mut opt = usvg::Options::default();
    let db = opt.fontdb_mut();
    for face in fonts.faces().chain(fonts.fallback()) {
        db.load_font_data(face.data.to_vec());
    }
    db.set_sans_serif_family(BUNDLED_FAMILY);
    opt.font_family = BUNDLED_FAMILY.to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| RenderError::Svg(err.to_string()))?;
    let mut pixmap =
        tiny_skia::Pixmap::new(width.max(1), height.max(1)).ok_or(RenderError::PixmapAlloc)?;
    pixmap.fill(tiny_skia::Color::from_rgba8(
        background.r,
        background.g,
        background.b,
        255,
    ));
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap)
}

fn encode_jpeg(pixmap: &tiny_skia::Pixmap, quality: u8) -> Result<Vec<u8>, RenderError> {
    let (w, h) = (pixmap.width(), pixmap.height());
    // The background is opaque, so dropping alpha loses nothing
    let mut rgb = vec![0u8; (w as usize) * (h as usize) * 3];
    for (src, dst) in pixmap.data().chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
        dst.copy_from_slice(&src[..3]);
    }

    let mut out = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|err| RenderError::Encode(err.to_string()))?;
    Ok(out)
}

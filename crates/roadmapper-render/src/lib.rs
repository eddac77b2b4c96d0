//! # roadmapper-render
//!
//! Output backends for roadmapper.
//!
//! This crate provides:
//! - A `Surface` drawing abstraction over top-down canvas coordinates
//! - PNG and JPEG output through an SVG document rasterised with `resvg`
//! - Interactive PDF output with detail pages, nested roadmaps, bookmarks
//!   and clickable navigation, written with `lopdf`
//! - A `Renderer` trait and an extension driven [`save`] helper
//!
//! ## Example
//!
//! ```rust,ignore
//! use roadmapper_render::{save, PdfRenderer, RasterRenderer, Renderer};
//!
//! // Pick the backend from the file extension
//! save(&roadmap, "roadmap.pdf")?;
//!
//! // Or drive a backend directly
//! let png = RasterRenderer::png().render(&roadmap)?;
//! let pdf = PdfRenderer::new().render(&roadmap)?;
//! ```

use std::path::Path;

use roadmapper_core::{Roadmap, RoadmapError};
use roadmapper_layout::FontError;
use thiserror::Error;
use tracing::info;

pub mod document;
pub mod overview;
pub mod raster;
pub mod surface;
pub mod wrap;

pub use document::{DocTransform, PdfRenderer};
pub use raster::{RasterFormat, RasterRenderer, BUNDLED_FAMILY};
pub use surface::{LinkTarget, Surface, SvgSurface};
pub use wrap::wrap_text;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while producing an output file.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Roadmap(#[from] RoadmapError),

    #[error("Nested roadmap for task '{task}' failed: {source}")]
    NestedRoadmap {
        task: String,
        #[source]
        source: RoadmapError,
    },

    #[error("Failed to parse the generated SVG: {0}")]
    Svg(String),

    #[error(transparent)]
    Font(#[from] FontError),

    #[error("Failed to allocate a pixmap for raster rendering")]
    PixmapAlloc,

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Cannot load image {0}")]
    Image(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

// ============================================================================
// Renderer trait
// ============================================================================

/// A backend turning a roadmap into some output.
pub trait Renderer {
    type Output;

    /// Render the roadmap. Nothing is written anywhere; the caller decides
    /// what to do with the output.
    fn render(&self, roadmap: &Roadmap) -> Result<Self::Output, RenderError>;
}

/// Output file kinds, chosen by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Pdf,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(RenderError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Render `roadmap` into `path`, picking the backend from the extension.
///
/// The whole output is built in memory first, so a failure never leaves a
/// partial file behind.
pub fn save(roadmap: &Roadmap, path: impl AsRef<Path>) -> Result<(), RenderError> {
    let path = path.as_ref();
    let bytes = match OutputFormat::from_path(path)? {
        OutputFormat::Png => RasterRenderer::png().render(roadmap)?,
        OutputFormat::Jpeg => RasterRenderer::jpeg().render(roadmap)?,
        OutputFormat::Pdf => PdfRenderer::new().render(roadmap)?,
    };
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote roadmap");
    Ok(())
}

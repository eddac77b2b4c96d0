//! # roadmapper-layout
//!
//! Geometry engine shared by the raster and PDF renderers.
//!
//! This crate provides:
//! - Text metrics: `FontBook` (Helvetica AFM widths, TrueType fonts via `ttf-parser`)
//! - Timeline partitioning and date to x mapping
//! - A single top-down layout pass producing an immutable `RoadmapLayout`
//! - Tag chip layout with stable colours
//!
//! All coordinates are top-down: `y` grows towards the bottom of the canvas.
//! Bottom-up consumers such as PDF pages flip them at their own boundary.
//!
//! ## Example
//!
//! ```rust,ignore
//! use roadmapper_layout::{FontBook, LayoutEngine};
//!
//! let fonts = FontBook::from_typography(&roadmap.typography);
//! let layout = LayoutEngine::new(&fonts).layout(&roadmap)?;
//! println!("{layout}");
//! ```

use std::fmt;

use roadmapper_core::{Colour, TextMetrics, TextStyle};

pub mod chips;
pub mod geometry;
pub mod text;
pub mod timeline;

pub use chips::{layout_chips, Chip, ChipLayout};
pub use geometry::{
    BucketLayout, FooterLayout, GroupLayout, HeaderLayout, LayoutCursor, LayoutEngine, LogoLayout,
    LayoutSettings, MarkerLayout, MilestoneLayout, RoadmapLayout, TaskLayout, TaskPath,
    TimelineLayout, TitleLayout, TopBandLayout,
};
pub use text::{FontBook, FontError, FontFace};
pub use timeline::{default_item_count, partition, Bucket, Partition};

/// A point in top-down canvas coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box; `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn centre(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn overlaps_vertically(&self, other: &Rect) -> bool {
        self.y < other.bottom() && other.y < self.bottom()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.1}, {:.1}) {:.1}x{:.1}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// A positioned run of text. `x` is the left edge, `baseline` the baseline y.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBox {
    pub text: String,
    pub x: f32,
    pub baseline: f32,
    pub style: TextStyle,
    pub colour: Colour,
    pub metrics: TextMetrics,
}

impl TextBox {
    /// Bounding box from the measured ascent and descent.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x,
            self.baseline - self.metrics.ascent,
            self.metrics.width,
            self.metrics.height(),
        )
    }
}

/// Baseline that vertically centres text of the given metrics inside `rect`.
pub fn centred_baseline(rect: &Rect, metrics: &TextMetrics) -> f32 {
    rect.y + (rect.height - metrics.height()) / 2.0 + metrics.ascent
}

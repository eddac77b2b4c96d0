//! Typography and tag colouring.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::colour::Colour;

/// Family used when nothing else is configured. Also the PDF fallback.
pub const DEFAULT_FAMILY: &str = "Helvetica";

/// Font family and point size for one piece of text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub family: String,
    pub size: f32,
}

impl TextStyle {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// Same family at a different size.
    pub fn sized(&self, size: f32) -> Self {
        Self {
            family: self.family.clone(),
            size,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(DEFAULT_FAMILY, 12.0)
    }
}

/// The parts of a roadmap that carry their own text style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Title,
    Subtitle,
    Timeline,
    Group,
    Task,
    Milestone,
    Marker,
    Footer,
    Body,
}

impl Component {
    pub const ALL: [Component; 9] = [
        Component::Title,
        Component::Subtitle,
        Component::Timeline,
        Component::Group,
        Component::Task,
        Component::Milestone,
        Component::Marker,
        Component::Footer,
        Component::Body,
    ];

    fn default_size(self) -> f32 {
        match self {
            Component::Title => 18.0,
            Component::Subtitle => 12.0,
            Component::Timeline
            | Component::Group
            | Component::Task
            | Component::Marker => 10.0,
            Component::Milestone => 9.0,
            Component::Footer | Component::Body => 12.0,
        }
    }
}

/// Font used for detail page prose in the PDF output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyFont {
    pub name: String,
    pub file: Option<PathBuf>,
}

/// Base family, per-component overrides and registered font files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    /// Family every component uses unless overridden
    pub family: String,
    /// Per-component family/size overrides
    pub overrides: BTreeMap<Component, TextStyle>,
    /// Family name to TrueType/OpenType file
    pub font_files: BTreeMap<String, PathBuf>,
    /// Explicit body font for the PDF detail pages
    pub body_font: Option<BodyFont>,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            family: DEFAULT_FAMILY.to_string(),
            overrides: BTreeMap::new(),
            font_files: BTreeMap::new(),
            body_font: None,
        }
    }
}

impl Typography {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            ..Self::default()
        }
    }

    pub fn with_override(mut self, component: Component, style: TextStyle) -> Self {
        self.overrides.insert(component, style);
        self
    }

    pub fn with_font_file(mut self, family: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.font_files.insert(family.into(), path.into());
        self
    }

    /// Resolved style for a component.
    ///
    /// The subtitle size depends on where it is drawn, see
    /// [`Typography::subtitle_style`].
    pub fn style(&self, component: Component) -> TextStyle {
        if let Some(style) = self.overrides.get(&component) {
            return style.clone();
        }
        if component == Component::Body {
            if let Some(body) = &self.body_font {
                return TextStyle::new(body.name.clone(), component.default_size());
            }
        }
        TextStyle::new(self.family.clone(), component.default_size())
    }

    /// Subtitle style: `max(title - 4, 10)` inside a header, `max(title - 6, 10)`
    /// under a plain title, unless explicitly overridden.
    pub fn subtitle_style(&self, in_header: bool) -> TextStyle {
        if let Some(style) = self.overrides.get(&Component::Subtitle) {
            return style.clone();
        }
        let title = self.style(Component::Title);
        let shrink = if in_header { 4.0 } else { 6.0 };
        title.sized((title.size - shrink).max(10.0))
    }
}

// ============================================================================
// Tag colours
// ============================================================================

/// Colour used for empty tag labels.
pub const EMPTY_TAG_COLOUR: Colour = Colour::rgb(0x2E, 0x33, 0x4E);

/// Cyclic palette for tags without an explicit colour.
pub const DEFAULT_TAG_PALETTE: [Colour; 8] = [
    Colour::rgb(0x1F, 0x77, 0xB4),
    Colour::rgb(0x2C, 0xA0, 0x2C),
    Colour::rgb(0xD6, 0x27, 0x28),
    Colour::rgb(0x94, 0x67, 0xBD),
    Colour::rgb(0xFF, 0x7F, 0x0E),
    Colour::rgb(0x17, 0xBE, 0xCF),
    Colour::rgb(0xBC, 0xBD, 0x22),
    Colour::rgb(0x8C, 0x56, 0x4B),
];

/// Tag to colour table.
///
/// Tags without an explicit entry get the next colour of the cyclic palette
/// the first time they are resolved. The assignment is remembered for the
/// lifetime of the owning roadmap, so the overview, detail pages and nested
/// outlines agree on a tag's colour.
#[derive(Debug, Default)]
pub struct TagStyles {
    explicit: HashMap<String, Colour>,
    palette: Vec<Colour>,
    memo: RefCell<HashMap<String, Colour>>,
}

impl Clone for TagStyles {
    fn clone(&self) -> Self {
        Self {
            explicit: self.explicit.clone(),
            palette: self.palette.clone(),
            memo: RefCell::new(self.memo.borrow().clone()),
        }
    }
}

impl TagStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cyclic palette. An empty list restores the default one.
    pub fn with_palette(mut self, palette: Vec<Colour>) -> Self {
        self.palette = palette;
        self.memo.borrow_mut().clear();
        self
    }

    pub fn with_colour(mut self, tag: impl Into<String>, colour: Colour) -> Self {
        self.set_colour(tag, colour);
        self
    }

    pub fn set_colour(&mut self, tag: impl Into<String>, colour: Colour) {
        self.explicit.insert(tag.into(), colour);
    }

    /// Fill colour for `tag`.
    pub fn resolve(&self, tag: &str) -> Colour {
        let tag = tag.trim();
        if tag.is_empty() {
            return EMPTY_TAG_COLOUR;
        }
        if let Some(colour) = self.explicit.get(tag) {
            return *colour;
        }
        let mut memo = self.memo.borrow_mut();
        if let Some(colour) = memo.get(tag) {
            return *colour;
        }
        let palette: &[Colour] = if self.palette.is_empty() {
            &DEFAULT_TAG_PALETTE
        } else {
            &self.palette
        };
        let colour = palette[memo.len() % palette.len()];
        memo.insert(tag.to_string(), colour);
        colour
    }

    pub fn explicit(&self) -> impl Iterator<Item = (&String, &Colour)> {
        self.explicit.iter()
    }

    pub fn palette(&self) -> &[Colour] {
        &self.palette
    }
}

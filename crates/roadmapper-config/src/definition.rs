//! Serde model of a definition file.
//!
//! This is the input representation only; [`crate::build`] turns it into a
//! [`roadmapper_core::Roadmap`]. Dates stay strings here so that a bad date
//! is reported with its value.

use std::collections::BTreeMap;
use std::path::PathBuf;

use roadmapper_core::{Colour, LineStyle, TextAlign};
use serde::{Deserialize, Serialize};

fn default_logo_size() -> f32 {
    80.0
}

fn default_true() -> bool {
    true
}

/// A roadmap definition. Nested roadmaps use the same shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Definition {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub colour_theme: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub header: Option<HeaderDef>,
    pub timeline: TimelineDef,
    /// Swim lanes; nested roadmaps may call them `groups`
    #[serde(alias = "groups")]
    pub areas: Vec<AreaDef>,
    pub footer: Option<String>,
    pub fonts: Option<FontsDef>,
    pub tags: Option<TagsDef>,
    pub marker: Option<MarkerDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeaderDef {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub logo: Option<PathBuf>,
    #[serde(default = "default_logo_size")]
    pub logo_width: f32,
    #[serde(default = "default_logo_size")]
    pub logo_height: f32,
    #[serde(default)]
    pub background: Option<Colour>,
    #[serde(default)]
    pub divider: Option<Colour>,
    #[serde(default)]
    pub padding_x: Option<f32>,
    #[serde(default)]
    pub padding_y: Option<f32>,
    #[serde(default)]
    pub logo_spacing: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineDef {
    pub mode: Option<String>,
    /// `YYYY-MM-DD`
    pub start: Option<String>,
    pub items: Option<u32>,
    pub show_generic_dates: bool,
    pub fill_colour: Option<Colour>,
    pub font_colour: Option<Colour>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaDef {
    pub name: String,
    #[serde(default)]
    pub align: Option<TextAlign>,
    #[serde(default)]
    pub fill_colour: Option<Colour>,
    #[serde(default)]
    pub font_colour: Option<Colour>,
    #[serde(default)]
    pub tasks: Vec<TaskDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
    pub name: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub tags: Option<TagList>,
    #[serde(default)]
    pub milestones: Vec<MilestoneDef>,
    #[serde(default)]
    pub parallel: Vec<TaskDef>,
    #[serde(default)]
    pub detail: Option<DetailDef>,
    #[serde(default)]
    pub fill_colour: Option<Colour>,
    #[serde(default)]
    pub font_colour: Option<Colour>,
}

/// `tags = "Infra"` or `tags = ["Infra", "Data"]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    One(String),
    Many(Vec<String>),
}

impl TagList {
    /// Non-empty tags in order.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            TagList::One(tag) => vec![tag.clone()],
            TagList::Many(tags) => tags.clone(),
        }
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MilestoneDef {
    pub name: String,
    pub date: String,
    #[serde(default)]
    pub fill_colour: Option<Colour>,
    #[serde(default)]
    pub font_colour: Option<Colour>,
}

/// `detail = "text"` or a table with title, description, links and a
/// nested roadmap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailDef {
    Text(String),
    Full(DetailTable),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailTable {
    pub title: Option<String>,
    pub description: Option<String>,
    pub links: Vec<LinkDef>,
    pub roadmap: Option<Box<Definition>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkDef {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsDef {
    pub family: Option<FontEntry>,
    /// Component name (`title`, `task`, ...) to font
    pub components: BTreeMap<String, FontEntry>,
    /// Family name to font file
    pub files: BTreeMap<String, PathBuf>,
    /// Body font of the PDF detail pages
    pub pdf: Option<FontEntry>,
}

/// `"Inter"` or `{ name = "Inter", file = "fonts/Inter.ttf", size = 11 }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontEntry {
    Name(String),
    Full {
        #[serde(default)]
        name: String,
        #[serde(default)]
        file: Option<PathBuf>,
        #[serde(default)]
        size: Option<f32>,
    },
}

impl FontEntry {
    pub fn name(&self) -> &str {
        match self {
            FontEntry::Name(name) | FontEntry::Full { name, .. } => name,
        }
    }

    pub fn file(&self) -> Option<&PathBuf> {
        match self {
            FontEntry::Name(_) => None,
            FontEntry::Full { file, .. } => file.as_ref(),
        }
    }

    pub fn size(&self) -> Option<f32> {
        match self {
            FontEntry::Name(_) => None,
            FontEntry::Full { size, .. } => *size,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagsDef {
    /// Explicit colour per tag
    pub palette: BTreeMap<String, Colour>,
    /// Cyclic colours for the remaining tags
    pub defaults: Vec<Colour>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDef {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub line_colour: Option<Colour>,
    #[serde(default)]
    pub font_colour: Option<Colour>,
    #[serde(default)]
    pub line_width: Option<f32>,
    #[serde(default)]
    pub line_style: Option<LineStyle>,
}

//! # roadmapper-core
//!
//! Domain model and traits for the roadmapper diagram engine.
//!
//! This crate provides:
//! - Domain types: `Roadmap`, `Header`, `Timeline`, `Group`, `Task`, `Milestone`
//! - Styling: `Colour`, `Palette`, `Typography`, `TagStyles`
//! - Core traits: `TextMeasurer`, `RoadmapBuilder`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use roadmapper_core::{Group, Roadmap, Task, Timeline, TimelineMode};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 2, 15).unwrap();
//!
//! let mut roadmap = Roadmap::new(1200, 800);
//! roadmap.set_title("Platform roadmap");
//! roadmap.set_timeline(Timeline::new(TimelineMode::Monthly, start, 6).unwrap());
//! roadmap.add_group(Group::new("Core").with_task(Task::new("Storage", start, end)));
//! assert!(roadmap.validate().is_ok());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod colour;
pub mod mode;
pub mod style;

pub use colour::{Colour, Palette};
pub use mode::TimelineMode;
pub use style::{
    BodyFont, Component, TagStyles, TextStyle, Typography, DEFAULT_FAMILY, DEFAULT_TAG_PALETTE,
    EMPTY_TAG_COLOUR,
};

// ============================================================================
// Text measurement
// ============================================================================

/// Measured extent of a run of text, in points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width
    pub width: f32,
    /// Distance from baseline to the top of the tallest glyph
    pub ascent: f32,
    /// Distance from baseline to the bottom of the lowest glyph (positive)
    pub descent: f32,
}

impl TextMetrics {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Source of text metrics shared by layout and both renderers.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;

    fn width(&self, text: &str, style: &TextStyle) -> f32 {
        self.measure(text, style).width
    }
}

// ============================================================================
// Top band
// ============================================================================

/// Horizontal alignment of a label inside its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Centre,
    Right,
}

/// Logo drawn at the left of the header.
#[derive(Clone, Debug, PartialEq)]
pub struct Logo {
    pub path: PathBuf,
    pub width: f32,
    pub height: f32,
}

impl Logo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            width: 80.0,
            height: 80.0,
        }
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Measured header extents, all relative to the header's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeaderMetrics {
    pub height: f32,
    pub content_height: f32,
    pub title: TextMetrics,
    pub subtitle: Option<TextMetrics>,
}

/// Title banner with optional subtitle and logo.
///
/// The measured height is cached per pair of text styles; changing the
/// title, subtitle or logo drops the cached value.
#[derive(Clone, Debug)]
pub struct Header {
    title: String,
    subtitle: Option<String>,
    logo: Option<Logo>,
    pub padding_x: f32,
    pub padding_y: f32,
    pub logo_spacing: f32,
    pub background: Colour,
    pub divider: Colour,
    cache: RefCell<Option<(TextStyle, TextStyle, HeaderMetrics)>>,
}

impl Header {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            logo: None,
            padding_x: 24.0,
            padding_y: 18.0,
            logo_spacing: 16.0,
            background: Colour::WHITE,
            divider: Colour::rgb(0xCC, 0xCC, 0xCC),
            cache: RefCell::new(None),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.set_subtitle(Some(subtitle.into()));
        self
    }

    pub fn with_logo(mut self, logo: Logo) -> Self {
        self.set_logo(Some(logo));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn logo(&self) -> Option<&Logo> {
        self.logo.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.cache.get_mut().take();
    }

    pub fn set_subtitle(&mut self, subtitle: Option<String>) {
        self.subtitle = subtitle.filter(|s| !s.trim().is_empty());
        self.cache.get_mut().take();
    }

    pub fn set_logo(&mut self, logo: Option<Logo>) {
        self.logo = logo;
        self.cache.get_mut().take();
    }

    /// Measure the header, reusing the cached value for identical styles.
    ///
    /// `height = max(logo height, title height [+ 6 + subtitle height]) + 2 * padding_y`
    pub fn measure(
        &self,
        measurer: &dyn TextMeasurer,
        title_style: &TextStyle,
        subtitle_style: &TextStyle,
    ) -> HeaderMetrics {
        if let Some((t, s, metrics)) = self.cache.borrow().as_ref() {
            if t == title_style && s == subtitle_style {
                return *metrics;
            }
        }

        let title = measurer.measure(&self.title, title_style);
        let subtitle = self
            .subtitle
            .as_deref()
            .map(|text| measurer.measure(text, subtitle_style));
        let text_height = title.height() + subtitle.map_or(0.0, |m| m.height() + 6.0);
        let logo_height = self.logo.as_ref().map_or(0.0, |l| l.height);
        let content_height = text_height.max(logo_height);
        let metrics = HeaderMetrics {
            height: content_height + 2.0 * self.padding_y,
            content_height,
            title,
            subtitle,
        };

        *self.cache.borrow_mut() = Some((title_style.clone(), subtitle_style.clone(), metrics));
        metrics
    }

    /// Whether a measurement is currently cached.
    pub fn is_measured(&self) -> bool {
        self.cache.borrow().is_some()
    }
}

/// Centred title with an optional subtitle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TitleBlock {
    pub title: String,
    pub subtitle: Option<String>,
}

/// Whatever occupies the top of the canvas.
#[derive(Clone, Debug)]
pub enum TopBand {
    Header(Header),
    Title(TitleBlock),
}

impl TopBand {
    pub fn title(&self) -> &str {
        match self {
            TopBand::Header(header) => header.title(),
            TopBand::Title(block) => &block.title,
        }
    }

    pub fn subtitle(&self) -> Option<&str> {
        match self {
            TopBand::Header(header) => header.subtitle(),
            TopBand::Title(block) => block.subtitle.as_deref(),
        }
    }
}

// ============================================================================
// Timeline
// ============================================================================

/// The horizontal date axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    pub mode: TimelineMode,
    pub start: NaiveDate,
    items: u32,
    /// Label buckets "Month 1", "Q1", ... instead of calendar dates
    pub show_generic_dates: bool,
    pub fill: Option<Colour>,
    pub font_colour: Option<Colour>,
}

impl Timeline {
    pub fn new(mode: TimelineMode, start: NaiveDate, items: u32) -> Result<Self, RoadmapError> {
        if items == 0 {
            return Err(RoadmapError::InvalidItemCount);
        }
        Ok(Self {
            mode,
            start,
            items,
            show_generic_dates: false,
            fill: None,
            font_colour: None,
        })
    }

    pub fn generic_dates(mut self, generic: bool) -> Self {
        self.show_generic_dates = generic;
        self
    }

    pub fn items(&self) -> u32 {
        self.items
    }

    /// First day after the last bucket.
    pub fn end(&self) -> NaiveDate {
        self.mode.bucket_start(self.start, self.items)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end()
    }
}

// ============================================================================
// Groups, tasks, milestones
// ============================================================================

/// A labelled swim lane of tasks.
#[derive(Clone, Debug)]
pub struct Group {
    pub label: String,
    pub align: TextAlign,
    pub fill: Option<Colour>,
    pub font_colour: Option<Colour>,
    pub tasks: Vec<Task>,
}

impl Group {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            align: TextAlign::default(),
            fill: None,
            font_colour: None,
            tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn add_task(&mut self, task: Task) -> &mut Task {
        self.tasks.push(task);
        let last = self.tasks.len() - 1;
        &mut self.tasks[last]
    }
}

/// A hyperlink shown on a detail page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Extra content that gives a task its own page in the PDF output.
#[derive(Clone, Debug, Default)]
pub struct Detail {
    pub title: Option<String>,
    pub body: Option<String>,
    pub links: Vec<Link>,
    pub nested: Option<NestedRoadmap>,
}

/// Whether a task has a detail page.
#[derive(Clone, Debug, Default)]
pub enum TaskKind {
    #[default]
    Plain,
    Detail(Detail),
}

/// A bar on the timeline. Dates are inclusive.
#[derive(Clone, Debug)]
pub struct Task {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub tags: Vec<String>,
    pub milestones: Vec<Milestone>,
    /// Tasks drawn in their own band directly beneath this one
    pub parallel: Vec<Task>,
    pub kind: TaskKind,
    pub fill: Option<Colour>,
    pub font_colour: Option<Colour>,
}

impl Task {
    pub fn new(label: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            label: label.into(),
            start,
            end,
            tags: Vec::new(),
            milestones: Vec::new(),
            parallel: Vec::new(),
            kind: TaskKind::Plain,
            fill: None,
            font_colour: None,
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn milestone(mut self, milestone: Milestone) -> Self {
        self.milestones.push(milestone);
        self
    }

    pub fn parallel(mut self, task: Task) -> Self {
        self.parallel.push(task);
        self
    }

    pub fn detail(mut self, detail: Detail) -> Self {
        self.kind = TaskKind::Detail(detail);
        self
    }

    pub fn detail_content(&self) -> Option<&Detail> {
        match &self.kind {
            TaskKind::Plain => None,
            TaskKind::Detail(detail) => Some(detail),
        }
    }

    /// Tags in first-seen order with blanks and duplicates removed.
    pub fn display_tags(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !seen.contains(&tag) {
                seen.push(tag);
            }
        }
        seen
    }
}

/// A dated point drawn as a diamond.
#[derive(Clone, Debug, PartialEq)]
pub struct Milestone {
    pub label: String,
    pub date: NaiveDate,
    pub fill: Option<Colour>,
    pub font_colour: Option<Colour>,
}

impl Milestone {
    pub fn new(label: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            label: label.into(),
            date,
            fill: None,
            font_colour: None,
        }
    }
}

// ============================================================================
// Marker and footer
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    #[default]
    Dashed,
}

/// Vertical "today" line.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    /// Defaults to the local date at layout time
    pub date: Option<NaiveDate>,
    /// Defaults to the date formatted as `%d %b %Y`
    pub label: Option<String>,
    pub line_colour: Option<Colour>,
    pub font_colour: Option<Colour>,
    pub line_width: f32,
    pub line_style: LineStyle,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            date: None,
            label: None,
            line_colour: None,
            font_colour: None,
            line_width: 2.0,
            line_style: LineStyle::default(),
        }
    }
}

impl Marker {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn label_for(&self, date: NaiveDate) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| date.format("%d %b %Y").to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Footer {
    pub label: String,
    pub font_colour: Option<Colour>,
}

impl Footer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            font_colour: None,
        }
    }
}

// ============================================================================
// Nested roadmaps
// ============================================================================

/// Produces the independent roadmap shown behind a detail task.
pub trait RoadmapBuilder: Send + Sync {
    fn build(&self) -> Result<Roadmap, RoadmapError>;
}

impl<F> RoadmapBuilder for F
where
    F: Fn() -> Result<Roadmap, RoadmapError> + Send + Sync,
{
    fn build(&self) -> Result<Roadmap, RoadmapError> {
        self()
    }
}

/// Shared handle to a lazily built nested roadmap.
#[derive(Clone)]
pub struct NestedRoadmap(Arc<dyn RoadmapBuilder>);

impl NestedRoadmap {
    pub fn new(builder: impl RoadmapBuilder + 'static) -> Self {
        Self(Arc::new(builder))
    }

    pub fn build(&self) -> Result<Roadmap, RoadmapError> {
        self.0.build()
    }
}

impl fmt::Debug for NestedRoadmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NestedRoadmap(..)")
    }
}

// ============================================================================
// Roadmap
// ============================================================================

/// Root aggregate: everything drawn on one canvas.
#[derive(Clone, Debug)]
pub struct Roadmap {
    /// Canvas width in pixels (points in the PDF)
    pub width: u32,
    /// Canvas height in pixels (points in the PDF)
    pub height: u32,
    top: Option<TopBand>,
    timeline: Option<Timeline>,
    pub groups: Vec<Group>,
    pub marker: Option<Marker>,
    pub footer: Option<Footer>,
    pub palette: Palette,
    pub typography: Typography,
    pub tags: TagStyles,
}

impl Roadmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            top: None,
            timeline: None,
            groups: Vec::new(),
            marker: Some(Marker::default()),
            footer: None,
            palette: Palette::default(),
            typography: Typography::default(),
            tags: TagStyles::default(),
        }
    }

    /// Use a plain title as the top band, replacing any header.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        match &mut self.top {
            Some(TopBand::Title(block)) => block.title = title,
            _ => {
                self.top = Some(TopBand::Title(TitleBlock {
                    title,
                    subtitle: None,
                }));
            }
        }
    }

    /// Set the subtitle of whichever top band is present.
    pub fn set_subtitle(&mut self, subtitle: impl Into<String>) -> Result<(), RoadmapError> {
        let subtitle = subtitle.into();
        match &mut self.top {
            Some(TopBand::Title(block)) => block.subtitle = Some(subtitle),
            Some(TopBand::Header(header)) => header.set_subtitle(Some(subtitle)),
            None => return Err(RoadmapError::MissingTitle),
        }
        Ok(())
    }

    /// Use a header as the top band, replacing any plain title.
    ///
    /// An empty header title or subtitle is taken from the title block it
    /// replaces.
    pub fn set_header(&mut self, mut header: Header) -> Result<(), RoadmapError> {
        if let Some(TopBand::Title(block)) = &self.top {
            if header.title().trim().is_empty() {
                header.set_title(block.title.clone());
            }
            if header.subtitle().is_none() {
                header.set_subtitle(block.subtitle.clone());
            }
        }
        if header.title().trim().is_empty() {
            return Err(RoadmapError::EmptyHeaderTitle);
        }
        self.top = Some(TopBand::Header(header));
        Ok(())
    }

    pub fn set_timeline(&mut self, timeline: Timeline) {
        self.timeline = Some(timeline);
    }

    pub fn add_group(&mut self, group: Group) -> &mut Group {
        self.groups.push(group);
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    pub fn set_marker(&mut self, marker: Option<Marker>) {
        self.marker = marker;
    }

    pub fn set_footer(&mut self, footer: impl Into<String>) {
        self.footer = Some(Footer::new(footer));
    }

    pub fn set_theme(&mut self, name: &str) -> Result<(), RoadmapError> {
        self.palette = Palette::theme(name)?;
        Ok(())
    }

    pub fn top_band(&self) -> Option<&TopBand> {
        self.top.as_ref()
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    pub fn title(&self) -> Option<&str> {
        self.top.as_ref().map(TopBand::title)
    }

    /// Check that everything required to draw is present.
    pub fn validate(&self) -> Result<(&TopBand, &Timeline), RoadmapError> {
        let top = self.top.as_ref().ok_or(RoadmapError::MissingTitle)?;
        let timeline = self.timeline.as_ref().ok_or(RoadmapError::MissingTimeline)?;
        Ok((top, timeline))
    }

    /// Number of tasks with a detail page, parallel tasks included.
    pub fn detail_task_count(&self) -> usize {
        fn count(task: &Task) -> usize {
            usize::from(task.detail_content().is_some())
                + task.parallel.iter().map(count).sum::<usize>()
        }
        self.groups
            .iter()
            .flat_map(|g| g.tasks.iter())
            .map(count)
            .sum()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Invalid or incomplete roadmap input.
#[derive(Debug, Error)]
pub enum RoadmapError {
    #[error("Roadmap has no title or header")]
    MissingTitle,

    #[error("Roadmap has no timeline")]
    MissingTimeline,

    #[error("Unsupported timeline mode: {0}")]
    UnsupportedTimelineMode(String),

    #[error("Timeline item count must be at least 1")]
    InvalidItemCount,

    #[error("Unknown colour theme: {0}")]
    UnknownTheme(String),

    #[error("Invalid colour: {0}")]
    InvalidColour(String),

    #[error("Header title must not be empty")]
    EmptyHeaderTitle,

    #[error("Roadmap build failed: {0}")]
    Build(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Every glyph is half the font size wide.
    struct HalfEm;

    impl TextMeasurer for HalfEm {
        fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
            TextMetrics {
                width: text.chars().count() as f32 * style.size * 0.5,
                ascent: style.size * 0.75,
                descent: style.size * 0.25,
            }
        }
    }

    #[test]
    fn zero_items_rejected() {
        assert!(matches!(
            Timeline::new(TimelineMode::Monthly, date(2025, 1, 1), 0),
            Err(RoadmapError::InvalidItemCount)
        ));
    }

    #[test]
    fn timeline_end_is_exclusive() {
        let tl = Timeline::new(TimelineMode::Quarterly, date(2025, 1, 1), 2).unwrap();
        assert_eq!(tl.end(), date(2025, 7, 1));
        assert!(tl.contains(date(2025, 6, 30)));
        assert!(!tl.contains(date(2025, 7, 1)));
    }

    #[test]
    fn validate_reports_missing_pieces() {
        let mut roadmap = Roadmap::new(800, 600);
        assert!(matches!(roadmap.validate(), Err(RoadmapError::MissingTitle)));
        roadmap.set_title("Plan");
        assert!(matches!(
            roadmap.validate(),
            Err(RoadmapError::MissingTimeline)
        ));
        roadmap.set_timeline(Timeline::new(TimelineMode::Monthly, date(2025, 1, 1), 3).unwrap());
        assert!(roadmap.validate().is_ok());
    }

    #[test]
    fn subtitle_requires_top_band() {
        let mut roadmap = Roadmap::new(800, 600);
        assert!(matches!(
            roadmap.set_subtitle("later"),
            Err(RoadmapError::MissingTitle)
        ));
    }

    #[test]
    fn header_inherits_title_block() {
        let mut roadmap = Roadmap::new(800, 600);
        roadmap.set_title("Plan");
        roadmap.set_subtitle("2025").unwrap();
        roadmap.set_header(Header::new("")).unwrap();

        let Some(TopBand::Header(header)) = roadmap.top_band() else {
            panic!("expected header");
        };
        assert_eq!(header.title(), "Plan");
        assert_eq!(header.subtitle(), Some("2025"));

        // And a title replaces the header again
        roadmap.set_title("Other");
        assert!(matches!(roadmap.top_band(), Some(TopBand::Title(_))));
    }

    #[test]
    fn empty_header_without_fallback_rejected() {
        let mut roadmap = Roadmap::new(800, 600);
        assert!(matches!(
            roadmap.set_header(Header::new("  ")),
            Err(RoadmapError::EmptyHeaderTitle)
        ));
    }

    #[test]
    fn header_height_and_cache() {
        let title = TextStyle::new("Helvetica", 20.0);
        let sub = TextStyle::new("Helvetica", 16.0);
        let mut header = Header::new("Plan");

        let m = header.measure(&HalfEm, &title, &sub);
        // 20 text + 2 * 18 padding
        assert_eq!(m.height, 56.0);
        assert!(header.is_measured());

        header.set_subtitle(Some("Sub".into()));
        assert!(!header.is_measured());
        let m = header.measure(&HalfEm, &title, &sub);
        assert_eq!(m.content_height, 20.0 + 6.0 + 16.0);

        header.set_logo(Some(Logo::new("logo.png")));
        let m = header.measure(&HalfEm, &title, &sub);
        assert_eq!(m.height, 80.0 + 36.0);

        // Different style is not served from the cache
        let bigger = TextStyle::new("Helvetica", 100.0);
        let m = header.measure(&HalfEm, &bigger, &sub);
        assert_eq!(m.content_height, 100.0 + 6.0 + 16.0);
    }

    #[test]
    fn display_tags_dedupe_in_order() {
        let task = Task::new("t", date(2025, 1, 1), date(2025, 1, 2))
            .tag("Alpha")
            .tag(" ")
            .tag("Beta")
            .tag("Alpha");
        assert_eq!(task.display_tags(), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn detail_tasks_counted_through_parallel() {
        let d = date(2025, 1, 1);
        let mut roadmap = Roadmap::new(800, 600);
        roadmap.add_group(
            Group::new("g")
                .with_task(
                    Task::new("a", d, d)
                        .detail(Detail::default())
                        .parallel(Task::new("b", d, d).detail(Detail::default())),
                )
                .with_task(Task::new("c", d, d)),
        );
        assert_eq!(roadmap.detail_task_count(), 2);
    }

    #[test]
    fn closure_builds_nested_roadmap() {
        let nested = NestedRoadmap::new(|| {
            let mut r = Roadmap::new(400, 300);
            r.set_title("Inner");
            Ok::<_, RoadmapError>(r)
        });
        let built = nested.build().unwrap();
        assert_eq!(built.title(), Some("Inner"));
        assert_eq!(format!("{nested:?}"), "NestedRoadmap(..)");
    }

    #[test]
    fn marker_label_defaults_to_date() {
        let marker = Marker::on(date(2025, 3, 7));
        assert_eq!(marker.label_for(date(2025, 3, 7)), "07 Mar 2025");
        let named = Marker {
            label: Some("Today".into()),
            ..Marker::default()
        };
        assert_eq!(named.label_for(date(2025, 3, 7)), "Today");
    }

    #[test]
    fn roadmap_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Roadmap>();
    }
}

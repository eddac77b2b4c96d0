//! Turning a [`Definition`] into a [`Roadmap`].
//!
//! Top-level tasks of the root definition always get a detail page, with
//! generated text when the definition has none. Parallel tasks and the
//! tasks of nested roadmaps get one only when they declare `detail`.
//!
//! Nested roadmaps are not built here. Each becomes a [`NestedRoadmap`]
//! closure that owns what it needs and runs when the PDF is assembled.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use roadmapper_core::{
    BodyFont, Component, Detail, Group, Header, Link, Logo, Marker, Milestone, NestedRoadmap,
    Roadmap, RoadmapError, TagStyles, Task, TaskKind, TextStyle, Timeline, TimelineMode,
    Typography,
};
use roadmapper_layout::default_item_count;
use tracing::{debug, warn};

use crate::definition::{
    AreaDef, Definition, DetailDef, FontEntry, FontsDef, HeaderDef, MarkerDef, TagsDef, TaskDef,
    TimelineDef,
};
use crate::ConfigError;

pub const DEFAULT_WIDTH: u32 = 1400;
pub const DEFAULT_HEIGHT: u32 = 750;
pub const DEFAULT_TITLE: &str = "Roadmap";
pub const DEFAULT_ITEMS: u32 = 12;

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

/// Detail text for a top-level task without a description.
pub fn default_detail_text(task: &TaskDef, area: &str) -> String {
    let (milestone, date) = task
        .milestones
        .first()
        .map_or(("Milestone", task.end.as_str()), |m| {
            (m.name.as_str(), m.date.as_str())
        });
    format!(
        "{name} anchors the {area} workstream.\n\
         Window: {start} -> {end}\n\
         Milestone target: {milestone} ({date}).\n\n\
         Key alignment questions:\n\
         - What success signals prove completion?\n\
         - Which dependencies must land early?\n\
         - Who owns stakeholder updates?",
        name = task.name,
        start = task.start,
        end = task.end,
    )
}

fn component(name: &str) -> Option<Component> {
    let component = match name.trim().to_ascii_lowercase().as_str() {
        "title" => Component::Title,
        "subtitle" => Component::Subtitle,
        "timeline" => Component::Timeline,
        "group" | "area" => Component::Group,
        "task" => Component::Task,
        "milestone" => Component::Milestone,
        "marker" => Component::Marker,
        "footer" => Component::Footer,
        "body" => Component::Body,
        _ => return None,
    };
    Some(component)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    /// Group task of the root roadmap
    Overview,
    /// Parallel task of the root roadmap
    Parallel,
    /// Any task of a nested roadmap
    Nested,
}

/// What a nested roadmap takes from its root definition and owning task.
#[derive(Clone, Debug)]
struct Parent {
    root: Arc<Definition>,
    area: String,
    task: TaskDef,
}

/// Builds roadmaps from definitions, resolving relative paths against
/// `base_dir`.
#[derive(Clone, Debug)]
pub struct Loader {
    base_dir: PathBuf,
    today: NaiveDate,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Loader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            today: Local::now().date_naive(),
        }
    }

    /// Start date of a root timeline without one. Defaults to the local date.
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Build the root roadmap.
    pub fn build(&self, definition: &Definition) -> Result<Roadmap, ConfigError> {
        let root = Arc::new(definition.clone());
        let mut roadmap = Roadmap::new(
            definition.width.unwrap_or(DEFAULT_WIDTH),
            definition.height.unwrap_or(DEFAULT_HEIGHT),
        );
        if let Some(theme) = &definition.colour_theme {
            roadmap.set_theme(theme)?;
        }
        roadmap.typography = self.typography(definition.fonts.as_ref(), None);
        roadmap.tags = tag_styles(definition.tags.as_ref(), None);

        let title = definition.title.as_deref().unwrap_or(DEFAULT_TITLE);
        self.top_band(
            &mut roadmap,
            definition.header.as_ref(),
            title,
            definition.subtitle.as_deref(),
        )?;

        let start = match &definition.timeline.start {
            Some(start) => parse_date(start)?,
            None => self.today,
        };
        let mode = timeline_mode(definition.timeline.mode.as_deref())?;
        let items = definition.timeline.items.unwrap_or(DEFAULT_ITEMS);
        roadmap.set_timeline(build_timeline(&definition.timeline, mode, start, items)?);

        for area in &definition.areas {
            let mut group = build_group(area);
            for task in &area.tasks {
                group.tasks.push(self.task(task, area, Scope::Overview, &root)?);
            }
            roadmap.add_group(group);
        }

        if let Some(footer) = &definition.footer {
            roadmap.set_footer(footer);
        }
        if let Some(marker) = &definition.marker {
            roadmap.set_marker(self.marker(marker)?);
        }
        debug!(
            groups = roadmap.groups.len(),
            details = roadmap.detail_task_count(),
            "built roadmap from definition"
        );
        Ok(roadmap)
    }

    fn nested(&self, parent: &Parent, definition: &Definition) -> Result<Roadmap, ConfigError> {
        let root = &parent.root;
        let mut roadmap = Roadmap::new(
            definition
                .width
                .or(root.width)
                .unwrap_or(DEFAULT_WIDTH),
            definition
                .height
                .or(root.height)
                .unwrap_or(DEFAULT_HEIGHT),
        );
        if let Some(theme) = definition.colour_theme.as_ref().or(root.colour_theme.as_ref()) {
            roadmap.set_theme(theme)?;
        }
        roadmap.typography = self.typography(root.fonts.as_ref(), definition.fonts.as_ref());
        roadmap.tags = tag_styles(root.tags.as_ref(), definition.tags.as_ref());

        let title = definition
            .title
            .clone()
            .unwrap_or_else(|| format!("{} Detailed Roadmap", parent.task.name));
        let subtitle = definition.subtitle.as_deref().or(Some(parent.area.as_str()));
        self.top_band(&mut roadmap, definition.header.as_ref(), &title, subtitle)?;

        let mode = timeline_mode(
            definition
                .timeline
                .mode
                .as_deref()
                .or(root.timeline.mode.as_deref()),
        )?;
        let task_start = parse_date(&parent.task.start)?;
        let task_end = parse_date(&parent.task.end)?;
        let start = match &definition.timeline.start {
            Some(start) => parse_date(start)?,
            None => task_start,
        };
        let items = definition
            .timeline
            .items
            .unwrap_or_else(|| default_item_count(task_start, task_end, mode));
        roadmap.set_timeline(build_timeline(&definition.timeline, mode, start, items)?);

        for area in &definition.areas {
            let mut group = build_group(area);
            for task in &area.tasks {
                group.tasks.push(self.task(task, area, Scope::Nested, root)?);
            }
            roadmap.add_group(group);
        }

        if let Some(footer) = definition.footer.as_ref().or(root.footer.as_ref()) {
            roadmap.set_footer(footer);
        }
        if let Some(marker) = &definition.marker {
            roadmap.set_marker(self.marker(marker)?);
        }
        Ok(roadmap)
    }

    fn top_band(
        &self,
        roadmap: &mut Roadmap,
        header: Option<&HeaderDef>,
        title: &str,
        subtitle: Option<&str>,
    ) -> Result<(), ConfigError> {
        let Some(def) = header else {
            roadmap.set_title(title);
            if let Some(subtitle) = subtitle {
                roadmap.set_subtitle(subtitle)?;
            }
            return Ok(());
        };

        let mut header = Header::new(def.title.as_deref().unwrap_or(title));
        if let Some(subtitle) = def.subtitle.as_deref().or(subtitle) {
            header = header.with_subtitle(subtitle);
        }
        if let Some(logo) = &def.logo {
            let path = self.resolve(logo);
            if !path.exists() {
                warn!(path = %path.display(), "header logo not found");
            }
            header = header.with_logo(Logo::new(path).size(def.logo_width, def.logo_height));
        }
        if let Some(background) = def.background {
            header.background = background;
        }
        if let Some(divider) = def.divider {
            header.divider = divider;
        }
        if let Some(padding) = def.padding_x {
            header.padding_x = padding;
        }
        if let Some(padding) = def.padding_y {
            header.padding_y = padding;
        }
        if let Some(spacing) = def.logo_spacing {
            header.logo_spacing = spacing;
        }
        roadmap.set_header(header)?;
        Ok(())
    }

    fn task(
        &self,
        def: &TaskDef,
        area: &AreaDef,
        scope: Scope,
        root: &Arc<Definition>,
    ) -> Result<Task, ConfigError> {
        let mut task = Task::new(def.name.clone(), parse_date(&def.start)?, parse_date(&def.end)?);
        task.tags = def
            .tags
            .as_ref()
            .map(|t| t.to_vec())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| vec![area.name.clone()]);
        task.fill = def.fill_colour;
        task.font_colour = def.font_colour;

        for milestone in &def.milestones {
            let mut m = Milestone::new(milestone.name.clone(), parse_date(&milestone.date)?);
            m.fill = milestone.fill_colour;
            m.font_colour = milestone.font_colour;
            task.milestones.push(m);
        }

        if let Some(detail) = self.detail(def, area, scope, root) {
            task.kind = TaskKind::Detail(detail);
        }

        let child_scope = match scope {
            Scope::Overview | Scope::Parallel => Scope::Parallel,
            Scope::Nested => Scope::Nested,
        };
        for parallel in &def.parallel {
            task.parallel.push(self.task(parallel, area, child_scope, root)?);
        }
        Ok(task)
    }

    fn detail(
        &self,
        def: &TaskDef,
        area: &AreaDef,
        scope: Scope,
        root: &Arc<Definition>,
    ) -> Option<Detail> {
        let default_body = || match scope {
            Scope::Overview | Scope::Parallel => Some(default_detail_text(def, &area.name)),
            Scope::Nested => None,
        };

        let table = match &def.detail {
            None if scope == Scope::Overview => {
                return Some(Detail {
                    body: default_body(),
                    ..Detail::default()
                })
            }
            None => return None,
            Some(DetailDef::Text(text)) => {
                return Some(Detail {
                    body: Some(text.clone()),
                    ..Detail::default()
                })
            }
            Some(DetailDef::Full(table)) => table,
        };

        let links = table
            .links
            .iter()
            .filter_map(|link| {
                let url = link.url.as_deref().filter(|u| !u.is_empty())?;
                let label = link.label.as_deref().filter(|l| !l.is_empty()).unwrap_or(url);
                Some(Link::new(label, url))
            })
            .collect();

        let nested = match (&table.roadmap, scope) {
            (Some(definition), Scope::Overview | Scope::Parallel) => {
                let loader = self.clone();
                let parent = Parent {
                    root: Arc::clone(root),
                    area: area.name.clone(),
                    task: def.clone(),
                };
                let definition = Definition::clone(definition);
                Some(NestedRoadmap::new(move || {
                    loader.nested(&parent, &definition).map_err(|err| match err {
                        ConfigError::Roadmap(err) => err,
                        other => RoadmapError::Build(other.to_string()),
                    })
                }))
            }
            (Some(_), Scope::Nested) => {
                warn!(task = %def.name, "roadmaps nested more than one level deep are ignored");
                None
            }
            (None, _) => None,
        };

        Some(Detail {
            title: table.title.clone(),
            body: table
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .or_else(default_body),
            links,
            nested,
        })
    }

    fn typography(&self, base: Option<&FontsDef>, over: Option<&FontsDef>) -> Typography {
        let mut typography = Typography::default();
        let mut pdf: Option<&FontEntry> = None;

        for fonts in [base, over].into_iter().flatten() {
            if let Some(family) = &fonts.family {
                if !family.name().is_empty() {
                    typography.family = family.name().to_string();
                }
                self.register(&mut typography, family);
            }
            for (name, entry) in &fonts.components {
                let Some(component) = component(name) else {
                    warn!(component = %name, "unknown font component ignored");
                    continue;
                };
                if entry.name().is_empty() {
                    continue;
                }
                let size = entry
                    .size()
                    .unwrap_or_else(|| typography.style(component).size);
                typography
                    .overrides
                    .insert(component, TextStyle::new(entry.name(), size));
                self.register(&mut typography, entry);
            }
            for (family, file) in &fonts.files {
                typography
                    .font_files
                    .insert(family.clone(), self.resolve(file));
            }
            if let Some(entry) = &fonts.pdf {
                pdf = Some(entry);
            }
        }

        if let Some(entry) = pdf {
            let name = if entry.name().is_empty() {
                typography.family.clone()
            } else {
                entry.name().to_string()
            };
            typography.body_font = Some(BodyFont {
                name,
                file: entry.file().map(|f| self.resolve(f)),
            });
        }
        typography
    }

    fn register(&self, typography: &mut Typography, entry: &FontEntry) {
        if let Some(file) = entry.file() {
            if !entry.name().is_empty() {
                typography
                    .font_files
                    .insert(entry.name().to_string(), self.resolve(file));
            }
        }
    }

    fn marker(&self, def: &MarkerDef) -> Result<Option<Marker>, ConfigError> {
        if !def.enabled {
            return Ok(None);
        }
        let mut marker = Marker::default();
        marker.date = def.date.as_deref().map(parse_date).transpose()?;
        marker.label = def.label.clone();
        marker.line_colour = def.line_colour;
        marker.font_colour = def.font_colour;
        if let Some(width) = def.line_width {
            marker.line_width = width;
        }
        if let Some(style) = def.line_style {
            marker.line_style = style;
        }
        Ok(Some(marker))
    }
}

fn timeline_mode(value: Option<&str>) -> Result<TimelineMode, ConfigError> {
    match value {
        Some(value) => Ok(value.parse()?),
        None => Ok(TimelineMode::Monthly),
    }
}

fn build_timeline(
    def: &TimelineDef,
    mode: TimelineMode,
    start: NaiveDate,
    items: u32,
) -> Result<Timeline, ConfigError> {
    let mut timeline = Timeline::new(mode, start, items)?.generic_dates(def.show_generic_dates);
    timeline.fill = def.fill_colour;
    timeline.font_colour = def.font_colour;
    Ok(timeline)
}

fn build_group(area: &AreaDef) -> Group {
    let mut group = Group::new(area.name.clone());
    if let Some(align) = area.align {
        group = group.align(align);
    }
    group.fill = area.fill_colour;
    group.font_colour = area.font_colour;
    group
}

/// Explicit colours merge, a later default palette replaces an earlier one.
fn tag_styles(base: Option<&TagsDef>, over: Option<&TagsDef>) -> TagStyles {
    let mut palette = Vec::new();
    let mut styles = TagStyles::new();
    for tags in [base, over].into_iter().flatten() {
        for (tag, colour) in &tags.palette {
            if !tag.is_empty() {
                styles.set_colour(tag.clone(), *colour);
            }
        }
        if !tags.defaults.is_empty() {
            palette = tags.defaults.clone();
        }
    }
    styles.with_palette(palette)
}

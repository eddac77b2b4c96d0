//! Roadmap geometry.
//!
//! A single top-down pass over the roadmap computes every box, label and
//! line position. The result is an immutable [`RoadmapLayout`] that both
//! renderers consume; nothing is positioned while drawing.

use std::fmt;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use roadmapper_core::{
    Colour, Component, Group, Header, LineStyle, Marker, Roadmap, RoadmapError, Task,
    TextAlign, TextMeasurer, TextStyle, Timeline, TitleBlock, TopBand,
};
use tracing::debug;

use crate::timeline::{partition, Partition};
use crate::{centred_baseline, Rect, TextBox};

// ============================================================================
// Settings
// ============================================================================

/// Spacing constants of the layout pass.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSettings {
    /// Outer margin on every side
    pub margin: f32,
    /// Width of the group label column as a share of the canvas width
    pub group_column_ratio: f32,
    /// Space between the group column and the timeline
    pub column_gap: f32,
    /// Space between title and subtitle in a title block
    pub title_gap: f32,
    /// Space between the top band and the timeline; holds the marker label
    pub timeline_gap: f32,
    pub timeline_min_height: f32,
    pub timeline_padding: f32,
    /// Minimum height of one task band
    pub band_min_height: f32,
    pub band_padding: f32,
    /// Vertical inset of a task bar inside its band
    pub bar_inset: f32,
    /// Horizontal padding of labels inside bars and group boxes
    pub label_padding: f32,
    pub group_gap: f32,
    pub milestone_size: f32,
    pub milestone_label_gap: f32,
    pub marker_label_gap: f32,
    pub footer_gap: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            margin: 10.0,
            group_column_ratio: 0.15,
            column_gap: 8.0,
            title_gap: 4.0,
            timeline_gap: 20.0,
            timeline_min_height: 24.0,
            timeline_padding: 6.0,
            band_min_height: 24.0,
            band_padding: 6.0,
            bar_inset: 3.0,
            label_padding: 6.0,
            group_gap: 6.0,
            milestone_size: 10.0,
            milestone_label_gap: 4.0,
            marker_label_gap: 2.0,
            footer_gap: 16.0,
        }
    }
}

impl LayoutSettings {
    pub fn margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn group_column_ratio(mut self, ratio: f32) -> Self {
        self.group_column_ratio = ratio.clamp(0.0, 0.9);
        self
    }

    pub fn timeline_gap(mut self, gap: f32) -> Self {
        self.timeline_gap = gap;
        self
    }

    pub fn group_gap(mut self, gap: f32) -> Self {
        self.group_gap = gap;
        self
    }

    pub fn footer_gap(mut self, gap: f32) -> Self {
        self.footer_gap = gap;
        self
    }

    pub fn band_min_height(mut self, height: f32) -> Self {
        self.band_min_height = height;
        self
    }
}

// ============================================================================
// Cursor and task paths
// ============================================================================

/// Vertical position of the layout pass. Only ever moves down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutCursor {
    y: f32,
}

impl LayoutCursor {
    pub const fn new(y: f32) -> Self {
        Self { y }
    }

    pub const fn y(self) -> f32 {
        self.y
    }

    #[must_use]
    pub fn advance(self, dy: f32) -> Self {
        Self {
            y: self.y + dy.max(0.0),
        }
    }
}

/// Position of a task in the roadmap tree: group index, task index, then
/// one index per level of parallel tasks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskPath {
    pub group: usize,
    pub chain: Vec<usize>,
}

impl TaskPath {
    fn child(&self, index: usize) -> Self {
        let mut chain = self.chain.clone();
        chain.push(index);
        Self {
            group: self.group,
            chain,
        }
    }

    /// Identifier such as `g0-t2` or `g0-t2-p1`, prefixed when given.
    pub fn identifier(&self, prefix: Option<&str>) -> String {
        let mut id = format!("g{}", self.group);
        for (depth, index) in self.chain.iter().enumerate() {
            let tag = if depth == 0 { 't' } else { 'p' };
            id.push_str(&format!("-{tag}{index}"));
        }
        match prefix {
            Some(prefix) => format!("{prefix}-{id}"),
            None => id,
        }
    }

    /// The task this path points at.
    pub fn resolve<'a>(&self, roadmap: &'a Roadmap) -> Option<&'a Task> {
        let group = roadmap.groups.get(self.group)?;
        let (first, rest) = self.chain.split_first()?;
        let mut task = group.tasks.get(*first)?;
        for index in rest {
            task = task.parallel.get(*index)?;
        }
        Some(task)
    }
}

// ============================================================================
// Layout output
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct LogoLayout {
    pub path: PathBuf,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderLayout {
    pub rect: Rect,
    pub background: Colour,
    pub divider: Colour,
    pub logo: Option<LogoLayout>,
    pub title: TextBox,
    pub subtitle: Option<TextBox>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TitleLayout {
    pub rect: Rect,
    pub title: TextBox,
    pub subtitle: Option<TextBox>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TopBandLayout {
    Header(HeaderLayout),
    Title(TitleLayout),
}

impl TopBandLayout {
    pub fn rect(&self) -> Rect {
        match self {
            TopBandLayout::Header(h) => h.rect,
            TopBandLayout::Title(t) => t.rect,
        }
    }

    pub fn title(&self) -> &TextBox {
        match self {
            TopBandLayout::Header(h) => &h.title,
            TopBandLayout::Title(t) => &t.title,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BucketLayout {
    pub rect: Rect,
    pub label: TextBox,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimelineLayout {
    pub rect: Rect,
    pub fill: Colour,
    pub partition: Partition,
    pub buckets: Vec<BucketLayout>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MilestoneLayout {
    pub date: NaiveDate,
    /// Bounding box of the diamond
    pub diamond: Rect,
    pub fill: Colour,
    pub label: TextBox,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskLayout {
    /// Document-wide identifier
    pub id: String,
    pub path: TaskPath,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// The task's own band, excluding parallel tasks
    pub band: Rect,
    pub bar: Rect,
    pub fill: Colour,
    pub label: TextBox,
    pub milestones: Vec<MilestoneLayout>,
    pub parallel: Vec<TaskLayout>,
    /// Own band plus every parallel band beneath it
    pub height: f32,
    pub has_detail: bool,
    pub has_nested: bool,
}

impl TaskLayout {
    fn walk<'a>(&'a self, out: &mut Vec<&'a TaskLayout>) {
        out.push(self);
        for task in &self.parallel {
            task.walk(out);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupLayout {
    /// Label column box; its height is the sum of the task heights
    pub rect: Rect,
    pub fill: Colour,
    pub label: TextBox,
    pub tasks: Vec<TaskLayout>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerLayout {
    pub date: NaiveDate,
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
    pub colour: Colour,
    pub width: f32,
    pub style: LineStyle,
    pub label: TextBox,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FooterLayout {
    pub label: TextBox,
}

/// Every position needed to draw a roadmap, top-down.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadmapLayout {
    pub width: f32,
    pub height: f32,
    pub background: Colour,
    pub top: TopBandLayout,
    pub timeline: TimelineLayout,
    pub groups: Vec<GroupLayout>,
    pub marker: Option<MarkerLayout>,
    pub footer: Option<FooterLayout>,
    /// Bottom of the lowest group (or of the timeline without groups)
    pub content_bottom: f32,
}

impl RoadmapLayout {
    /// Every task in traversal order: groups, tasks, then each task's
    /// parallel tasks.
    pub fn tasks(&self) -> Vec<&TaskLayout> {
        let mut out = Vec::new();
        for group in &self.groups {
            for task in &group.tasks {
                task.walk(&mut out);
            }
        }
        out
    }

    /// Tasks with a detail page, in traversal order.
    pub fn detail_tasks(&self) -> Vec<&TaskLayout> {
        self.tasks().into_iter().filter(|t| t.has_detail).collect()
    }

    pub fn task(&self, id: &str) -> Option<&TaskLayout> {
        self.tasks().into_iter().find(|t| t.id == id)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Runs the layout pass with a given text measurer.
pub struct LayoutEngine<'m> {
    measurer: &'m dyn TextMeasurer,
    settings: LayoutSettings,
    today: Option<NaiveDate>,
    id_prefix: Option<String>,
}

impl<'m> LayoutEngine<'m> {
    pub fn new(measurer: &'m dyn TextMeasurer) -> Self {
        Self {
            measurer,
            settings: LayoutSettings::default(),
            today: None,
            id_prefix: None,
        }
    }

    pub fn settings(mut self, settings: LayoutSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Date used for a marker without an explicit date. Defaults to the
    /// local date.
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Prefix for task identifiers, used for nested roadmaps.
    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    fn text(&self, text: &str, style: &TextStyle, colour: Colour, x: f32, baseline: f32) -> TextBox {
        TextBox {
            text: text.to_string(),
            x,
            baseline,
            style: style.clone(),
            colour,
            metrics: self.measurer.measure(text, style),
        }
    }

    pub fn layout(&self, roadmap: &Roadmap) -> Result<RoadmapLayout, RoadmapError> {
        let (top, timeline) = roadmap.validate()?;
        let s = &self.settings;
        let width = roadmap.width as f32;

        let top = match top {
            TopBand::Header(header) => TopBandLayout::Header(self.header(roadmap, header)),
            TopBand::Title(block) => TopBandLayout::Title(self.title_block(roadmap, block)),
        };
        let cursor = LayoutCursor::new(top.rect().bottom()).advance(s.timeline_gap);

        let group_column = width * s.group_column_ratio;
        let timeline_left = s.margin + group_column + s.column_gap;
        let timeline_width = (width - timeline_left - s.margin).max(1.0);
        let timeline = self.timeline(roadmap, timeline, cursor, timeline_left, timeline_width)?;
        let mut cursor = cursor.advance(timeline.rect.height).advance(s.group_gap);

        let band = self.band_height(roadmap);
        let mut groups = Vec::with_capacity(roadmap.groups.len());
        let mut content_bottom = timeline.rect.bottom();
        for (index, group) in roadmap.groups.iter().enumerate() {
            let laid = self.group(roadmap, group, index, cursor, group_column, band, &timeline);
            content_bottom = laid.rect.bottom();
            cursor = cursor.advance(laid.rect.height).advance(s.group_gap);
            groups.push(laid);
        }

        let marker = roadmap
            .marker
            .as_ref()
            .and_then(|m| self.marker(roadmap, m, &timeline, content_bottom));
        let footer = roadmap.footer.as_ref().map(|footer| {
            let style = roadmap.typography.style(Component::Footer);
            let colour = footer.font_colour.unwrap_or(roadmap.palette.footer_font);
            let metrics = self.measurer.measure(&footer.label, &style);
            let baseline = content_bottom + s.footer_gap + metrics.ascent;
            FooterLayout {
                label: self.text(&footer.label, &style, colour, (width - metrics.width) / 2.0, baseline),
            }
        });

        debug!(
            groups = groups.len(),
            buckets = timeline.buckets.len(),
            content_bottom,
            "laid out roadmap"
        );

        Ok(RoadmapLayout {
            width,
            height: roadmap.height as f32,
            background: roadmap.palette.background,
            top,
            timeline,
            groups,
            marker,
            footer,
            content_bottom,
        })
    }

    fn header(&self, roadmap: &Roadmap, header: &Header) -> HeaderLayout {
        let title_style = roadmap.typography.style(Component::Title);
        let sub_style = roadmap.typography.subtitle_style(true);
        let metrics = header.measure(self.measurer, &title_style, &sub_style);
        let rect = Rect::new(0.0, 0.0, roadmap.width as f32, metrics.height);

        let mut text_x = header.padding_x;
        let logo = header.logo().map(|logo| {
            let offset = ((metrics.content_height - logo.height) / 2.0).max(0.0);
            text_x += logo.width + header.logo_spacing;
            LogoLayout {
                path: logo.path.clone(),
                rect: Rect::new(
                    header.padding_x,
                    header.padding_y + offset,
                    logo.width,
                    logo.height,
                ),
            }
        });

        let text_height =
            metrics.title.height() + metrics.subtitle.map_or(0.0, |m| m.height() + 6.0);
        let text_top = header.padding_y + ((metrics.content_height - text_height) / 2.0).max(0.0);
        let title_baseline = text_top + metrics.title.ascent;
        let title = self.text(
            header.title(),
            &title_style,
            roadmap.palette.title_font,
            text_x,
            title_baseline,
        );
        let subtitle = header.subtitle().zip(metrics.subtitle).map(|(text, sub)| {
            let baseline = title_baseline + metrics.title.descent + 6.0 + sub.ascent;
            self.text(text, &sub_style, roadmap.palette.subtitle_font, text_x, baseline)
        });

        HeaderLayout {
            rect,
            background: header.background,
            divider: header.divider,
            logo,
            title,
            subtitle,
        }
    }

    fn title_block(&self, roadmap: &Roadmap, block: &TitleBlock) -> TitleLayout {
        let width = roadmap.width as f32;
        let top = self.settings.margin;
        let title_style = roadmap.typography.style(Component::Title);
        let m = self.measurer.measure(&block.title, &title_style);
        let title = self.text(
            &block.title,
            &title_style,
            roadmap.palette.title_font,
            (width - m.width) / 2.0,
            top + m.ascent,
        );
        let mut bottom = title.baseline + m.descent;

        let subtitle = block.subtitle.as_deref().map(|text| {
            let style = roadmap.typography.subtitle_style(false);
            let sm = self.measurer.measure(text, &style);
            let baseline = bottom + self.settings.title_gap + sm.ascent;
            bottom = baseline + sm.descent;
            self.text(
                text,
                &style,
                roadmap.palette.subtitle_font,
                (width - sm.width) / 2.0,
                baseline,
            )
        });

        TitleLayout {
            rect: Rect::new(0.0, top, width, bottom - top),
            title,
            subtitle,
        }
    }

    fn timeline(
        &self,
        roadmap: &Roadmap,
        timeline: &Timeline,
        cursor: LayoutCursor,
        left: f32,
        width: f32,
    ) -> Result<TimelineLayout, RoadmapError> {
        let s = &self.settings;
        let partition = partition(
            timeline.mode,
            timeline.start,
            timeline.items(),
            timeline.show_generic_dates,
            left,
            width,
        )?;
        let style = roadmap.typography.style(Component::Timeline);
        let colour = timeline.font_colour.unwrap_or(roadmap.palette.timeline_font);

        let text_height = partition
            .buckets
            .first()
            .map_or(0.0, |b| self.measurer.measure(&b.label, &style).height());
        let height = s.timeline_min_height.max(text_height + 2.0 * s.timeline_padding);
        let rect = Rect::new(left, cursor.y(), width, height);

        let buckets = partition
            .buckets
            .iter()
            .map(|bucket| {
                let cell = Rect::new(bucket.x, rect.y, bucket.width(), height);
                let metrics = self.measurer.measure(&bucket.label, &style);
                let x = cell.x + (cell.width - metrics.width) / 2.0;
                BucketLayout {
                    rect: cell,
                    label: self.text(&bucket.label, &style, colour, x, centred_baseline(&cell, &metrics)),
                }
            })
            .collect();

        Ok(TimelineLayout {
            rect,
            fill: timeline.fill.unwrap_or(roadmap.palette.timeline_fill),
            partition,
            buckets,
        })
    }

    fn band_height(&self, roadmap: &Roadmap) -> f32 {
        let s = &self.settings;
        let task = self
            .measurer
            .measure("Ag", &roadmap.typography.style(Component::Task))
            .height();
        let milestone = self
            .measurer
            .measure("Ag", &roadmap.typography.style(Component::Milestone))
            .height();
        s.band_min_height
            .max(task + 2.0 * s.band_padding)
            .max(milestone.max(s.milestone_size) + 2.0 * s.bar_inset)
    }

    fn group(
        &self,
        roadmap: &Roadmap,
        group: &Group,
        index: usize,
        cursor: LayoutCursor,
        column_width: f32,
        band: f32,
        timeline: &TimelineLayout,
    ) -> GroupLayout {
        let s = &self.settings;
        let mut task_cursor = cursor;
        let mut tasks = Vec::with_capacity(group.tasks.len());
        for (t, task) in group.tasks.iter().enumerate() {
            let path = TaskPath {
                group: index,
                chain: vec![t],
            };
            let laid = self.task(roadmap, task, path, task_cursor, band, timeline);
            task_cursor = task_cursor.advance(laid.height);
            tasks.push(laid);
        }
        let height = if tasks.is_empty() {
            band
        } else {
            task_cursor.y() - cursor.y()
        };

        let rect = Rect::new(s.margin, cursor.y(), column_width, height);
        let style = roadmap.typography.style(Component::Group);
        let metrics = self.measurer.measure(&group.label, &style);
        let x = match group.align {
            TextAlign::Left => rect.x + s.label_padding,
            TextAlign::Centre => rect.x + (rect.width - metrics.width) / 2.0,
            TextAlign::Right => rect.right() - s.label_padding - metrics.width,
        };
        let colour = group.font_colour.unwrap_or(roadmap.palette.group_font);
        GroupLayout {
            rect,
            fill: group.fill.unwrap_or(roadmap.palette.group_fill),
            label: self.text(&group.label, &style, colour, x, centred_baseline(&rect, &metrics)),
            tasks,
        }
    }

    fn task(
        &self,
        roadmap: &Roadmap,
        task: &Task,
        path: TaskPath,
        cursor: LayoutCursor,
        band_height: f32,
        timeline: &TimelineLayout,
    ) -> TaskLayout {
        let s = &self.settings;
        let band = Rect::new(timeline.rect.x, cursor.y(), timeline.rect.width, band_height);
        let (x0, x1) = timeline.partition.span(task.start, task.end);
        let bar = Rect::new(
            x0,
            band.y + s.bar_inset,
            (x1 - x0).max(2.0),
            band_height - 2.0 * s.bar_inset,
        );

        let style = roadmap.typography.style(Component::Task);
        let metrics = self.measurer.measure(&task.label, &style);
        let colour = task.font_colour.unwrap_or(roadmap.palette.task_font);
        let label = self.text(
            &task.label,
            &style,
            colour,
            bar.x + s.label_padding,
            centred_baseline(&bar, &metrics),
        );

        let milestones = task
            .milestones
            .iter()
            .map(|milestone| {
                let cx = timeline.partition.x_for_date(milestone.date);
                let cy = band.centre().y;
                let size = s.milestone_size;
                let diamond = Rect::new(cx - size / 2.0, cy - size / 2.0, size, size);
                let style = roadmap.typography.style(Component::Milestone);
                let metrics = self.measurer.measure(&milestone.label, &style);
                let colour = milestone
                    .font_colour
                    .unwrap_or(roadmap.palette.milestone_font);
                MilestoneLayout {
                    date: milestone.date,
                    diamond,
                    fill: milestone.fill.unwrap_or(roadmap.palette.milestone_fill),
                    label: self.text(
                        &milestone.label,
                        &style,
                        colour,
                        diamond.right() + s.milestone_label_gap,
                        centred_baseline(&diamond, &metrics),
                    ),
                }
            })
            .collect();

        let mut child_cursor = cursor.advance(band_height);
        let mut parallel = Vec::with_capacity(task.parallel.len());
        for (p, child) in task.parallel.iter().enumerate() {
            let laid = self.task(roadmap, child, path.child(p), child_cursor, band_height, timeline);
            child_cursor = child_cursor.advance(laid.height);
            parallel.push(laid);
        }

        let detail = task.detail_content();
        TaskLayout {
            id: path.identifier(self.id_prefix.as_deref()),
            path,
            start: task.start,
            end: task.end,
            band,
            bar,
            fill: task.fill.unwrap_or(roadmap.palette.task_fill),
            label,
            milestones,
            parallel,
            height: child_cursor.y() - cursor.y(),
            has_detail: detail.is_some(),
            has_nested: detail.is_some_and(|d| d.nested.is_some()),
        }
    }

    fn marker(
        &self,
        roadmap: &Roadmap,
        marker: &Marker,
        timeline: &TimelineLayout,
        content_bottom: f32,
    ) -> Option<MarkerLayout> {
        let date = marker
            .date
            .or(self.today)
            .unwrap_or_else(|| Local::now().date_naive());
        let (start, end) = (timeline.partition.start()?, timeline.partition.end()?);
        if date < start || date >= end {
            debug!(%date, "marker outside the timeline, skipped");
            return None;
        }

        let x = timeline.partition.x_for_date(date);
        let style = roadmap.typography.style(Component::Marker);
        let text = marker.label_for(date);
        let metrics = self.measurer.measure(&text, &style);
        let baseline = timeline.rect.y - self.settings.marker_label_gap - metrics.descent;
        let colour = marker.font_colour.unwrap_or(roadmap.palette.marker_font);
        Some(MarkerLayout {
            date,
            x,
            top: timeline.rect.y,
            bottom: content_bottom,
            colour: marker.line_colour.unwrap_or(roadmap.palette.marker_line),
            width: marker.line_width,
            style: marker.line_style,
            label: self.text(&text, &style, colour, x - metrics.width / 2.0, baseline),
        })
    }
}

// ============================================================================
// Geometry dump
// ============================================================================

fn write_text(f: &mut fmt::Formatter<'_>, indent: usize, kind: &str, text: &TextBox) -> fmt::Result {
    writeln!(
        f,
        "{:indent$}{kind} {:?} at ({:.1}, {:.1}) {} {:.0}pt",
        "",
        text.text,
        text.x,
        text.baseline,
        text.style.family,
        text.style.size,
        indent = indent
    )
}

fn write_task(f: &mut fmt::Formatter<'_>, indent: usize, task: &TaskLayout) -> fmt::Result {
    let marker = match (task.has_detail, task.has_nested) {
        (true, true) => " +detail +nested",
        (true, false) => " +detail",
        _ => "",
    };
    writeln!(
        f,
        "{:indent$}Task [{}] {:?} {}..{} bar {}{marker}",
        "",
        task.id,
        task.label.text,
        task.start,
        task.end,
        task.bar,
        indent = indent
    )?;
    for milestone in &task.milestones {
        writeln!(
            f,
            "{:indent$}Milestone {:?} {} diamond {}",
            "",
            milestone.label.text,
            milestone.date,
            milestone.diamond,
            indent = indent + 2
        )?;
    }
    for child in &task.parallel {
        write_task(f, indent + 2, child)?;
    }
    Ok(())
}

impl fmt::Display for RoadmapLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Roadmap {:.0}x{:.0}", self.width, self.height)?;
        match &self.top {
            TopBandLayout::Header(header) => {
                writeln!(f, "  Header {}", header.rect)?;
                if let Some(logo) = &header.logo {
                    writeln!(f, "    Logo {} {}", logo.path.display(), logo.rect)?;
                }
                write_text(f, 4, "Title", &header.title)?;
                if let Some(sub) = &header.subtitle {
                    write_text(f, 4, "Subtitle", sub)?;
                }
            }
            TopBandLayout::Title(block) => {
                writeln!(f, "  Title block {}", block.rect)?;
                write_text(f, 4, "Title", &block.title)?;
                if let Some(sub) = &block.subtitle {
                    write_text(f, 4, "Subtitle", sub)?;
                }
            }
        }

        writeln!(
            f,
            "  Timeline {} {}",
            self.timeline.partition.mode, self.timeline.rect
        )?;
        for bucket in &self.timeline.buckets {
            writeln!(f, "    Bucket {:?} {}", bucket.label.text, bucket.rect)?;
        }

        for group in &self.groups {
            writeln!(f, "  Group {:?} {}", group.label.text, group.rect)?;
            for task in &group.tasks {
                write_task(f, 4, task)?;
            }
        }

        if let Some(marker) = &self.marker {
            writeln!(
                f,
                "  Marker {} x={:.1} y={:.1}..{:.1} {:?}",
                marker.date, marker.x, marker.top, marker.bottom, marker.label.text
            )?;
        }
        if let Some(footer) = &self.footer {
            write_text(f, 2, "Footer", &footer.label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FontBook;
    use pretty_assertions::assert_eq;
    use roadmapper_core::{Detail, TimelineMode};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cursor_never_moves_up() {
        let c = LayoutCursor::new(10.0);
        assert_eq!(c.advance(-5.0).y(), 10.0);
        assert_eq!(c.advance(5.0).y(), 15.0);
        assert_eq!(c.advance(5.0).advance(0.0).y(), 15.0);
    }

    #[test]
    fn identifiers_follow_the_path() {
        let path = TaskPath {
            group: 1,
            chain: vec![2, 0],
        };
        assert_eq!(path.identifier(None), "g1-t2-p0");
        assert_eq!(path.identifier(Some("g0-t0")), "g0-t0-g1-t2-p0");
    }

    #[test]
    fn path_resolves_parallel_task() {
        let d = date(2025, 1, 1);
        let mut roadmap = Roadmap::new(800, 600);
        roadmap.add_group(
            Group::new("g").with_task(Task::new("a", d, d).parallel(Task::new("b", d, d))),
        );
        let path = TaskPath {
            group: 0,
            chain: vec![0, 0],
        };
        assert_eq!(path.resolve(&roadmap).map(|t| t.label.as_str()), Some("b"));
        let missing = TaskPath {
            group: 0,
            chain: vec![0, 3],
        };
        assert!(missing.resolve(&roadmap).is_none());
    }

    #[test]
    fn missing_timeline_is_reported() {
        let fonts = FontBook::new();
        let mut roadmap = Roadmap::new(800, 600);
        roadmap.set_title("Plan");
        assert!(matches!(
            LayoutEngine::new(&fonts).layout(&roadmap),
            Err(RoadmapError::MissingTimeline)
        ));
    }

    #[test]
    fn detail_flags_are_recorded() {
        let fonts = FontBook::new();
        let d = date(2025, 1, 1);
        let mut roadmap = Roadmap::new(800, 600);
        roadmap.set_title("Plan");
        roadmap.set_timeline(Timeline::new(TimelineMode::Monthly, d, 3).unwrap());
        roadmap.add_group(
            Group::new("g")
                .with_task(Task::new("a", d, d).detail(Detail::default()))
                .with_task(Task::new("b", d, d)),
        );
        let layout = LayoutEngine::new(&fonts).today(d).layout(&roadmap).unwrap();
        let ids: Vec<_> = layout.detail_tasks().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec!["g0-t0".to_string()]);
        assert!(!layout.groups[0].tasks[0].has_nested);
    }
}

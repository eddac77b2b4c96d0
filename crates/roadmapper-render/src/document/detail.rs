//! Detail pages and navigation buttons.
//!
//! Positions are in top-down canvas coordinates like everything else; the
//! PDF page flips them.

use roadmapper_core::{
    Colour, Component, Detail, Roadmap, TagStyles, Task, TextMeasurer, TextStyle, Typography,
};
use roadmapper_layout::{layout_chips, ChipLayout, Point, Rect, TopBandLayout};

use super::OVERVIEW_DEST;
use crate::overview::paint_top_band;
use crate::surface::{LinkTarget, Surface};
use crate::wrap::wrap_text;

pub const DEFAULT_BODY: &str = "No additional detail supplied for this item.";

const LEFT: f32 = 40.0;
const ACCENT: Colour = Colour::rgb(0x1F, 0x77, 0xB4);

const BUTTON_WIDTH: f32 = 180.0;
const BUTTON_HEIGHT: f32 = 28.0;
const BUTTON_GAP: f32 = 20.0;
/// Distance between the page bottom and the button row
const BUTTON_OFFSET: f32 = 40.0;
const BUTTON_RADIUS: f32 = 6.0;
const BUTTON_FONT_SIZE: f32 = 12.0;

/// Fonts of the detail pages: headings use the title family, prose the
/// explicit body font or else the task family.
#[derive(Clone, Debug)]
pub(crate) struct DetailFonts {
    pub heading: String,
    pub body: String,
}

impl DetailFonts {
    pub fn from_typography(typography: &Typography) -> Self {
        let body = if typography.body_font.is_some()
            || typography.overrides.contains_key(&Component::Body)
        {
            typography.style(Component::Body).family
        } else {
            typography.style(Component::Task).family
        };
        Self {
            heading: typography.style(Component::Title).family,
            body,
        }
    }

    fn heading(&self, size: f32) -> TextStyle {
        TextStyle::new(self.heading.clone(), size)
    }

    fn body(&self, size: f32) -> TextStyle {
        TextStyle::new(self.body.clone(), size)
    }
}

/// Everything a detail page shows.
pub(crate) struct DetailPage<'a> {
    pub id: &'a str,
    pub task: &'a Task,
    pub detail: &'a Detail,
    pub nested: Option<&'a Roadmap>,
    pub top: &'a TopBandLayout,
    pub fonts: &'a DetailFonts,
    pub tags: &'a TagStyles,
}

/// Filled rounded button with centred white text, linked to `target`.
pub(crate) fn nav_button(
    surface: &mut dyn Surface,
    measurer: &dyn TextMeasurer,
    fonts: &DetailFonts,
    label: &str,
    slot: usize,
    target: LinkTarget,
) {
    let (_, height) = surface.size();
    let x = LEFT + slot as f32 * (BUTTON_WIDTH + BUTTON_GAP);
    let rect = Rect::new(
        x,
        height - BUTTON_OFFSET - BUTTON_HEIGHT,
        BUTTON_WIDTH,
        BUTTON_HEIGHT,
    );
    surface.fill_round_rect(rect, BUTTON_RADIUS, ACCENT);

    let style = fonts.heading(BUTTON_FONT_SIZE);
    let width = measurer.width(label, &style);
    let baseline = rect.bottom() - ((BUTTON_HEIGHT - BUTTON_FONT_SIZE) / 2.0 + 4.0);
    surface.draw_text(
        label,
        Point::new(x + (BUTTON_WIDTH - width) / 2.0, baseline),
        &style,
        Colour::WHITE,
    );
    surface.link(rect, target);
}

fn paint_chips(chips: &ChipLayout, style: &TextStyle, surface: &mut dyn Surface) {
    for chip in &chips.chips {
        surface.fill_round_rect(chip.rect, chip.rect.height / 2.0, chip.fill);
        surface.draw_text(
            &chip.label,
            Point::new(chip.text_x, chip.baseline),
            style,
            chip.text_colour,
        );
    }
}

impl DetailPage<'_> {
    /// Paint the page. Buttons are included.
    pub fn paint(&self, surface: &mut dyn Surface, measurer: &dyn TextMeasurer) {
        let (width, _) = surface.size();
        paint_top_band(self.top, surface);

        let heading_y = self.top.rect().bottom() + 40.0;
        let heading = self.detail.title.as_deref().unwrap_or(&self.task.label);
        surface.draw_text(
            heading,
            Point::new(LEFT, heading_y),
            &self.fonts.heading(20.0),
            Colour::BLACK,
        );

        let mut body_y = heading_y + 32.0;
        let tags = self.task.display_tags();
        if !tags.is_empty() {
            let style = self.fonts.body(10.0);
            let chips = layout_chips(
                &tags,
                Point::new(LEFT, heading_y + 14.0),
                width - LEFT,
                &style,
                self.tags,
                measurer,
            );
            paint_chips(&chips, &style, surface);
            body_y = chips.next_y;
        }

        let body = self
            .detail
            .body
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(DEFAULT_BODY);
        let style = self.fonts.body(12.0);
        let mut y = body_y;
        for line in wrap_text(body, &style, width - 2.0 * LEFT, measurer) {
            surface.draw_text(&line, Point::new(LEFT, y), &style, Colour::BLACK);
            y += 16.0;
        }

        if let Some(nested) = self.nested.filter(|n| !n.groups.is_empty()) {
            y = self.paint_task_outline(nested, y + 20.0, surface, measurer);
        }

        if !self.detail.links.is_empty() {
            let mut link_y = y + 30.0;
            surface.draw_text(
                "Related Links",
                Point::new(LEFT, link_y),
                &self.fonts.heading(12.0),
                Colour::BLACK,
            );
            link_y += 20.0;
            let style = self.fonts.body(11.0);
            for link in &self.detail.links {
                let label = if link.label.trim().is_empty() {
                    link.url.as_str()
                } else {
                    link.label.as_str()
                };
                surface.draw_text(label, Point::new(LEFT, link_y), &style, ACCENT);
                let w = measurer.width(label, &style);
                surface.link(
                    Rect::new(LEFT, link_y - 12.0, w, 14.0),
                    LinkTarget::Uri(link.url.clone()),
                );
                link_y += 18.0;
            }
        }

        nav_button(
            surface,
            measurer,
            self.fonts,
            "Back to overview",
            0,
            LinkTarget::Named(OVERVIEW_DEST.to_string()),
        );
        if self.nested.is_some() {
            nav_button(
                surface,
                measurer,
                self.fonts,
                "Open detailed roadmap",
                1,
                LinkTarget::Named(format!("{}_roadmap", self.id)),
            );
        }
    }

    /// "Roadmap Tasks" listing of a nested roadmap. Returns the next free y.
    fn paint_task_outline(
        &self,
        nested: &Roadmap,
        top: f32,
        surface: &mut dyn Surface,
        measurer: &dyn TextMeasurer,
    ) -> f32 {
        let (width, _) = surface.size();
        surface.draw_text(
            "Roadmap Tasks",
            Point::new(LEFT, top),
            &self.fonts.heading(12.0),
            Colour::BLACK,
        );
        let text = self.fonts.body(11.0);
        let limit = width - 2.0 * LEFT;
        let mut y = top + 16.0;

        for group in &nested.groups {
            surface.draw_text(&format!("{}:", group.label), Point::new(LEFT, y), &text, Colour::BLACK);
            y += 14.0;
            for task in &group.tasks {
                let line = format!("- {} ({} to {})", task.label, task.start, task.end);
                surface.draw_text(&line, Point::new(60.0, y), &text, Colour::BLACK);
                y += 12.0;
                y = self.paint_outline_entry(task, 70.0, 9.0, limit - 60.0, y, surface, measurer);

                for parallel in &task.parallel {
                    let line = format!(
                        "* {} ({} to {})",
                        parallel.label, parallel.start, parallel.end
                    );
                    surface.draw_text(&line, Point::new(70.0, y), &text, Colour::BLACK);
                    y += 12.0;
                    y = self.paint_outline_entry(
                        parallel,
                        90.0,
                        8.0,
                        limit - 80.0,
                        y,
                        surface,
                        measurer,
                    );
                }
                y += 6.0;
            }
            y += 8.0;
        }
        y
    }

    /// Chips, wrapped body and milestones of one listed task.
    fn paint_outline_entry(
        &self,
        task: &Task,
        indent: f32,
        chip_size: f32,
        wrap_width: f32,
        mut y: f32,
        surface: &mut dyn Surface,
        measurer: &dyn TextMeasurer,
    ) -> f32 {
        let (width, _) = surface.size();
        let tags = task.display_tags();
        if !tags.is_empty() {
            let style = self.fonts.body(chip_size);
            let chips = layout_chips(
                &tags,
                Point::new(indent, y),
                width - LEFT,
                &style,
                self.tags,
                measurer,
            );
            paint_chips(&chips, &style, surface);
            y = chips.next_y;
        }

        if let Some(body) = task.detail_content().and_then(|d| d.body.as_deref()) {
            let style = self.fonts.body(10.0);
            for line in wrap_text(body, &style, wrap_width, measurer) {
                surface.draw_text(&line, Point::new(indent, y), &style, Colour::BLACK);
                y += 12.0;
            }
        }

        if !task.milestones.is_empty() {
            let text = self.fonts.body(11.0);
            surface.draw_text("Milestones:", Point::new(indent, y), &text, Colour::BLACK);
            y += 12.0;
            for milestone in &task.milestones {
                let line = format!("\u{2022} {} ({})", milestone.label, milestone.date);
                surface.draw_text(&line, Point::new(indent + 10.0, y), &text, Colour::BLACK);
                y += 12.0;
            }
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadmapper_core::LineStyle;
    use roadmapper_layout::FontBook;
    use std::path::Path;

    /// Keeps the text runs it is asked to draw.
    #[derive(Default)]
    struct TextRuns(Vec<(String, Point)>);

    impl Surface for TextRuns {
        fn size(&self) -> (f32, f32) {
            (600.0, 400.0)
        }
        fn fill_rect(&mut self, _rect: Rect, _colour: Colour) {}
        fn fill_round_rect(&mut self, _rect: Rect, _radius: f32, _colour: Colour) {}
        fn fill_polygon(&mut self, _points: &[Point], _colour: Colour) {}
        fn stroke_line(&mut self, _f: Point, _t: Point, _c: Colour, _w: f32, _s: LineStyle) {}
        fn draw_text(&mut self, text: &str, origin: Point, _style: &TextStyle, _colour: Colour) {
            self.0.push((text.to_string(), origin));
        }
        fn draw_image(&mut self, _path: &Path, _rect: Rect) {}
    }

    #[test]
    fn chip_text_sits_where_the_chip_layout_put_it() {
        let fonts = FontBook::new();
        let style = TextStyle::new("Helvetica", 10.0);
        let chips = layout_chips(
            &["Infra", "Data"],
            Point::new(40.0, 100.0),
            560.0,
            &style,
            &TagStyles::new(),
            &fonts,
        );

        let mut runs = TextRuns::default();
        paint_chips(&chips, &style, &mut runs);

        let expected: Vec<(String, Point)> = chips
            .chips
            .iter()
            .map(|c| (c.label.clone(), Point::new(c.text_x, c.baseline)))
            .collect();
        assert_eq!(runs.0, expected);
    }
}

//! Overview painter.
//!
//! Draws a computed [`RoadmapLayout`] onto any [`Surface`]. The raster
//! output and the first PDF page go through the same code, so they look
//! the same.

use roadmapper_core::LineStyle;
use roadmapper_layout::{GroupLayout, Point, Rect, RoadmapLayout, TaskLayout, TopBandLayout};

use crate::surface::Surface;

const BUCKET_RULE_WIDTH: f32 = 1.0;

/// Paint the whole overview, back to front.
pub fn paint(layout: &RoadmapLayout, surface: &mut dyn Surface) {
    surface.fill_rect(
        Rect::new(0.0, 0.0, layout.width, layout.height),
        layout.background,
    );
    paint_top_band(&layout.top, surface);
    paint_timeline(layout, surface);
    for group in &layout.groups {
        paint_group(group, surface);
    }
    if let Some(marker) = &layout.marker {
        surface.stroke_line(
            Point::new(marker.x, marker.top),
            Point::new(marker.x, marker.bottom),
            marker.colour,
            marker.width,
            marker.style,
        );
        surface.draw_text_box(&marker.label);
    }
    if let Some(footer) = &layout.footer {
        surface.draw_text_box(&footer.label);
    }
}

/// Header or title block. Detail pages reuse this to repeat the top band.
pub fn paint_top_band(top: &TopBandLayout, surface: &mut dyn Surface) {
    match top {
        TopBandLayout::Header(header) => {
            surface.fill_rect(header.rect, header.background);
            if let Some(logo) = &header.logo {
                surface.draw_image(&logo.path, logo.rect);
            }
            surface.draw_text_box(&header.title);
            if let Some(sub) = &header.subtitle {
                surface.draw_text_box(sub);
            }
            let y = header.rect.bottom();
            surface.stroke_line(
                Point::new(header.rect.x, y),
                Point::new(header.rect.right(), y),
                header.divider,
                1.0,
                LineStyle::Solid,
            );
        }
        TopBandLayout::Title(block) => {
            surface.draw_text_box(&block.title);
            if let Some(sub) = &block.subtitle {
                surface.draw_text_box(sub);
            }
        }
    }
}

fn paint_timeline(layout: &RoadmapLayout, surface: &mut dyn Surface) {
    let timeline = &layout.timeline;
    surface.fill_rect(timeline.rect, timeline.fill);
    for (index, bucket) in timeline.buckets.iter().enumerate() {
        if index > 0 {
            surface.stroke_line(
                Point::new(bucket.rect.x, bucket.rect.y),
                Point::new(bucket.rect.x, bucket.rect.bottom()),
                layout.background,
                BUCKET_RULE_WIDTH,
                LineStyle::Solid,
            );
        }
        surface.draw_text_box(&bucket.label);
    }
}

fn paint_group(group: &GroupLayout, surface: &mut dyn Surface) {
    surface.fill_rect(group.rect, group.fill);
    surface.draw_text_box(&group.label);
    for task in &group.tasks {
        paint_task(task, surface);
    }
}

fn paint_task(task: &TaskLayout, surface: &mut dyn Surface) {
    surface.fill_rect(task.bar, task.fill);
    surface.draw_text_box(&task.label);
    for milestone in &task.milestones {
        let d = milestone.diamond;
        let c = d.centre();
        surface.fill_polygon(
            &[
                Point::new(c.x, d.y),
                Point::new(d.right(), c.y),
                Point::new(c.x, d.bottom()),
                Point::new(d.x, c.y),
            ],
            milestone.fill,
        );
        surface.draw_text_box(&milestone.label);
    }
    for child in &task.parallel {
        paint_task(child, surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use roadmapper_core::{Colour, Group, Milestone, Roadmap, Task, TextStyle, Timeline, TimelineMode};
    use roadmapper_layout::{FontBook, LayoutEngine};
    use std::path::Path;

    /// Records the calls it receives.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Surface for Recorder {
        fn size(&self) -> (f32, f32) {
            (0.0, 0.0)
        }
        fn fill_rect(&mut self, _rect: Rect, _colour: Colour) {
            self.calls.push("rect".into());
        }
        fn fill_round_rect(&mut self, _rect: Rect, _radius: f32, _colour: Colour) {
            self.calls.push("round".into());
        }
        fn fill_polygon(&mut self, points: &[Point], _colour: Colour) {
            self.calls.push(format!("polygon {}", points.len()));
        }
        fn stroke_line(&mut self, _f: Point, _t: Point, _c: Colour, _w: f32, style: LineStyle) {
            self.calls.push(format!("line {style:?}"));
        }
        fn draw_text(&mut self, text: &str, _o: Point, _s: &TextStyle, _c: Colour) {
            self.calls.push(format!("text {text}"));
        }
        fn draw_image(&mut self, _path: &Path, _rect: Rect) {
            self.calls.push("image".into());
        }
    }

    #[test]
    fn paints_every_element_once() {
        let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();
        let mut roadmap = Roadmap::new(800, 600);
        roadmap.set_title("Plan");
        roadmap.set_timeline(Timeline::new(TimelineMode::Monthly, d(1, 1), 2).unwrap());
        roadmap.set_marker(Some(roadmapper_core::Marker::on(d(1, 20))));
        roadmap.set_footer("Draft");
        roadmap.add_group(
            Group::new("Core").with_task(
                Task::new("Build", d(1, 1), d(1, 31))
                    .milestone(Milestone::new("Cut", d(1, 15)))
                    .parallel(Task::new("Docs", d(2, 1), d(2, 10))),
            ),
        );
        let fonts = FontBook::new();
        let layout = LayoutEngine::new(&fonts).layout(&roadmap).unwrap();

        let mut recorder = Recorder::default();
        paint(&layout, &mut recorder);
        let calls = recorder.calls;

        assert_eq!(calls[0], "rect");
        assert_eq!(calls[1], "text Plan");
        for expected in ["text Jan 2025", "text Core", "text Build", "text Docs", "text Cut", "text Draft"] {
            assert_eq!(calls.iter().filter(|c| *c == expected).count(), 1, "{expected}");
        }
        assert!(calls.contains(&"polygon 4".to_string()));
        assert!(calls.contains(&"line Dashed".to_string()));
        assert_eq!(calls.last().map(String::as_str), Some("text Draft"));
    }
}

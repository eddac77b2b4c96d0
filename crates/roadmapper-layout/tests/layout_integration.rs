//! Integration tests for the layout pass

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use roadmapper_core::{
    Detail, Footer, Group, Header, Logo, Marker, Milestone, NestedRoadmap, Roadmap, RoadmapError,
    Task, TextAlign, Timeline, TimelineMode,
};
use roadmapper_layout::{FontBook, LayoutEngine, LayoutSettings, Rect, TaskLayout, TopBandLayout};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-2
}

fn quarter_roadmap() -> Roadmap {
    let mut roadmap = Roadmap::new(1000, 700);
    roadmap.set_title("Platform Roadmap");
    roadmap.set_timeline(Timeline::new(TimelineMode::Monthly, date(2025, 1, 1), 3).unwrap());
    roadmap.set_marker(Some(Marker::on(date(2025, 2, 15))));
    roadmap.add_group(
        Group::new("Core")
            .with_task(
                Task::new("Storage", date(2025, 2, 1), date(2025, 4, 30))
                    .milestone(Milestone::new("Beta", date(2025, 3, 1)))
                    .parallel(Task::new("Migration", date(2025, 2, 10), date(2025, 3, 10)))
                    .parallel(Task::new("Backfill", date(2025, 3, 1), date(2025, 3, 20))),
            )
            .with_task(Task::new("API", date(2025, 1, 1), date(2025, 1, 31))),
    );
    roadmap.add_group(Group::new("Empty"));
    roadmap.add_group(
        Group::new("Web")
            .align(TextAlign::Left)
            .with_task(Task::new("Portal", date(2025, 1, 15), date(2025, 2, 15))),
    );
    roadmap
}

#[test]
fn monthly_buckets_split_the_timeline_evenly() {
    let fonts = FontBook::new();
    let layout = LayoutEngine::new(&fonts).layout(&quarter_roadmap()).unwrap();

    let labels: Vec<_> = layout
        .timeline
        .buckets
        .iter()
        .map(|b| b.label.text.as_str())
        .collect();
    assert_eq!(labels, vec!["Jan 2025", "Feb 2025", "Mar 2025"]);

    // margin 10 + group column 150 + gap 8
    assert_eq!(layout.timeline.rect.x, 168.0);
    assert_eq!(layout.timeline.buckets[0].rect.x, layout.timeline.rect.x);
    let widths: Vec<f32> = layout.timeline.buckets.iter().map(|b| b.rect.width).collect();
    for w in &widths {
        assert!(close(*w, 274.0), "bucket width {w}");
    }
    assert!(close(layout.timeline.rect.right(), 990.0));
}

#[test]
fn task_bar_spans_inclusive_range_with_extrapolation() {
    let fonts = FontBook::new();
    let layout = LayoutEngine::new(&fonts).layout(&quarter_roadmap()).unwrap();

    let storage = &layout.groups[0].tasks[0];
    let feb = &layout.timeline.buckets[1];
    assert_eq!(storage.bar.x, feb.rect.x);
    // May 1st lies 30 days past the end of March, at March's rate
    let expected_right = 990.0 + 30.0 * (274.0 / 31.0);
    assert!(close(storage.bar.right(), expected_right), "{}", storage.bar.right());
}

#[test]
fn stacked_tasks_never_overlap_and_groups_sum_children() {
    let fonts = FontBook::new();
    let layout = LayoutEngine::new(&fonts).layout(&quarter_roadmap()).unwrap();

    for group in &layout.groups {
        let total: f32 = group.tasks.iter().map(|t| t.height).sum();
        if group.tasks.is_empty() {
            assert!(group.rect.height > 0.0);
        } else {
            assert!(close(group.rect.height, total));
        }
        for pair in group.tasks.windows(2) {
            let outer = |t: &TaskLayout| Rect::new(t.band.x, t.band.y, t.band.width, t.height);
            assert!(!outer(&pair[0]).overlaps_vertically(&outer(&pair[1])));
        }
    }

    let storage = &layout.groups[0].tasks[0];
    assert_eq!(storage.parallel.len(), 2);
    assert!(close(storage.height, storage.band.height * 3.0));
    assert!(close(storage.parallel[0].band.y, storage.band.bottom()));
    assert!(close(storage.parallel[1].band.y, storage.parallel[0].band.bottom()));

    for pair in layout.groups.windows(2) {
        assert!(pair[0].rect.bottom() < pair[1].rect.y);
    }
    assert!(close(layout.content_bottom, layout.groups[2].rect.bottom()));
}

#[test]
fn milestone_sits_on_its_date_with_label_to_the_right() {
    let fonts = FontBook::new();
    let layout = LayoutEngine::new(&fonts).layout(&quarter_roadmap()).unwrap();

    let storage = &layout.groups[0].tasks[0];
    let beta = &storage.milestones[0];
    let march = &layout.timeline.buckets[2];
    assert!(close(beta.diamond.centre().x, march.rect.x));
    assert!(close(beta.diamond.centre().y, storage.band.centre().y));
    assert!(beta.label.x > beta.diamond.right());
}

#[test]
fn marker_spans_timeline_to_content_bottom() {
    let fonts = FontBook::new();
    let layout = LayoutEngine::new(&fonts).layout(&quarter_roadmap()).unwrap();

    let marker = layout.marker.as_ref().expect("marker inside range");
    assert_eq!(marker.top, layout.timeline.rect.y);
    assert_eq!(marker.bottom, layout.content_bottom);
    assert_eq!(marker.label.text, "15 Feb 2025");
    // Label is centred on the line, above the timeline band
    assert!(close(marker.label.x + marker.label.metrics.width / 2.0, marker.x));
    assert!(marker.label.baseline < layout.timeline.rect.y);
    assert!(marker.label.bounds().y > layout.top.rect().bottom());
}

#[test]
fn marker_outside_range_is_omitted() {
    let fonts = FontBook::new();
    let mut roadmap = quarter_roadmap();
    roadmap.set_marker(Some(Marker::on(date(2025, 4, 1))));
    let layout = LayoutEngine::new(&fonts).layout(&roadmap).unwrap();
    assert!(layout.marker.is_none());

    // Undated markers use the injected date
    roadmap.set_marker(Some(Marker::default()));
    let layout = LayoutEngine::new(&fonts)
        .today(date(2025, 1, 20))
        .layout(&roadmap)
        .unwrap();
    assert_eq!(layout.marker.map(|m| m.date), Some(date(2025, 1, 20)));
}

#[test]
fn footer_is_centred_below_content() {
    let fonts = FontBook::new();
    let mut roadmap = quarter_roadmap();
    roadmap.footer = Some(Footer::new("Confidential"));
    let settings = LayoutSettings::default().footer_gap(20.0);
    let layout = LayoutEngine::new(&fonts)
        .settings(settings)
        .layout(&roadmap)
        .unwrap();

    let footer = layout.footer.expect("footer");
    let bounds = footer.label.bounds();
    assert!(close(bounds.y, layout.content_bottom + 20.0));
    assert!(close(bounds.x + bounds.width / 2.0, 500.0));
}

#[test]
fn header_places_logo_and_text() {
    let fonts = FontBook::new();
    let mut roadmap = quarter_roadmap();
    roadmap
        .set_header(
            Header::new("Platform Roadmap")
                .with_subtitle("FY25")
                .with_logo(Logo::new("logo.png").size(60.0, 60.0)),
        )
        .unwrap();
    let layout = LayoutEngine::new(&fonts).layout(&roadmap).unwrap();

    let TopBandLayout::Header(header) = &layout.top else {
        panic!("expected header layout");
    };
    let logo = header.logo.as_ref().expect("logo");
    assert_eq!(logo.rect.x, 24.0);
    assert_eq!(header.title.x, 24.0 + 60.0 + 16.0);
    assert_eq!(header.rect.height, 60.0 + 36.0);
    let sub = header.subtitle.as_ref().expect("subtitle");
    assert_eq!(sub.style.size, 14.0);
    assert!(sub.baseline > header.title.baseline);
    assert!(layout.timeline.rect.y >= header.rect.bottom() + 20.0);
}

#[test]
fn nested_identifiers_carry_the_parent_prefix() {
    let fonts = FontBook::new();
    let nested = NestedRoadmap::new(|| Ok::<_, RoadmapError>(Roadmap::new(10, 10)));
    let mut roadmap = quarter_roadmap();
    roadmap.groups[1] = Group::new("Detailed").with_task(
        Task::new("Deep", date(2025, 1, 1), date(2025, 1, 31))
            .detail(Detail {
                nested: Some(nested),
                ..Detail::default()
            })
            .parallel(
                Task::new("Side", date(2025, 1, 1), date(2025, 1, 5)).detail(Detail::default()),
            ),
    );
    let layout = LayoutEngine::new(&fonts)
        .id_prefix("g0-t3")
        .layout(&roadmap)
        .unwrap();
    let details: Vec<_> = layout
        .detail_tasks()
        .iter()
        .map(|t| (t.id.clone(), t.has_nested))
        .collect();
    assert_eq!(
        details,
        vec![
            ("g0-t3-g1-t0".to_string(), true),
            ("g0-t3-g1-t0-p0".to_string(), false),
        ]
    );
}

#[test]
fn geometry_dump_lists_every_element() {
    let fonts = FontBook::new();
    let mut roadmap = quarter_roadmap();
    roadmap.footer = Some(Footer::new("Draft"));
    let dump = LayoutEngine::new(&fonts).layout(&roadmap).unwrap().to_string();

    assert!(dump.starts_with("Roadmap 1000x700\n"));
    assert!(dump.contains("Title \"Platform Roadmap\""));
    assert!(dump.contains("Timeline MONTHLY"));
    assert!(dump.contains("Bucket \"Mar 2025\""));
    assert!(dump.contains("Group \"Empty\""));
    assert!(dump.contains("Task [g0-t0] \"Storage\" 2025-02-01..2025-04-30"));
    assert!(dump.contains("      Task [g0-t0-p1] \"Backfill\""));
    assert!(dump.contains("Milestone \"Beta\" 2025-03-01"));
    assert!(dump.contains("Marker 2025-02-15"));
    assert!(dump.contains("Footer \"Draft\""));
}

#[test]
fn layout_is_repeatable() {
    let fonts = FontBook::new();
    let roadmap = quarter_roadmap();
    let engine = LayoutEngine::new(&fonts);
    assert_eq!(engine.layout(&roadmap).unwrap(), engine.layout(&roadmap).unwrap());
}

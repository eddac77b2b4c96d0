//! Integration tests for the interactive PDF output

use chrono::NaiveDate;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use pretty_assertions::assert_eq;
use roadmapper_core::{
    Detail, Group, Link, Marker, Milestone, NestedRoadmap, Roadmap, RoadmapError, Task, Timeline,
    TimelineMode,
};
use roadmapper_render::{save, PdfRenderer, RenderError, Renderer};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn storage_plan() -> Result<Roadmap, RoadmapError> {
    let mut roadmap = Roadmap::new(800, 500);
    roadmap.set_title("Storage Plan");
    roadmap.set_timeline(Timeline::new(TimelineMode::Monthly, date(2025, 2, 1), 3)?);
    roadmap.set_marker(None);
    roadmap.add_group(
        Group::new("Phase 1")
            .with_task(Task::new("Design", date(2025, 2, 1), date(2025, 2, 28)).tag("Infra"))
            .with_task(
                Task::new("Build", date(2025, 3, 1), date(2025, 4, 15))
                    .milestone(Milestone::new("Cutover", date(2025, 4, 1))),
            ),
    );
    Ok(roadmap)
}

fn roadmap_with(nested: NestedRoadmap) -> Roadmap {
    let mut roadmap = Roadmap::new(1000, 700);
    roadmap.set_title("Platform Roadmap");
    roadmap.set_timeline(Timeline::new(TimelineMode::Monthly, date(2025, 1, 1), 6).unwrap());
    roadmap.set_marker(Some(Marker::on(date(2025, 2, 15))));
    roadmap.add_group(
        Group::new("Core")
            .with_task(
                Task::new("Storage", date(2025, 2, 1), date(2025, 4, 30))
                    .tag("Infra")
                    .tag("Data")
                    .detail(Detail {
                        title: Some("Storage deep dive".into()),
                        body: Some("Replace the storage layer.".into()),
                        links: vec![],
                        nested: Some(nested),
                    })
                    .parallel(
                        Task::new("Migration", date(2025, 2, 10), date(2025, 3, 10))
                            .detail(Detail::default()),
                    ),
            )
            .with_task(Task::new("API", date(2025, 1, 1), date(2025, 1, 31))),
    );
    roadmap.add_group(
        Group::new("Web").with_task(
            Task::new("Portal", date(2025, 1, 15), date(2025, 2, 15)).detail(Detail {
                title: None,
                body: Some("Customer portal rewrite.".into()),
                links: vec![Link::new("Design doc", "https://example.com/portal")],
                nested: None,
            }),
        ),
    );
    roadmap
}

fn sample() -> Roadmap {
    roadmap_with(NestedRoadmap::new(storage_plan))
}

fn render(roadmap: &Roadmap) -> Document {
    let bytes = PdfRenderer::new()
        .today(date(2025, 2, 15))
        .render(roadmap)
        .unwrap();
    Document::load_mem(&bytes).unwrap()
}

fn pages(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

fn page_text(doc: &Document, page: ObjectId) -> Vec<String> {
    let content = Content::decode(&doc.get_page_content(page).unwrap()).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|o| o.as_str().ok())
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .collect()
}

fn link_targets(doc: &Document, page: ObjectId) -> Vec<String> {
    let page = doc.get_dictionary(page).unwrap();
    let Ok(annots) = page.get(b"Annots").and_then(Object::as_array) else {
        return Vec::new();
    };
    annots
        .iter()
        .map(|a| doc.get_dictionary(a.as_reference().unwrap()).unwrap())
        .filter_map(|annot| annot.get(b"A").and_then(Object::as_dict).ok())
        .filter_map(|action| action.get(b"D").and_then(Object::as_name).ok())
        .map(|d| String::from_utf8_lossy(d).into_owned())
        .collect()
}

fn outline_titles(doc: &Document, first: &Object, depth: usize, out: &mut Vec<(usize, String)>) {
    let mut next = first.as_reference().ok();
    while let Some(id) = next {
        let item: &Dictionary = doc.get_dictionary(id).unwrap();
        let title = item.get(b"Title").and_then(Object::as_str).unwrap();
        out.push((depth, String::from_utf8_lossy(title).into_owned()));
        if let Ok(child) = item.get(b"First") {
            outline_titles(doc, child, depth + 1, out);
        }
        next = item.get(b"Next").and_then(Object::as_reference).ok();
    }
}

#[test]
fn pages_follow_detail_order_with_nested_page_after_its_detail() {
    let doc = render(&sample());
    let pages = pages(&doc);
    // overview, Storage, Storage nested, Migration, Portal
    assert_eq!(pages.len(), 5);

    assert!(page_text(&doc, pages[1]).contains(&"Storage deep dive".to_string()));
    let nested = page_text(&doc, pages[2]);
    assert!(nested.contains(&"Storage Plan".to_string()));
    assert!(nested.contains(&"Back to detail".to_string()));
    assert!(page_text(&doc, pages[3]).contains(&"Migration".to_string()));
    assert!(page_text(&doc, pages[4]).contains(&"Portal".to_string()));
}

#[test]
fn named_destinations_cover_every_page() {
    let doc = render(&sample());
    let catalog = doc.catalog().unwrap();
    let dests = catalog.get(b"Dests").and_then(Object::as_dict).unwrap();
    let mut names: Vec<String> = dests
        .iter()
        .map(|(k, _)| String::from_utf8_lossy(k).into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["g0-t0", "g0-t0-p0", "g0-t0_roadmap", "g1-t0", "roadmap_overview"]
    );
}

#[test]
fn overview_links_each_detail_task_once() {
    let doc = render(&sample());
    let pages = pages(&doc);
    let mut targets = link_targets(&doc, pages[0]);
    targets.sort();
    assert_eq!(targets, vec!["g0-t0", "g0-t0-p0", "g1-t0"]);
}

#[test]
fn outline_nests_detail_and_nested_entries() {
    let doc = render(&sample());
    let catalog = doc.catalog().unwrap();
    let outlines_id = catalog.get(b"Outlines").and_then(Object::as_reference).unwrap();
    let outlines = doc.get_dictionary(outlines_id).unwrap();

    let mut titles = Vec::new();
    outline_titles(&doc, outlines.get(b"First").unwrap(), 0, &mut titles);
    assert_eq!(
        titles,
        vec![
            (0, "Platform Roadmap".to_string()),
            (1, "Storage deep dive".to_string()),
            (2, "Storage Plan Detail".to_string()),
            (1, "Migration".to_string()),
            (1, "Portal".to_string()),
        ]
    );
    assert_eq!(outlines.get(b"Count").and_then(Object::as_i64).unwrap(), 5);
}

#[test]
fn buttons_depend_on_nested_roadmap() {
    let doc = render(&sample());
    let pages = pages(&doc);

    let storage = page_text(&doc, pages[1]);
    assert!(storage.contains(&"Back to overview".to_string()));
    assert!(storage.contains(&"Open detailed roadmap".to_string()));
    assert!(storage.contains(&"Roadmap Tasks".to_string()));

    let migration = page_text(&doc, pages[3]);
    assert!(migration.contains(&"Back to overview".to_string()));
    assert!(!migration.contains(&"Open detailed roadmap".to_string()));
    assert!(migration.contains(&"No additional detail supplied for this item.".to_string()));

    let mut storage_links = link_targets(&doc, pages[1]);
    storage_links.sort();
    assert_eq!(storage_links, vec!["g0-t0_roadmap", "roadmap_overview"]);
    assert_eq!(link_targets(&doc, pages[2]), vec!["g0-t0", "roadmap_overview"]);
}

#[test]
fn related_links_open_their_url() {
    let doc = render(&sample());
    let portal = pages(&doc)[4];
    assert!(page_text(&doc, portal).contains(&"Related Links".to_string()));

    let page = doc.get_dictionary(portal).unwrap();
    let annots = page.get(b"Annots").and_then(Object::as_array).unwrap();
    let uris: Vec<String> = annots
        .iter()
        .map(|a| doc.get_dictionary(a.as_reference().unwrap()).unwrap())
        .filter_map(|annot| annot.get(b"A").and_then(Object::as_dict).ok())
        .filter_map(|action| action.get(b"URI").and_then(Object::as_str).ok())
        .map(|u| String::from_utf8_lossy(u).into_owned())
        .collect();
    assert_eq!(uris, vec!["https://example.com/portal"]);
}

#[test]
fn nested_page_uses_its_own_canvas_size() {
    let doc = render(&sample());
    let pages = pages(&doc);
    let media_box = |page: ObjectId| -> Vec<f32> {
        doc.get_dictionary(page)
            .unwrap()
            .get(b"MediaBox")
            .and_then(Object::as_array)
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect()
    };
    assert_eq!(media_box(pages[0]), vec![0.0, 0.0, 1000.0, 700.0]);
    assert_eq!(media_box(pages[2]), vec![0.0, 0.0, 800.0, 500.0]);
}

#[test]
fn nested_builder_runs_once_per_task() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let roadmap = roadmap_with(NestedRoadmap::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        storage_plan()
    }));
    render(&roadmap);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_nested_builder_aborts_without_output() {
    let roadmap = roadmap_with(NestedRoadmap::new(|| {
        Err::<Roadmap, _>(RoadmapError::Build("no data".into()))
    }));

    let err = PdfRenderer::new().render(&roadmap).unwrap_err();
    match err {
        RenderError::NestedRoadmap { task, source } => {
            assert_eq!(task, "Storage");
            assert!(source.to_string().contains("no data"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roadmap.pdf");
    assert!(save(&roadmap, &path).is_err());
    assert!(!path.exists());
}

#[test]
fn roadmap_without_title_is_rejected() {
    let mut roadmap = Roadmap::new(400, 300);
    roadmap.set_timeline(Timeline::new(TimelineMode::Quarterly, date(2025, 1, 1), 4).unwrap());
    let err = PdfRenderer::new().render(&roadmap).unwrap_err();
    assert!(matches!(err, RenderError::Roadmap(RoadmapError::MissingTitle)));
}

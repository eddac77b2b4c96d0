//! End-to-end tests of the roadmapper binary

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn roadmapper(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_roadmapper"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute roadmapper")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn render_writes_png_and_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("launch.png");
    let pdf = dir.path().join("launch.pdf");
    let definition = fixture("launch.toml");

    let output = roadmapper(&[
        "render",
        path_arg(&definition),
        "--today",
        "2025-03-01",
        "--output",
        path_arg(&png),
        path_arg(&pdf),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let bytes = std::fs::read(&png).unwrap();
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));

    // Overview plus one detail page per top-level task
    let document = lopdf::Document::load(&pdf).unwrap();
    assert_eq!(document.get_pages().len(), 3);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("launch.pdf"));
}

#[test]
fn several_definitions_get_suffixed_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("roadmap.png");

    let output = roadmapper(&[
        "render",
        path_arg(&fixture("launch.toml")),
        path_arg(&fixture("mobile.json")),
        "-o",
        path_arg(&out),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert!(dir.path().join("roadmap_launch.png").is_file());
    assert!(dir.path().join("roadmap_mobile.png").is_file());
    assert!(!out.exists());
}

#[test]
fn one_bad_definition_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("roadmap.png");

    let output = roadmapper(&[
        "render",
        path_arg(&fixture("launch.toml")),
        path_arg(&fixture("missing.toml")),
        "-o",
        path_arg(&out),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.toml"));
    assert!(stderr.contains("1 of 2 definitions failed"));

    // The good definition is still rendered
    assert!(dir.path().join("roadmap_launch.png").is_file());
}

#[test]
fn unsupported_output_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("roadmap.gif");

    let output = roadmapper(&["render", path_arg(&fixture("launch.toml")), "-o", path_arg(&out)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("gif"));
    assert!(!out.exists());
}

#[test]
fn inspect_prints_the_layout() {
    let output = roadmapper(&[
        "inspect",
        path_arg(&fixture("launch.toml")),
        "--today",
        "2025-03-01",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Roadmap 1000x600"));
    assert!(stdout.contains("  Timeline "));
    assert!(stdout.contains("Task [g0-t0] \"Beta\""));
    assert!(stdout.contains("Milestone \"Invite only\""));
    assert!(stdout.contains("Marker 2025-03-01"));
    assert!(stdout.contains("Detail pages: 2"));
}

//! CLI integration tests
//!
//! Runs the `flyer-hotspots` binary against synthetic images in a temp dir.

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Binary isolated from any local or user config file
fn cli(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("flyer-hotspots").unwrap();
    cmd.current_dir(workdir)
        .env("XDG_CONFIG_HOME", workdir)
        .env_remove("RUST_LOG")
        .env_remove("API_KEY");
    cmd
}

fn demo_flyer() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/flyer-data.json")
}

/// 100x100 white page with 30x30 blocks at the given origins
fn write_page(dir: &Path, name: &str, blocks: &[(u32, u32)]) -> PathBuf {
    let mut img = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
    for &(bx, by) in blocks {
        for y in by..by + 30 {
            for x in bx..bx + 30 {
                img.put_pixel(x, y, RED);
            }
        }
    }
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn setup() -> TempDir {
    tempdir().unwrap()
}

// ============================================================
// General
// ============================================================

#[test]
fn test_help_lists_subcommands() {
    let dir = setup();
    cli(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("detect"))
        .stdout(predicate::str::contains("map"))
        .stdout(predicate::str::contains("insight"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn test_version() {
    let dir = setup();
    cli(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_info() {
    let dir = setup();
    cli(dir.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("flyer-hotspots v"))
        .stdout(predicate::str::contains("Grid size: 10 px"))
        .stdout(predicate::str::contains("Command: not configured"));
}

#[test]
fn test_info_warns_on_malformed_config() {
    let dir = setup();
    std::fs::write(dir.path().join("flyer-hotspots.toml"), "[detector\ngrid_size = ").unwrap();
    cli(dir.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Command: not configured"))
        .stderr(predicate::str::contains("failed to load config file, using defaults"));
}

// ============================================================
// detect
// ============================================================

#[test]
fn test_detect_requires_input() {
    let dir = setup();
    cli(dir.path()).arg("detect").assert().code(2);
}

#[test]
fn test_detect_single_image() {
    let dir = setup();
    let image = write_page(dir.path(), "page.png", &[(10, 10)]);

    let json = run_json(cli(dir.path()).args(["detect", "-q"]).arg(&image));
    let reports = json.as_array().unwrap();
    assert_eq!(reports.len(), 1);

    let report = &reports[0];
    assert_eq!(report["width"], 100);
    assert_eq!(report["height"], 100);
    assert_eq!(report["gridSize"], 10);
    assert_eq!(report["threshold"], 20);

    let regions = report["regions"].as_array().unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0]["id"], "auto-1");
    assert_eq!(regions[0]["x"].as_f64(), Some(10.0));
    assert_eq!(regions[0]["width"].as_f64(), Some(30.0));
}

#[test]
fn test_detect_directory_sorted_and_filtered() {
    let dir = setup();
    let pages = dir.path().join("pages");
    std::fs::create_dir(&pages).unwrap();
    write_page(&pages, "b.png", &[(10, 10), (60, 60)]);
    write_page(&pages, "a.png", &[(10, 10)]);
    std::fs::write(pages.join("notes.txt"), "not an image").unwrap();

    let json = run_json(cli(dir.path()).args(["detect", "-q", "pages"]));
    let reports = json.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0]["image"].as_str().unwrap().ends_with("a.png"));
    assert!(reports[1]["image"].as_str().unwrap().ends_with("b.png"));
    assert_eq!(reports[1]["regions"].as_array().unwrap().len(), 2);
}

#[test]
fn test_detect_missing_input() {
    let dir = setup();
    cli(dir.path())
        .args(["detect", "-q", "missing.png"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Input not found"));
}

#[test]
fn test_detect_zero_grid_size_rejected() {
    let dir = setup();
    let image = write_page(dir.path(), "page.png", &[(10, 10)]);
    cli(dir.path())
        .args(["detect", "-q", "--grid-size", "0"])
        .arg(&image)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("grid size"));
}

#[test]
fn test_detect_undecodable_image() {
    let dir = setup();
    let bogus = dir.path().join("broken.png");
    std::fs::write(&bogus, b"not a png").unwrap();
    cli(dir.path())
        .args(["detect", "-q"])
        .arg(&bogus)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid image"));
}

#[test]
fn test_detect_output_file_and_overlay() {
    let dir = setup();
    let image = write_page(dir.path(), "page.png", &[(10, 10)]);
    let output = dir.path().join("report.json");
    let overlays = dir.path().join("overlays");

    cli(dir.path())
        .args(["detect", "-q", "--pretty", "--output"])
        .arg(&output)
        .arg("--overlay")
        .arg(&overlays)
        .arg(&image)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("\n  "), "expected pretty JSON");
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json[0]["regions"].as_array().unwrap().len(), 1);

    let overlay = image::open(overlays.join("page.overlay.png")).unwrap().to_rgba8();
    assert_eq!(overlay.dimensions(), (100, 100));
}

#[test]
fn test_detect_config_file() {
    let dir = setup();
    let image = write_page(dir.path(), "page.png", &[(10, 10)]);
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "[detector]\ngrid_size = 5\nthreshold = 40\n").unwrap();

    let json = run_json(
        cli(dir.path())
            .args(["detect", "-q", "--config"])
            .arg(&config)
            .args(["--threshold", "30"])
            .arg(&image),
    );
    assert_eq!(json[0]["gridSize"], 5);
    // CLI value wins over the file
    assert_eq!(json[0]["threshold"], 30);
}

#[test]
fn test_detect_local_config_file() {
    let dir = setup();
    let image = write_page(dir.path(), "page.png", &[(10, 10)]);
    std::fs::write(dir.path().join("flyer-hotspots.toml"), "[detector]\ngrid_size = 20\n").unwrap();

    let json = run_json(cli(dir.path()).args(["detect", "-q"]).arg(&image));
    assert_eq!(json[0]["gridSize"], 20);
}

#[test]
fn test_detect_missing_config_file() {
    let dir = setup();
    let image = write_page(dir.path(), "page.png", &[(10, 10)]);
    cli(dir.path())
        .args(["detect", "-q", "--config", "nope.toml"])
        .arg(&image)
        .assert()
        .code(3);
}

// ============================================================
// map
// ============================================================

#[test]
fn test_map_order_strategy() {
    let dir = setup();
    let image = write_page(dir.path(), "page.png", &[(10, 10), (60, 60)]);

    let json = run_json(
        cli(dir.path())
            .args(["map", "-q", "--flyer"])
            .arg(demo_flyer())
            .arg(&image),
    );

    assert_eq!(json["id"], "page-1");
    let hotspots = json["hotspots"].as_array().unwrap();
    assert_eq!(hotspots.len(), 2);
    assert_eq!(hotspots[0]["id"], "auto-1");
    assert_eq!(hotspots[0]["productId"], "p1");
    assert_eq!(hotspots[1]["productId"], "p2");
}

#[test]
fn test_map_image_base_url() {
    let dir = setup();
    let image = write_page(dir.path(), "page.png", &[(10, 10)]);

    let json = run_json(
        cli(dir.path())
            .args(["map", "-q", "--image-base-url", "https://cdn.example.com/"])
            .arg("--flyer")
            .arg(demo_flyer())
            .arg(&image),
    );
    assert_eq!(json["imageUrl"], "https://cdn.example.com/catalogue.jpg");
}

#[test]
fn test_map_missing_flyer() {
    let dir = setup();
    let image = write_page(dir.path(), "page.png", &[(10, 10)]);
    cli(dir.path())
        .args(["map", "-q", "--flyer", "missing.json"])
        .arg(&image)
        .assert()
        .code(3);
}

// ============================================================
// insight
// ============================================================

#[test]
fn test_insight_not_configured() {
    let dir = setup();
    cli(dir.path())
        .args(["insight", "p5", "--flyer"])
        .arg(demo_flyer())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "API Key not configured. Unable to generate insight.",
        ));
}

#[test]
fn test_insight_unknown_product() {
    let dir = setup();
    cli(dir.path())
        .args(["insight", "p99", "--flyer"])
        .arg(demo_flyer())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown product: p99"));
}

#[cfg(unix)]
#[test]
fn test_insight_command_generator() {
    let dir = setup();
    let config = dir.path().join("insight.toml");
    std::fs::write(
        &config,
        "[insight]\ncommand = \"cat\"\nretailer = \"Main Street Hardware\"\n",
    )
    .unwrap();

    // `cat` echoes the prompt back
    cli(dir.path())
        .env("API_KEY", "test-key")
        .args(["insight", "p5", "--flyer"])
        .arg(demo_flyer())
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Main Street Hardware"))
        .stdout(predicate::str::contains("Product: Barbecue"))
        .stdout(predicate::str::contains("On Sale from $249.99"));
}

#[cfg(unix)]
#[test]
fn test_insight_command_without_key() {
    let dir = setup();
    let config = dir.path().join("insight.toml");
    std::fs::write(&config, "[insight]\ncommand = \"cat\"\n").unwrap();

    cli(dir.path())
        .args(["insight", "p5", "--flyer"])
        .arg(demo_flyer())
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("API Key not configured"));
}

#[cfg(unix)]
#[test]
fn test_insight_generator_failure() {
    let dir = setup();
    let config = dir.path().join("insight.toml");
    std::fs::write(&config, "[insight]\ncommand = \"false\"\n").unwrap();

    cli(dir.path())
        .env("API_KEY", "test-key")
        .args(["insight", "p5", "--flyer"])
        .arg(demo_flyer())
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Currently unable to generate AI insight.",
        ));
}

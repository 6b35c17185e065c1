//! Integration tests for the graph_nav_rs CLI.
//!
//! Each test runs the built binary inside a fresh temporary directory.

use std::fs;

use rstest::{fixture, rstest};
use serde_json::Value;
use tempfile::TempDir;

mod common;
use common::{json_lines, model_svg_path, run_nav_in_dir};

const BROKEN_NODE_SVG: &str = r#"<svg><g>
<polygon points="-4,4 -4,-60 120,-60 120,4"/>
<g class="node"><title>case</title><ellipse cx="30" cy="-30" rx="25" ry="12"/></g>
<g class="node"><title>odd</title><path d="M0,0C1,1 2,2 3"/></g>
</g></svg>"#;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

fn model_arg() -> String {
    model_svg_path().to_string_lossy().into_owned()
}

fn assert_success(output: &std::process::Output) {
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Last JSON line printed by `fly`.
fn fly_summary(temp_dir: &TempDir, args: &[&str]) -> Value {
    let model = model_arg();
    let mut full = vec!["fly", "--input", model.as_str()];
    full.extend_from_slice(args);
    let output = run_nav_in_dir(temp_dir.path(), &full);
    assert_success(&output);
    json_lines(&output).pop().expect("fly printed nothing")
}

// ============================================================================
// Index Command Tests
// ============================================================================

#[rstest]
fn test_cli_index_prints_every_node(temp_dir: TempDir) {
    let model = model_arg();
    let output = run_nav_in_dir(temp_dir.path(), &["index", "--input", &model]);
    assert_success(&output);

    let index: Value = serde_json::from_slice(&output.stdout).unwrap();
    let nodes = index.as_object().unwrap();
    let labels: Vec<&str> = nodes.keys().map(String::as_str).collect();
    assert_eq!(labels, ["case", "diagnosis", "sample", "study"]);
    for record in nodes.values() {
        assert_eq!(record["bounds"].as_array().unwrap().len(), 2);
        assert_eq!(record["rect"].as_array().unwrap().len(), 4);
    }
}

#[rstest]
fn test_cli_index_writes_output_file(temp_dir: TempDir) {
    let model = model_arg();
    let output = run_nav_in_dir(
        temp_dir.path(),
        &["index", "--input", &model, "--output", "index.json"],
    );
    assert_success(&output);
    assert!(output.stdout.is_empty());

    let written = fs::read_to_string(temp_dir.path().join("index.json")).unwrap();
    let index: Value = serde_json::from_str(&written).unwrap();
    assert!(index.get("case").is_some());
}

#[rstest]
fn test_cli_index_missing_input_fails(temp_dir: TempDir) {
    let output = run_nav_in_dir(temp_dir.path(), &["index", "--input", "absent.svg"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}

// ============================================================================
// Fly Command Tests
// ============================================================================

#[rstest]
fn test_cli_fly_frames_end_on_the_node(temp_dir: TempDir) {
    let model = model_arg();
    let output = run_nav_in_dir(
        temp_dir.path(),
        &["fly", "--input", &model, "--node", "study", "--frames"],
    );
    assert_success(&output);

    let lines = json_lines(&output);
    assert!(lines.len() > 2);
    let (summary, frames) = lines.split_last().unwrap();
    assert_eq!(summary["node"], "study");
    for (tick, frame) in frames.iter().enumerate() {
        assert_eq!(frame["frame"], tick);
    }
    assert_eq!(frames.last().unwrap()["view"], summary["view"]);
}

#[rstest]
fn test_cli_fly_defaults_to_case(temp_dir: TempDir) {
    let summary = fly_summary(&temp_dir, &[]);
    assert_eq!(summary["node"], "case");
    assert_eq!(summary["viewport"]["bounce_at_zoom_limits"], true);
}

#[rstest]
fn test_cli_fly_unknown_node_fails(temp_dir: TempDir) {
    let model = model_arg();
    let output = run_nav_in_dir(
        temp_dir.path(),
        &["fly", "--input", &model, "--node", "subject"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Node not found: subject"));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[rstest]
fn test_cli_flag_overrides_config_file(temp_dir: TempDir) {
    fs::write(
        temp_dir.path().join("nav.yaml"),
        "viewport:\n  width: 320\n  height: 600\n",
    )
    .unwrap();

    let from_file = fly_summary(&temp_dir, &["--config", "nav.yaml", "--node", "study"]);
    assert_eq!(from_file["viewport"]["width"], 320.0);
    assert_eq!(from_file["viewport"]["height"], 600.0);
    assert_eq!(from_file["view"]["zoom"], 2.0);

    let overridden = fly_summary(
        &temp_dir,
        &["--config", "nav.yaml", "--width", "640", "--node", "study"],
    );
    assert_eq!(overridden["viewport"]["width"], 640.0);
    assert_eq!(overridden["viewport"]["height"], 600.0);
    assert_eq!(overridden["view"]["zoom"], 3.0);
}

#[rstest]
fn test_cli_prefer_replaces_configured_labels(temp_dir: TempDir) {
    fs::write(
        temp_dir.path().join("nav.yaml"),
        "preferred_labels:\n  - diagnosis\n",
    )
    .unwrap();

    let from_file = fly_summary(&temp_dir, &["--config", "nav.yaml"]);
    assert_eq!(from_file["node"], "diagnosis");

    let replaced = fly_summary(&temp_dir, &["--config", "nav.yaml", "--prefer", "study"]);
    assert_eq!(replaced["node"], "study");

    let missing = fly_summary(&temp_dir, &["--prefer", "subject"]);
    assert_eq!(missing["node"], "case");
}

#[rstest]
fn test_cli_no_bounce_flag(temp_dir: TempDir) {
    let summary = fly_summary(&temp_dir, &["--no-bounce"]);
    assert_eq!(summary["viewport"]["bounce_at_zoom_limits"], false);
}

// ============================================================================
// Invalid Node Tests
// ============================================================================

#[rstest]
#[case::strict(&[], false)]
#[case::skipping(&["--skip-invalid-nodes"], true)]
fn test_cli_invalid_node_handling(
    temp_dir: TempDir,
    #[case] extra: &[&str],
    #[case] succeeds: bool,
) {
    fs::write(temp_dir.path().join("broken.svg"), BROKEN_NODE_SVG).unwrap();
    let mut args = vec!["fly", "--input", "broken.svg"];
    args.extend_from_slice(extra);
    let output = run_nav_in_dir(temp_dir.path(), &args);

    assert_eq!(output.status.success(), succeeds);
    if succeeds {
        assert_eq!(json_lines(&output).last().unwrap()["node"], "case");
        assert!(String::from_utf8_lossy(&output.stderr).contains("skipping invalid node"));
    } else {
        assert!(String::from_utf8_lossy(&output.stderr).contains("malformed path"));
    }
}

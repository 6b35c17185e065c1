//! Common test utilities shared across integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Graphviz rendering of a small data model, shared by the integration tests.
pub fn model_svg_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/model.svg")
}

/// Run the graph_nav_rs binary directly in the specified directory
pub fn run_nav_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_graph_nav_rs"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "graph_nav_rs=warn")
        .output()
        .expect("Failed to execute graph_nav_rs binary")
}

/// Stdout split into one JSON value per line.
pub fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

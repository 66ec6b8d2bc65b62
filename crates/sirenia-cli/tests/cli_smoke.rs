use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("ranking").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn layout_json(args: &[&str]) -> Value {
    let exe = assert_cmd::cargo_bin!("sirenia-cli");
    let output = Command::new(exe)
        .current_dir(repo_root())
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

fn num(v: &Value, key: &str) -> f64 {
    v[key].as_f64().unwrap_or_else(|| panic!("missing number `{key}` in {v}"))
}

fn min_node_left(doc: &Value) -> f64 {
    doc["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| num(n, "x") - num(n, "width") / 2.0)
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn cli_lays_out_basic_fixture() {
    let path = fixture("basic.json");
    let doc = layout_json(&[path.to_string_lossy().as_ref()]);

    let nodes = doc["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 5);
    assert_eq!(nodes[0]["id"], "start");
    assert!(nodes.iter().all(|n| num(n, "x").is_finite() && num(n, "y").is_finite()));

    let edges = doc["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 6);
    assert_eq!(edges[0]["id"], "s-p");
    assert_eq!(edges[2]["id"], "e2");
    for e in edges {
        assert!(e["points"].as_array().unwrap().len() >= 2, "edge {e} is not routed");
    }

    let bb = &doc["boundingBox"];
    assert!(num(bb, "width") > 0.0);
    assert!(num(bb, "height") > 0.0);
}

#[test]
fn cli_reads_stdin_and_is_deterministic() {
    let text = fs::read_to_string(fixture("basic.json")).expect("read fixture");
    let exe = assert_cmd::cargo_bin!("sirenia-cli");

    let first = assert_cmd::Command::new(exe)
        .arg("-")
        .write_stdin(text.clone())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let second = assert_cmd::Command::new(exe)
        .write_stdin(text)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(first, second);
}

#[test]
fn cli_applies_document_settings_and_flag_overrides() {
    let path = fixture("disconnected.json");
    let path = path.to_string_lossy();

    let with_doc_margin = layout_json(&[path.as_ref()]);
    let left = num(&with_doc_margin["boundingBox"], "left");
    assert!((left - (min_node_left(&with_doc_margin) - 25.0)).abs() < 1e-9);

    let with_flag_margin = layout_json(&["--margin", "0", path.as_ref()]);
    let left = num(&with_flag_margin["boundingBox"], "left");
    assert!((left - min_node_left(&with_flag_margin)).abs() < 1e-9);
}

#[test]
fn cli_settings_file_is_validated_by_the_layout() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let settings = tmp.path().join("settings.json");
    fs::write(&settings, r#"{ "pivotCount": 0 }"#).expect("write settings");

    let exe = assert_cmd::cargo_bin!("sirenia-cli");
    Command::new(exe)
        .current_dir(repo_root())
        .args([
            "--settings",
            settings.to_string_lossy().as_ref(),
            fixture("basic.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .code(1);
}

#[test]
fn cli_reports_dangling_edges_as_layout_errors() {
    let exe = assert_cmd::cargo_bin!("sirenia-cli");
    let output = Command::new(exe)
        .arg(fixture("dangling_edge.json"))
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&output.get_output().stderr).to_string();
    assert!(stderr.contains("missing"), "unexpected stderr: {stderr}");
}

#[test]
fn cli_rejects_malformed_input_and_unknown_flags() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let broken = tmp.path().join("broken.json");
    fs::write(&broken, "{ \"nodes\": [").expect("write input");

    let exe = assert_cmd::cargo_bin!("sirenia-cli");
    Command::new(exe).arg(&broken).assert().code(2);
    Command::new(exe).arg("--no-such-flag").assert().code(2);
    Command::new(exe)
        .arg(tmp.path().join("absent.json"))
        .assert()
        .code(2);
}

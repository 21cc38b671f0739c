#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/social.json")
}

/// Config dir with no `cli.toml`, so user settings never leak into a test.
fn empty_config() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("cli.toml");
    (dir, path)
}

#[test]
fn explain_json_reports_index_probe() {
    let (_dir, config) = empty_config();
    let output = cargo_bin_cmd!("penumbra")
        .arg("--config")
        .arg(&config)
        .arg("--graph")
        .arg(fixture())
        .args(["--format", "json", "explain", "--label", "Person"])
        .args(["--has", "name=eq:Alice"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["root"]["op"], "ResidualFilter");
    assert_eq!(json["root"]["inputs"][0]["op"], "IndexProbe");
}

#[test]
fn explain_text_redacts_literals() {
    let (_dir, config) = empty_config();
    let output = cargo_bin_cmd!("penumbra")
        .arg("--config")
        .arg(&config)
        .arg("--graph")
        .arg(fixture())
        .args(["--theme", "plain", "explain", "--redact", "--label", "Person"])
        .args(["--has", "name=eq:Alice"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8");
    assert!(text.contains("IndexProbe"));
    assert!(text.contains("value=?"));
    assert!(!text.contains("value=Alice"));
}

#[test]
fn resolve_json_lists_matching_edges() {
    let (_dir, config) = empty_config();
    let output = cargo_bin_cmd!("penumbra")
        .arg("--config")
        .arg(&config)
        .arg("--graph")
        .arg(fixture())
        .args(["--format", "json", "resolve", "--edges"])
        .args(["--has", "weight=within:[1,2,3]"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["path"]["path"], "full_scan");
    let ids: Vec<u64> = json["elements"]
        .as_array()
        .expect("elements")
        .iter()
        .map(|e| e["id"].as_u64().expect("id"))
        .collect();
    assert_eq!(ids, vec![10, 11, 13]);
}

#[test]
fn resolve_by_id_uses_config_default_graph() {
    let (dir, config) = empty_config();
    fs::write(
        &config,
        format!(
            "[graph]\ndefault = {:?}\n\n[planner]\nwarn_on_full_scan = false\n",
            fixture().display().to_string()
        ),
    )
    .expect("write config");
    let output = cargo_bin_cmd!("penumbra")
        .arg("--config")
        .arg(&config)
        .args(["--theme", "plain", "resolve", "--id", "2", "--id", "99"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8");
    assert!(text.contains("v[2] Person"));
    assert!(text.contains("Elements (1)"));
    drop(dir);
}

#[test]
fn missing_graph_is_reported() {
    let (_dir, config) = empty_config();
    cargo_bin_cmd!("penumbra")
        .env_remove("PENUMBRA_GRAPH")
        .arg("--config")
        .arg(&config)
        .args(["explain"])
        .assert()
        .failure();
}

#[test]
fn malformed_constraint_is_a_usage_error() {
    let (_dir, config) = empty_config();
    cargo_bin_cmd!("penumbra")
        .arg("--config")
        .arg(&config)
        .arg("--graph")
        .arg(fixture())
        .args(["resolve", "--has", "name"])
        .assert()
        .failure();
}

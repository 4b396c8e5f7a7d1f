//! Integration tests for the aegis binary
//!
//! Each test writes a small config into its own temp directory so training
//! stays quick and no user config leaks in.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const FAST_CONFIG: &str = "\
[forest]
trees = 15

[boosting]
iterations = 15
";

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = dir.path().join("aegis.toml");
    std::fs::write(&config, FAST_CONFIG).expect("Failed to write config");
    (dir, config)
}

fn aegis(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_aegis"));
    cmd.arg("--config")
        .arg(config)
        .env_remove("AEGIS_SENSITIVITY")
        .env_remove("AEGIS_FAILURE_MODE")
        .env_remove("AEGIS_CORPUS")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_score_json() {
    let (_dir, config) = workspace();
    let output = aegis(&config)
        .args([
            "score",
            "--sender",
            "security@gmail.com",
            "--subject",
            "Security Alert: Unusual Sign-in",
            "--snippet",
            "Verify your paypal identity now",
            "--format",
            "json",
        ])
        .output()
        .expect("Failed to run aegis");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    let score = json["score"].as_u64().expect("score");
    assert!(score <= 100);
    assert!(json["risk_level"].is_string());
    assert!(json["explanation"].as_str().is_some_and(|e| !e.is_empty()));
    assert_eq!(json["breakdown"]["override_applied"], "spoof_boost");
}

#[test]
fn test_score_text() {
    let (_dir, config) = workspace();
    let output = aegis(&config)
        .args(["score", "--sender", "notifications@github.com", "--subject", "New pull request"])
        .output()
        .expect("Failed to run aegis");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Risk:"));
    assert!(text.contains("/100"));
}

#[test]
fn test_batch_from_stdin() {
    let (_dir, config) = workspace();
    let mut child = aegis(&config)
        .arg("batch")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn aegis");

    let input = concat!(
        "{\"sender\": \"security@gmail.com\", \"subject\": \"Alert\", \"snippet\": \"verify now\"}\n",
        "\n",
        "{\"sender\": \"notifications@github.com\", \"subject\": \"New pull request\"}\n",
    );
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("Failed to wait for aegis");

    assert!(output.status.success());
    let lines: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .map(|l| serde_json::from_str(l).expect("one JSON verdict per line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|v| v["score"].as_u64().is_some_and(|s| s <= 100)));
}

#[test]
fn test_batch_rejects_malformed_line() {
    let (dir, config) = workspace();
    let input = dir.path().join("messages.jsonl");
    std::fs::write(&input, "{\"sender\": \"a@b.com\"}\n{not json}\n").unwrap();

    let output = aegis(&config).arg("batch").arg(&input).output().expect("Failed to run aegis");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2"));
}

#[test]
fn test_custom_corpus_single_class_fails() {
    let (dir, config) = workspace();
    let corpus = dir.path().join("corpus.json");
    std::fs::write(
        &corpus,
        r#"[{"sender": "a@b.com", "subject": "x", "snippet": "", "phishing": true},
            {"sender": "c@d.com", "subject": "y", "snippet": "", "phishing": true}]"#,
    )
    .unwrap();

    let output = aegis(&config)
        .arg("--corpus")
        .arg(&corpus)
        .args(["score", "--subject", "hello"])
        .output()
        .expect("Failed to run aegis");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("single class"));
}

#[test]
fn test_invalid_config_fails() {
    let (dir, _) = workspace();
    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "[thresholds]\nhigh = 0.9\ncritical = 0.5\n").unwrap();

    let output = aegis(&bad).arg("inspect").output().expect("Failed to run aegis");
    assert!(!output.status.success());
}

#[test]
fn test_inspect_json() {
    let (_dir, config) = workspace();
    let output = aegis(&config)
        .args(["inspect", "--format", "json"])
        .output()
        .expect("Failed to run aegis");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(json["model"]["examples"], 28);
    assert_eq!(json["features"].as_array().map(Vec::len), Some(20));
    assert!(json["model"]["vocabulary"].as_array().is_some_and(|v| v.len() <= 50));
    assert_eq!(json["policy"]["failure_mode"], "open");
    assert_eq!(json["model"]["ensemble"]["calibration_folds"], 3);
    assert_eq!(json["model"]["ensemble"]["forest_trees"], 15);
    assert_eq!(json["model"]["ensemble"]["boosting_iterations"], 15);
}

#[test]
fn test_eval_json() {
    let (_dir, config) = workspace();
    let output = aegis(&config)
        .args(["eval", "--folds", "2", "--format", "json"])
        .output()
        .expect("Failed to run aegis");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(json["examples"], 28);
    assert!(json["accuracy"].as_f64().is_some_and(|a| (0.0..=1.0).contains(&a)));
}

#[test]
fn test_rejects_out_of_range_sensitivity() {
    let (_dir, config) = workspace();
    let output = aegis(&config)
        .args(["score", "--sensitivity", "1.5"])
        .output()
        .expect("Failed to run aegis");
    assert!(!output.status.success());
}

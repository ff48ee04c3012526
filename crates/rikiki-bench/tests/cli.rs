use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const CONFIG: &str = r#"
run_id: "cli_check"
matches:
  seed: 7
  count: 1
schedule:
  max_hand: 2
agents:
  - name: "nash"
    kind: "nash"
    params:
      repetitions: 8
  - name: "random"
    kind: "random"
outputs:
  jsonl: "out/{run_id}/rounds.jsonl"
  summary_md: "out/{run_id}/summary.md"
"#;

#[test]
fn validate_only_skips_the_tournament() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bench.yaml");
    fs::write(&path, CONFIG).expect("config written");

    Command::cargo_bin("rikiki-bench")
        .expect("binary built")
        .current_dir(dir.path())
        .arg("--config")
        .arg(&path)
        .arg("--validate-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded configuration 'cli_check'"))
        .stdout(predicate::str::contains("Validation-only mode"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn oversized_hands_are_rejected() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bench.yaml");
    fs::write(&path, CONFIG).expect("config written");

    Command::cargo_bin("rikiki-bench")
        .expect("binary built")
        .current_dir(dir.path())
        .arg("--config")
        .arg(&path)
        .args(["--max-hand", "27", "--validate-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("schedule.max_hand"));
}

#[test]
fn plays_a_short_run() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bench.yaml");
    fs::write(&path, CONFIG).expect("config written");

    Command::cargo_bin("rikiki-bench")
        .expect("binary built")
        .current_dir(dir.path())
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tournament complete for 'cli_check'"));

    let rows = fs::read_to_string(dir.path().join("out/cli_check/rounds.jsonl"))
        .expect("rows written");
    // 1,2,1 hands with two agents.
    assert_eq!(rows.lines().count(), 6);
}

//! CLI smoke tests through the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn wingman() -> Command {
    Command::cargo_bin("wingman").unwrap()
}

#[test]
fn test_score_text_output() {
    wingman()
        .args([
            "score",
            "train for a marathon and eat healthy",
            "run a 10k and hit the gym",
            "--seed",
            "7",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compatibility:"));
}

#[test]
fn test_score_json_output_is_parseable() {
    let output = wingman()
        .args([
            "score",
            "learn rust",
            "ship a side project",
            "--seed",
            "7",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let score = value["score"].as_u64().unwrap();
    assert!(score <= 100);
}

#[test]
fn test_score_identical_bios_near_maximum() {
    let bio = "train for a marathon and eat healthy";
    let output = wingman()
        .args(["score", bio, bio, "--no-jitter", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["score"].as_u64().unwrap(), 100);
    assert_eq!(value["neutral"], serde_json::Value::Bool(false));
}

#[test]
fn test_score_seeded_runs_are_reproducible() {
    let run = || {
        wingman()
            .args(["score", "save money", "budget better", "--seed", "42"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_taxonomy_lists_categories() {
    wingman()
        .arg("taxonomy")
        .assert()
        .success()
        .stdout(predicate::str::contains("fitness").and(predicate::str::contains("career")));
}

#[test]
fn test_taxonomy_single_category() {
    wingman()
        .args(["taxonomy", "--category", "fitness"])
        .assert()
        .success()
        .stdout(predicate::str::contains("weightlifting"));
}

#[test]
fn test_taxonomy_unknown_category_fails() {
    wingman()
        .args(["taxonomy", "--category", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category"));
}

#[test]
fn test_score_requires_two_bios() {
    wingman().args(["score", "only one"]).assert().failure();
}

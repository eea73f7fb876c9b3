//! CLI Tests
//!
//! Argument parsing and command output over the seed recipe.

use pretty_assertions::assert_eq;
use sous_cli::{apply_command, command, review_command, run, validate_command, Decision};
use sous_recipe::{Patch, Recipe};
use sous_session::SessionConfig;
use sous_test_utils::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn review_requires_a_known_decision() {
    let parsed = command().try_get_matches_from([
        "sous", "review", "--recipe", "r.json", "--patches", "p.json", "--decision", "maybe",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn config_flag_is_global() {
    let matches = command()
        .try_get_matches_from([
            "sous", "validate", "--recipe", "r.json", "--patches", "p.json", "--config", "s.toml",
        ])
        .unwrap();
    assert_eq!(
        matches.get_one::<PathBuf>("config"),
        Some(&PathBuf::from("s.toml"))
    );
}

#[test]
fn validate_reports_codes() {
    let report = validate_command(&seed_recipe(), &invalid_patch_set(), false).unwrap();

    assert!(!report.success);
    assert!(report.output.starts_with("invalid (1 error(s))"));
    assert!(report.output.contains("STEP_DONE_IMMUTABLE"));
}

#[test]
fn validate_json_output() {
    let report = validate_command(&seed_recipe(), &valid_patch_set(), true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report.output).unwrap();

    assert!(report.success);
    assert_eq!(value["valid"], true);
    assert_eq!(value["errors"], serde_json::json!([]));
}

#[test]
fn apply_prints_new_recipe() {
    let report = apply_command(&seed_recipe(), &valid_patch_set()).unwrap();
    let recipe: Recipe = serde_json::from_str(&report.output).unwrap();

    assert!(report.success);
    assert_eq!(recipe.version, 2);
    assert_eq!(recipe.notes.len(), 2);
}

#[test]
fn review_reject_emits_hidden_fact() {
    let report = review_command(
        seed_recipe(),
        &patch_set(&seed_recipe(), vec![Patch::remove_ingredient(SALT_ID)]),
        Decision::Reject,
        &SessionConfig::default(),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&report.output).unwrap();

    assert!(report.success);
    assert_eq!(value["decision"], "reject");
    assert_eq!(value["recipe"]["version"], 1);
    assert_eq!(
        value["hiddenContext"],
        serde_json::json!(["PATCH_REJECTED: aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa"])
    );
}

#[test]
fn review_approve_purges_removed_rows() {
    let report = review_command(
        seed_recipe(),
        &patch_set(&seed_recipe(), vec![Patch::remove_ingredient(SALT_ID)]),
        Decision::Approve,
        &SessionConfig::default(),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&report.output).unwrap();

    assert_eq!(value["recipe"]["version"], 2);
    assert_eq!(value["recipe"]["ingredients"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["changeSet"]["removedIngredientIds"][0], SALT_ID.to_string());
}

#[test]
fn run_reads_files_end_to_end() {
    let dir = TempDir::new().unwrap();
    let recipe = write_fixture(
        dir.path(),
        "recipe.json",
        &serde_json::to_string(&seed_recipe()).unwrap(),
    );
    let patches = write_fixture(
        dir.path(),
        "patches.json",
        &serde_json::to_string(&invalid_patch_set()).unwrap(),
    );

    let matches = command()
        .try_get_matches_from([
            "sous".into(),
            "validate".into(),
            "--recipe".into(),
            recipe.into_os_string(),
            "--patches".into(),
            patches.into_os_string(),
        ])
        .unwrap();
    let report = run(&matches, &SessionConfig::default()).unwrap();

    assert!(!report.success);
    assert!(report.output.contains("STEP_DONE_IMMUTABLE"));
}

#[test]
fn malformed_patch_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let recipe = write_fixture(
        dir.path(),
        "recipe.json",
        &serde_json::to_string(&seed_recipe()).unwrap(),
    );
    let patches = write_fixture(dir.path(), "patches.json", r#"{"patches": [{"op": "explode"}]}"#);

    let matches = command()
        .try_get_matches_from([
            "sous".into(),
            "apply".into(),
            "--recipe".into(),
            recipe.into_os_string(),
            "--patches".into(),
            patches.into_os_string(),
        ])
        .unwrap();
    let err = run(&matches, &SessionConfig::default()).unwrap_err();

    assert!(format!("{err:#}").contains("parsing"));
}

#[test]
fn apply_writes_out_file() {
    let dir = TempDir::new().unwrap();
    let recipe = write_fixture(
        dir.path(),
        "recipe.json",
        &serde_json::to_string(&seed_recipe()).unwrap(),
    );
    let patches = write_fixture(
        dir.path(),
        "patches.json",
        &serde_json::to_string(&valid_patch_set()).unwrap(),
    );
    let out = dir.path().join("next.json");

    let matches = command()
        .try_get_matches_from([
            "sous".into(),
            "apply".into(),
            "--recipe".into(),
            recipe.into_os_string(),
            "--patches".into(),
            patches.into_os_string(),
            "--out".into(),
            out.clone().into_os_string(),
        ])
        .unwrap();
    let report = run(&matches, &SessionConfig::default()).unwrap();

    assert!(report.success);
    let written: Recipe = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written.version, 2);
}

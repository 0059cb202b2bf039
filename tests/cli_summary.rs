use std::fs;

use clap::Parser;
use tabular_rl::cli::commands::{
    q_learning::{self, QLearningArgs},
    value_iteration::{self, ValueIterationArgs},
};
use tempfile::tempdir;

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let contents = fs::read_to_string(path).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[test]
fn value_iteration_summary_without_extension_appends_json() {
    let tmp = tempdir().unwrap();
    let summary_stem = tmp.path().join("vi_run");

    let args = ValueIterationArgs::parse_from([
        "frozen-lake-value-iteration",
        "--map",
        "4x4",
        "--theta",
        "1e-8",
        "--evaluate",
        "5",
        "--summary",
        summary_stem.to_str().unwrap(),
    ]);
    value_iteration::execute(args).expect("value iteration with summary should succeed");

    let expected_path = summary_stem.with_extension("json");
    assert!(
        expected_path.exists(),
        "expected summary at {}",
        expected_path.display()
    );

    let parsed = read_json(&expected_path);
    assert_eq!(parsed["algorithm"], "value-iteration");
    assert_eq!(parsed["solver"]["converged"], true);
    assert_eq!(parsed["evaluation"]["episodes"], 5);
    assert_eq!(parsed["evaluation"]["success_rate"], 1.0);
    assert_eq!(parsed["policy"].as_array().unwrap().len(), 16);
    assert_eq!(parsed["state_values"].as_array().unwrap().len(), 16);
}

#[test]
fn q_learning_summary_directory_argument_creates_default_file() {
    let tmp = tempdir().unwrap();
    let summary_dir = tmp.path().join("summaries");
    let summary_arg = format!("{}{}", summary_dir.display(), std::path::MAIN_SEPARATOR);

    let args = QLearningArgs::parse_from([
        "frozen-lake-q-learning",
        "--episodes",
        "40",
        "--seed",
        "3",
        "--max-steps",
        "30",
        "--evaluate",
        "2",
        "--summary",
        &summary_arg,
    ]);
    q_learning::execute(args).expect("q-learning with summary should succeed");

    let expected_path = summary_dir.join(q_learning::SUMMARY_FILE_NAME);
    let parsed = read_json(&expected_path);
    assert_eq!(parsed["algorithm"], "q-learning");
    assert_eq!(parsed["training"]["episodes"], 40);
    assert_eq!(parsed["config"]["seed"], 3);
    assert_eq!(parsed["lake"]["max_steps"], 30);
    assert_eq!(parsed["evaluation"]["episodes"], 2);
}

#[test]
fn run_file_supplies_defaults_and_flags_override() {
    let tmp = tempdir().unwrap();
    let config_path = tmp.path().join("run.json");
    fs::write(
        &config_path,
        r#"{
            "lake": { "map": "SFFF,FFFF,FFFF,FFFG" },
            "value_iteration": { "gamma": 0.5, "theta": 1e-8 },
            "evaluation": { "episodes": 3 }
        }"#,
    )
    .unwrap();
    let summary_path = tmp.path().join("summary.json");

    let args = ValueIterationArgs::parse_from([
        "frozen-lake-value-iteration",
        "--config",
        config_path.to_str().unwrap(),
        "--gamma",
        "0.9",
        "--summary",
        summary_path.to_str().unwrap(),
    ]);
    value_iteration::execute(args).unwrap();

    let parsed = read_json(&summary_path);
    assert_eq!(parsed["lake"]["map"], "SFFF,FFFF,FFFF,FFFG");
    assert_eq!(parsed["config"]["gamma"], 0.9);
    assert_eq!(parsed["evaluation"]["episodes"], 3);
    assert_eq!(parsed["evaluation"]["mean_steps"], 6.0);
}

#[test]
fn skip_evaluation_leaves_evaluation_empty() {
    let tmp = tempdir().unwrap();
    let summary_path = tmp.path().join("skip.json");

    let args = ValueIterationArgs::parse_from([
        "frozen-lake-value-iteration",
        "--slippery",
        "--skip-evaluation",
        "--summary",
        summary_path.to_str().unwrap(),
    ]);
    value_iteration::execute(args).unwrap();

    let parsed = read_json(&summary_path);
    assert_eq!(parsed["lake"]["slippery"], true);
    assert!(parsed["evaluation"].is_null());
}

#[test]
fn invalid_map_is_reported() {
    let args = ValueIterationArgs::parse_from(["frozen-lake-value-iteration", "--map", "SFX,FFG"]);
    let err = value_iteration::execute(args).unwrap_err();
    assert!(format!("{err:#}").contains("map"));
}

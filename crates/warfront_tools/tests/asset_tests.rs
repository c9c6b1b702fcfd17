//! Checks that the shipped sample data stays loadable and playable.

use std::io::Write;
use std::path::{Path, PathBuf};

use warfront_core::combat_log::CombatRecord;
use warfront_tools::{loader, play, validate, ToolError};

fn asset(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/data").join(name)
}

#[test]
fn test_sample_scenario_is_clean() {
    let config = loader::load_config(Some(&asset("core.ron"))).unwrap();
    let report = validate::validate_file(&asset("skirmish.ron"), &config).unwrap();
    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.units, 6);
    assert_eq!((report.width, report.height), (10, 6));
}

#[test]
fn test_sample_script_fires_once() {
    let config = loader::load_config(Some(&asset("core.ron"))).unwrap();
    let scenario = loader::load_scenario(&asset("skirmish.ron")).unwrap();
    let intents = loader::load_script(&asset("skirmish.jsonl")).unwrap();

    let mut out = Vec::new();
    let summary = play::run_script(&scenario, config, &intents, &mut out).unwrap();
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.combats, 1);

    let line = String::from_utf8(out).unwrap();
    let record: CombatRecord = serde_json::from_str(line.trim()).unwrap();
    assert!(record.has_moved);
    assert!(record.outcome.retaliated);
}

#[test]
fn test_script_from_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{{\"SelectAt\":{{\"col\":0,\"row\":0}}}}").unwrap();
    writeln!(file, "\"Cancel\"").unwrap();
    writeln!(file, "\"Cancel\"").unwrap();
    drop(file);

    let scenario = loader::load_scenario(&asset("skirmish.ron")).unwrap();
    let intents = loader::load_script(&path).unwrap();
    let summary = play::run_script(&scenario, Default::default(), &intents, &mut Vec::new()).unwrap();
    assert_eq!((summary.accepted, summary.ignored, summary.rejected), (2, 1, 0));
}

#[test]
fn test_missing_script_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = loader::load_script(&dir.path().join("nope.jsonl")).unwrap_err();
    assert!(matches!(err, ToolError::FileNotFound(_)));
}

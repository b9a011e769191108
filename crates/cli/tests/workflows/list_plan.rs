//! Read-only commands: `list` and `plan`

use crate::common::SnapshotFixture;
use crate::snapthin;
use anyhow::Result;
use std::fs;

const MIN_3H10: i64 = 190;
const MIN_3H20: i64 = 200;
const MIN_10D: i64 = 10 * 24 * 60;

#[test]
fn test_list_human_output() -> Result<()> {
    let fx = SnapshotFixture::new()?;
    let names = fx.with_ages(&[30, MIN_3H10, MIN_10D])?;

    let result = snapthin!(fx.root(), "--config", fx.config_arg(), "list").assert_success()?;

    assert!(result.contains_stdout("Snapshots"));
    // Newest first
    assert_eq!(
        result.snapshot_names(),
        vec![names[0].clone(), names[1].clone(), names[2].clone()]
    );
    assert!(result.contains_stdout("1 weeks ago"));
    Ok(())
}

#[test]
fn test_list_json_skips_foreign_entries() -> Result<()> {
    let fx = SnapshotFixture::new()?;
    let names = fx.with_ages(&[MIN_10D, 30])?;
    fs::create_dir(fx.snapshots.join("not-a-snapshot"))?;
    fs::create_dir(fx.snapshots.join("20241301000000"))?;
    fs::write(fx.snapshots.join("20200101000000"), b"a file, not a snapshot")?;

    let result =
        snapthin!(fx.root(), "--config", fx.config_arg(), "list", "--json").assert_success()?;
    let json = result.json()?;
    let entries = json.as_array().expect("array");

    assert_eq!(entries.len(), 2);
    // Oldest first
    assert_eq!(entries[0]["name"], names[0].as_str());
    assert_eq!(entries[1]["name"], names[1].as_str());
    assert!(entries[0]["age_secs"].as_i64().unwrap() >= MIN_10D * 60);
    Ok(())
}

#[test]
fn test_list_empty_directory() -> Result<()> {
    let fx = SnapshotFixture::new()?;

    let result = snapthin!(fx.root(), "--config", fx.config_arg(), "list").assert_success()?;
    assert!(result.contains_stdout("No snapshots"));
    Ok(())
}

#[test]
fn test_plan_json() -> Result<()> {
    let fx = SnapshotFixture::new()?;
    let names = fx.with_ages(&[30, MIN_3H10, MIN_3H20, MIN_10D])?;
    let (recent, kept, superseded, old) = (&names[0], &names[1], &names[2], &names[3]);

    let result =
        snapthin!(fx.root(), "--config", fx.config_arg(), "plan", "--json").assert_success()?;
    let json = result.json()?;

    assert_eq!(json["schedule"], "1h,1d,7d");

    let keep: Vec<&str> = json["keep"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["snapshot"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(keep, vec![kept.as_str(), recent.as_str()]);
    assert_eq!(json["keep"][0]["reason"]["kind"], "representative");
    assert_eq!(json["keep"][0]["reason"]["bucket"]["tier"], 1);
    assert_eq!(json["keep"][0]["reason"]["bucket"]["slot"], 3);
    assert_eq!(json["keep"][1]["reason"]["kind"], "newest");

    let delete: Vec<&str> = json["delete"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["snapshot"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(delete, vec![old.as_str(), superseded.as_str()]);
    assert_eq!(json["delete"][0]["reason"]["kind"], "beyond_horizon");
    assert_eq!(json["delete"][1]["reason"]["kind"], "superseded");
    assert_eq!(json["delete"][1]["reason"]["by"], kept.as_str());

    // Planning never touches the directory
    assert_eq!(fx.present()?.len(), 4);
    Ok(())
}

#[test]
fn test_plan_human_output() -> Result<()> {
    let fx = SnapshotFixture::new()?;
    fx.with_ages(&[30, MIN_3H10, MIN_3H20, MIN_10D])?;

    let result = snapthin!(fx.root(), "--config", fx.config_arg(), "plan").assert_success()?;

    assert!(result.contains_stdout("Retention Plan"));
    assert!(result.contains_stdout("beyond horizon"));
    assert!(result.contains_stdout("superseded by"));
    // Four rows plus the name in the "superseded by" reason
    assert_eq!(result.snapshot_names().len(), 5);
    Ok(())
}

#[test]
fn test_plan_flag_overrides() -> Result<()> {
    let fx = SnapshotFixture::new()?;
    fx.with_ages(&[30, MIN_3H10, MIN_3H20, MIN_10D])?;

    let result = snapthin!(
        fx.root(),
        "--config",
        fx.config_arg(),
        "plan",
        "--keep-recent",
        "4",
        "--json"
    )
    .assert_success()?;
    let json = result.json()?;
    assert_eq!(json["keep"].as_array().unwrap().len(), 4);
    assert!(json["delete"].as_array().unwrap().is_empty());

    let result = snapthin!(
        fx.root(),
        "--config",
        fx.config_arg(),
        "plan",
        "--max-count",
        "1",
        "--json"
    )
    .assert_success()?;
    let json = result.json()?;
    assert_eq!(json["max_count"], 1);
    assert_eq!(json["keep"].as_array().unwrap().len(), 1);
    assert_eq!(json["delete"].as_array().unwrap().len(), 3);

    // A wider schedule keeps the 10-day-old snapshot
    let result = snapthin!(
        fx.root(),
        "--config",
        fx.config_arg(),
        "plan",
        "--schedule",
        "1h,1d,30d",
        "--json"
    )
    .assert_success()?;
    let json = result.json()?;
    assert_eq!(json["schedule"], "1h,1d,30d");
    assert_eq!(json["delete"].as_array().unwrap().len(), 1);
    Ok(())
}

#[test]
fn test_plan_rejects_bad_schedule() -> Result<()> {
    let fx = SnapshotFixture::new()?;

    let result = snapthin!(
        fx.root(),
        "--config",
        fx.config_arg(),
        "plan",
        "--schedule",
        "1d,1h"
    )
    .assert_failure()?;

    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("strictly increasing"));
    Ok(())
}

#[test]
fn test_missing_snapshot_directory() -> Result<()> {
    let fx = SnapshotFixture::new()?;
    let missing = fx.root().join("missing");

    let result = snapthin!(
        fx.root(),
        "--config",
        fx.config_arg(),
        "list",
        "--dir",
        missing.to_str().unwrap()
    )
    .assert_failure()?;

    assert!(result.contains_stderr("Error:"));
    assert!(result.contains_stderr("missing"));
    Ok(())
}

#[test]
fn test_no_directory_configured() -> Result<()> {
    let fx = SnapshotFixture::new()?;
    let empty = fx.root().join("empty.toml");
    fs::write(&empty, "")?;

    let result = snapthin!(fx.root(), "--config", empty.to_str().unwrap(), "plan")
        .assert_failure()?;

    assert!(result.contains_stderr("No snapshot directory"));
    Ok(())
}

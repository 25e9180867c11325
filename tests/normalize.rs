mod common;

use std::fs;

use common::{FakeRunner, TWO_MONITORS, init_logger, scratch_dir};
use rlds::{DisplayError, DisplayNormalizer};

#[test]
fn test_larger_monitor_is_resized() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let dir = scratch_dir("resize");
    let backup = dir.join("screen_mode.bkp");

    let runner = FakeRunner::new().on("kscreen-doctor --outputs", TWO_MONITORS);
    let normalizer = DisplayNormalizer::new(&runner, "kscreen-doctor", &backup);

    assert_eq!(normalizer.normalize(false)?, Some(1920));
    assert_eq!(
        runner.calls(),
        [
            "kscreen-doctor --outputs",
            "kscreen-doctor output.1.mode.1920x1080@60"
        ]
    );
    assert_eq!(fs::read_to_string(&backup)?, "0,1\n1,2\n");
    Ok(())
}

#[test]
fn test_order_does_not_matter() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let dir = scratch_dir("order");

    let swapped = "Output: 4 HDMI-A-1 Modes: 2:2560x1440@60* Geometry: 0,0 2560x1440\nOutput: 7 DP-1 Modes: 1:1920x1080@75* Geometry: 2560,0 1920x1080";
    let runner = FakeRunner::new().on("kscreen-doctor --outputs", swapped);
    let normalizer = DisplayNormalizer::new(&runner, "kscreen-doctor", dir.join("screen_mode.bkp"));

    assert_eq!(normalizer.normalize(false)?, Some(1920));
    assert_eq!(
        runner.calls_to("kscreen-doctor output"),
        ["kscreen-doctor output.4.mode.1920x1080@75"]
    );
    Ok(())
}

#[test]
fn test_matching_monitors_are_left_alone() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let dir = scratch_dir("matching");

    let same = "Output: 0 DP-1 Modes: 0:1920x1080@144* Geometry\nOutput: 1 DP-2 Modes: 3:1920x1080@60* Geometry";
    let runner = FakeRunner::new().on("kscreen-doctor --outputs", same);
    let normalizer = DisplayNormalizer::new(&runner, "kscreen-doctor", dir.join("screen_mode.bkp"));

    assert_eq!(normalizer.normalize(false)?, Some(1920));
    assert_eq!(runner.calls(), ["kscreen-doctor --outputs"]);
    Ok(())
}

#[test]
fn test_single_monitor_is_accepted() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let dir = scratch_dir("single");
    let backup = dir.join("screen_mode.bkp");

    let runner = FakeRunner::new().on(
        "kscreen-doctor --outputs",
        "Output: 2 eDP-1 Modes: 5:2880x1800@120* Geometry",
    );
    let normalizer = DisplayNormalizer::new(&runner, "kscreen-doctor", &backup);

    assert_eq!(normalizer.normalize(false)?, Some(2880));
    assert_eq!(runner.calls().len(), 1);
    assert_eq!(fs::read_to_string(&backup)?, "2,5\n");
    Ok(())
}

#[test]
fn test_topology_errors() {
    init_logger();
    let dir = scratch_dir("topology");

    let three = "Output: 0 A Modes: 0:1920x1080@60* Geometry\nOutput: 1 B Modes: 0:1920x1080@60* Geometry\nOutput: 2 C Modes: 0:1920x1080@60* Geometry";
    for (listing, found) in [("", 0), (three, 3)] {
        let runner = FakeRunner::new().on("kscreen-doctor --outputs", listing);
        let normalizer =
            DisplayNormalizer::new(&runner, "kscreen-doctor", dir.join("screen_mode.bkp"));

        match normalizer.normalize(false) {
            Err(DisplayError::Topology { found: f }) => assert_eq!(f, found),
            other => panic!("expected a topology error, got {:?}", other),
        }
        assert_eq!(runner.calls().len(), 1);
        assert!(!dir.join("screen_mode.bkp").exists());
    }
}

#[test]
fn test_missing_active_mode_fails_before_backup() {
    init_logger();
    let dir = scratch_dir("no-active");
    let backup = dir.join("screen_mode.bkp");

    let listing = "Output: 0 DP-1 Modes: 0:1920x1080@60* Geometry\nOutput: 1 DP-2 Modes: 0:2560x1440@60 Geometry";
    let runner = FakeRunner::new().on("kscreen-doctor --outputs", listing);
    let normalizer = DisplayNormalizer::new(&runner, "kscreen-doctor", &backup);

    assert!(matches!(
        normalizer.normalize(false),
        Err(DisplayError::NoActiveMode { output: 1 })
    ));
    assert!(!backup.exists());
    assert_eq!(runner.calls().len(), 1);
}

#[test]
fn test_revert_restores_recorded_modes() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let dir = scratch_dir("revert");
    let backup = dir.join("screen_mode.bkp");

    let runner = FakeRunner::new().on("kscreen-doctor --outputs", TWO_MONITORS);
    let normalizer = DisplayNormalizer::new(&runner, "kscreen-doctor", &backup);

    normalizer.normalize(false)?;
    assert_eq!(normalizer.normalize(true)?, None);

    assert_eq!(
        runner.calls().last().map(String::as_str),
        Some("kscreen-doctor output.0.mode.1 output.1.mode.2")
    );
    assert!(!backup.exists());
    Ok(())
}

#[test]
fn test_revert_without_backup() {
    init_logger();
    let dir = scratch_dir("revert-missing");

    let runner = FakeRunner::new();
    let normalizer = DisplayNormalizer::new(&runner, "kscreen-doctor", dir.join("screen_mode.bkp"));

    assert!(matches!(
        normalizer.normalize(true),
        Err(DisplayError::BackupMissing(_))
    ));
    assert!(runner.calls().is_empty());
}

#[test]
fn test_existing_backup_is_kept() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let dir = scratch_dir("keep-backup");
    let backup = dir.join("screen_mode.bkp");
    fs::write(&backup, "0,0\n1,0\n")?;

    let runner = FakeRunner::new().on("kscreen-doctor --outputs", TWO_MONITORS);
    let normalizer = DisplayNormalizer::new(&runner, "kscreen-doctor", &backup);

    assert!(matches!(
        normalizer.normalize(false),
        Err(DisplayError::BackupExists(_))
    ));
    assert!(runner.calls().is_empty());
    assert_eq!(fs::read_to_string(&backup)?, "0,0\n1,0\n");

    let forced = normalizer.overwrite_backup(true);
    assert_eq!(forced.normalize(false)?, Some(1920));
    assert_eq!(fs::read_to_string(&backup)?, "0,1\n1,2\n");
    Ok(())
}

#[test]
fn test_display_tool_failure_propagates() {
    init_logger();
    let dir = scratch_dir("tool-failure");

    let runner = FakeRunner::new().fail("kscreen-doctor", "kscreen-doctor: no backend");
    let normalizer = DisplayNormalizer::new(&runner, "kscreen-doctor", dir.join("screen_mode.bkp"));

    assert!(matches!(
        normalizer.normalize(false),
        Err(DisplayError::Command(_))
    ));
}

#[test]
fn test_fractional_mode_is_sent_as_listed() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let dir = scratch_dir("fractional");

    let listing = "Output: 0 DP-1 Modes: 0:2560x1440@143.91* 1:1920x1080@60.00 Geometry\nOutput: 1 HDMI-A-1 Modes: 4:1920x1080@59.94*! Geometry";
    let runner = FakeRunner::new().on("kscreen-doctor --outputs", listing);
    let normalizer = DisplayNormalizer::new(&runner, "kscreen-doctor", dir.join("screen_mode.bkp"));

    assert_eq!(normalizer.normalize(false)?, Some(1920));
    assert_eq!(
        runner.calls_to("kscreen-doctor output"),
        ["kscreen-doctor output.0.mode.1920x1080@59.94"]
    );
    Ok(())
}

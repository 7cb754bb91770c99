//! Directory scans and edits through `ControllerDb`.

use joycal::db::{
    decode, encode, Axis, AxisCalibration, ControllerDb, Key, PinnedFields, Profile,
};
use joycal::error::JoyError;

use crate::common::fixtures::{ProfileDir, GAMEPAD, NAME_ONLY, VENDOR_WIDE};

fn stick_profile() -> Profile {
    Profile::new()
        .with_axis(Axis::X, AxisCalibration::new(-512, 511, 2, 8, 0).centered())
        .with_axis(Axis::Y, AxisCalibration::new(-512, 511, 2, 8, 0).centered())
        .with_axis(Axis::Throttle, AxisCalibration::new(0, 255, 0, 0, 0))
}

#[test]
fn test_reload_is_idempotent() {
    let dir = ProfileDir::with_files(&[
        ("a.conf", GAMEPAD),
        ("b.conf", VENDOR_WIDE),
        ("c.conf", NAME_ONLY),
    ]);
    let db = ControllerDb::new(dir.path());

    db.reload().unwrap();
    let first = db.snapshot();
    db.reload().unwrap();
    let second = db.snapshot();

    assert_eq!(first.len(), 3);
    assert_eq!(*first, *second);
}

#[test]
fn test_duplicate_key_keeps_first_file() {
    let dir = ProfileDir::with_files(&[
        ("1-first.conf", GAMEPAD),
        ("2-second.conf", GAMEPAD),
        ("3-other.conf", VENDOR_WIDE),
    ]);
    let db = ControllerDb::new(dir.path());

    let report = db.reload().unwrap();
    assert_eq!(db.len(), 2);
    assert_eq!(report.duplicate_count(), 1);
    assert_eq!(report.files_processed.len(), 3);

    let (_, profile) = db.find(0x1234, 0x5678, 1, "Test Pad").unwrap();
    assert!(profile.path().unwrap().ends_with("1-first.conf"));
}

#[test]
fn test_bad_files_are_skipped_not_fatal() {
    let dir = ProfileDir::with_files(&[
        ("good.conf", GAMEPAD),
        ("no-match.conf", "[ABS_X]\nmin=0\n"),
        ("bad-axis.conf", "[match]\nvendor=1\n\n[ABS_NOPE]\nmin=0\n"),
        ("bad-int.conf", "[match]\nvendor=1\n\n[ABS_X]\nmin=low\n"),
        ("notes.txt", "not a profile"),
        (".#good.conf", GAMEPAD),
    ]);
    let db = ControllerDb::new(dir.path());

    let report = db.reload().unwrap();
    assert_eq!(db.len(), 1);
    assert_eq!(report.issues.len(), 3);
    assert!(report
        .issues
        .iter()
        .all(|e| matches!(e, JoyError::Decode { .. })));
    assert_eq!(report.skipped.len(), 2);
}

#[test]
fn test_save_then_find_after_reload() {
    let dir = ProfileDir::new();
    let db = ControllerDb::new(dir.path());
    db.reload().unwrap();

    let saved = db
        .save(0x046d, 0xc215, 0x0100, "Extreme 3D", stick_profile(), PinnedFields::ALL)
        .unwrap();
    assert_eq!(
        dir.file_names(),
        vec!["046d-c215-0100 (Extreme 3D).conf".to_string()]
    );

    // The map only changes on reload.
    assert!(db.find(0x046d, 0xc215, 0x0100, "Extreme 3D").is_none());
    db.reload().unwrap();

    let (_, found) = db.find(0x046d, 0xc215, 0x0100, "Extreme 3D").unwrap();
    assert!(found.same_calibration(&saved));
    assert_eq!(found.path(), saved.path());
}

#[test]
fn test_save_with_pinned_fields_makes_wildcard_profile() {
    let dir = ProfileDir::new();
    let db = ControllerDb::new(dir.path());

    let pinned: PinnedFields = "vendor,product".parse().unwrap();
    db.save(0x046d, 0xc215, 0x0100, "Extreme 3D", stick_profile(), pinned)
        .unwrap();
    assert_eq!(dir.file_names(), vec!["046d-c215-0000.conf".to_string()]);

    db.reload().unwrap();
    let (key, _) = db.find(0x046d, 0xc215, 0x0200, "Extreme 3D Pro").unwrap();
    assert_eq!(key, Key::from_raw(0x046d, 0xc215, 0, ""));
}

#[test]
fn test_save_rejects_unpinned_identity_without_io() {
    let dir = ProfileDir::new();
    let missing = dir.path().join("not-created");
    let db = ControllerDb::new(&missing);

    let result = db.save(0x046d, 0xc215, 1, "Pad", stick_profile(), PinnedFields::NONE);
    assert!(matches!(result, Err(JoyError::InvalidIdentity)));
    assert!(!missing.exists());
}

#[test]
fn test_save_creates_directory() {
    let dir = ProfileDir::new();
    let nested = dir.path().join("profiles");
    let db = ControllerDb::new(&nested);

    db.save(1, 2, 3, "", stick_profile(), PinnedFields::ALL)
        .unwrap();
    assert!(nested.join("0001-0002-0003.conf").is_file());
}

#[test]
fn test_colliding_names_overwrite() {
    let dir = ProfileDir::new();
    let db = ControllerDb::new(dir.path());

    db.save(0, 0, 0, "My/Pad", stick_profile(), PinnedFields::ALL)
        .unwrap();
    db.save(0, 0, 0, "My_Pad", Profile::new(), PinnedFields::ALL)
        .unwrap();
    assert_eq!(dir.file_names(), vec!["My_Pad.conf".to_string()]);

    db.reload().unwrap();
    let (key, profile) = db.find(0, 0, 0, "My_Pad").unwrap();
    assert_eq!(key.name(), Some("My_Pad"));
    assert!(profile.is_empty());
}

#[test]
fn test_remove_by_name_and_identity() {
    let dir = ProfileDir::with_files(&[("pad.conf", GAMEPAD)]);
    let db = ControllerDb::new(dir.path());

    db.save(0x1234, 0, 0, "", stick_profile(), PinnedFields::ALL)
        .unwrap();
    db.remove_identity(0x1234, 0, 0, "").unwrap();
    assert_eq!(dir.file_names(), vec!["pad.conf".to_string()]);

    db.remove(std::path::Path::new("pad.conf")).unwrap();
    assert!(dir.file_names().is_empty());

    let again = db.remove(std::path::Path::new("pad.conf"));
    assert!(matches!(again, Err(JoyError::NotFound { .. })));
}

#[test]
fn test_remove_rejects_paths_outside_directory() {
    let dir = ProfileDir::new();
    let db = ControllerDb::new(dir.path().join("db"));
    let outside = dir.write("victim.conf", GAMEPAD);

    let result = db.remove(&outside);
    assert!(matches!(result, Err(JoyError::OutsideDatabase { .. })));
    assert!(outside.exists());
}

#[test]
fn test_saved_file_decodes_to_same_pair() {
    let dir = ProfileDir::new();
    let db = ControllerDb::new(dir.path());
    let key = Key::from_raw(0xabcd, 0x0001, 0, " Padded\tName\\");

    let saved = db.save_key(&key, stick_profile()).unwrap();
    let text = std::fs::read_to_string(saved.path().unwrap()).unwrap();
    let (decoded_key, decoded) = decode(&text).unwrap();

    assert_eq!(decoded_key, key);
    assert!(decoded.same_calibration(&stick_profile()));
    assert_eq!(encode(&decoded_key, &decoded), text);
}

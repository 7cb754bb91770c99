//! Lookup behavior over profiles loaded from disk.

use joycal::db::{ControllerDb, Key};

use crate::common::fixtures::{ProfileDir, GAMEPAD, NAME_ONLY, VENDOR_WIDE};

const CATCH_ALL: &str = "[match]\n\n[ABS_Z]\nmin=0\nmax=255\n";

fn loaded(files: &[(&str, &str)]) -> (ProfileDir, ControllerDb) {
    let dir = ProfileDir::with_files(files);
    let db = ControllerDb::new(dir.path());
    db.reload().unwrap();
    (dir, db)
}

#[test]
fn test_exact_match_wins_over_wildcard() {
    let (_dir, db) = loaded(&[("a.conf", VENDOR_WIDE), ("b.conf", GAMEPAD)]);

    let (key, profile) = db.find(0x1234, 0x5678, 0x0001, "Test Pad").unwrap();
    assert_eq!(key, Key::from_raw(0x1234, 0x5678, 0x0001, "Test Pad"));
    assert!(profile.path().unwrap().ends_with("b.conf"));
}

#[test]
fn test_vendor_wildcard_matches_any_product() {
    let (_dir, db) = loaded(&[("a.conf", VENDOR_WIDE)]);

    assert!(db.find(0x1234, 0x9999, 0x0042, "Other Pad").is_some());
    assert!(db.find(0x1234, 0, 0, "").is_some());
    assert!(db.find(0x4321, 0x5678, 0x0001, "Test Pad").is_none());
}

#[test]
fn test_catch_all_profile_matches_everything() {
    let (_dir, db) = loaded(&[("default.conf", CATCH_ALL)]);

    assert!(db.find(0xdead, 0xbeef, 1, "Anything").is_some());
    assert!(db.find(0, 0, 0, "").is_some());
}

#[test]
fn test_tie_break_follows_key_order() {
    // Both the catch-all and the vendor entry match; the catch-all sorts first.
    let (_dir, db) = loaded(&[("z.conf", VENDOR_WIDE), ("a.conf", CATCH_ALL)]);

    let (key, _) = db.find(0x1234, 0x0001, 0, "").unwrap();
    assert!(key.is_wildcard());
}

#[test]
fn test_name_only_profile() {
    let (_dir, db) = loaded(&[("stick.conf", NAME_ONLY), ("pad.conf", GAMEPAD)]);

    let (key, _) = db.find(0x0f0d, 0x00c1, 0x0110, "Arcade Stick").unwrap();
    assert_eq!(key.name(), Some("Arcade Stick"));
    assert!(db.find(0x0f0d, 0x00c1, 0x0110, "arcade stick").is_none());
}

#[test]
fn test_unknown_fields_in_query_act_as_wildcards() {
    let (_dir, db) = loaded(&[("pad.conf", GAMEPAD)]);

    // A device that does not report its name still finds the full profile.
    assert!(db.find(0x1234, 0x5678, 0x0001, "").is_some());
    assert!(db.find(0x1234, 0x5678, 0x0002, "").is_none());
}

#[test]
fn test_empty_database_finds_nothing() {
    let dir = ProfileDir::new();
    let db = ControllerDb::new(dir.path());
    db.reload().unwrap();
    assert!(db.find(0x1234, 0x5678, 1, "Test Pad").is_none());
}

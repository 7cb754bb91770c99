//! Robot-mode end-to-end tests.

use serde_json::{json, Value};

use crate::common::cli::CliRunner;
use crate::common::fixtures::{ProfileDir, GAMEPAD, VENDOR_WIDE};
use crate::common::init_test_logging;

#[test]
fn robot_quick_start_outputs_json() {
    init_test_logging();
    let profiles = ProfileDir::new();
    let result = CliRunner::new(profiles.path()).run(&["--robot"]);
    result.assert_success();

    let json = result.json();
    assert_eq!(json.get("tool").and_then(Value::as_str), Some("joycal"));
    assert!(json.get("queries").is_some());
    assert!(json.get("output_modes").is_some());
}

#[test]
fn robot_list_empty_directory() {
    init_test_logging();
    let profiles = ProfileDir::new();
    CliRunner::new(profiles.path())
        .run_robot(&["list"])
        .assert_success()
        .assert_json_array_len("", 0);
}

#[test]
fn robot_list_reports_keys_and_axes() {
    init_test_logging();
    let profiles = ProfileDir::with_files(&[("pad.conf", GAMEPAD), ("vendor.conf", VENDOR_WIDE)]);
    let result = CliRunner::new(profiles.path()).run_robot(&["list"]);

    result
        .assert_success()
        .assert_json_array_len("", 2)
        // Key order: the vendor-only entry has unset product and sorts first.
        .assert_json_field("/0/key/vendor", &json!(0x1234))
        .assert_json_field("/0/key/product", &Value::Null)
        .assert_json_field("/1/key/name", &json!("Test Pad"))
        .assert_json_field("/1/axes/ABS_X/flat_centered", &json!(true))
        .assert_json_field("/1/axes/ABS_X/min", &json!(-32768));
}

#[test]
fn robot_find_exact_and_wildcard() {
    init_test_logging();
    let profiles = ProfileDir::with_files(&[("pad.conf", GAMEPAD), ("vendor.conf", VENDOR_WIDE)]);
    let cli = CliRunner::new(profiles.path());

    cli.run_robot(&[
        "find",
        "--vendor",
        "1234",
        "--product",
        "5678",
        "--dev-version",
        "1",
        "--name",
        "Test Pad",
    ])
    .assert_success()
    .assert_json_field("/found", &json!(true))
    .assert_json_field("/profile/key/name", &json!("Test Pad"));

    cli.run_robot(&["find", "--vendor", "1234", "--product", "ffff"])
        .assert_success()
        .assert_json_field("/found", &json!(true))
        .assert_json_field("/profile/key/product", &Value::Null);

    cli.run_robot(&["find", "--vendor", "4321"])
        .assert_success()
        .assert_json_field("/found", &json!(false));
}

#[test]
fn robot_save_then_find() {
    init_test_logging();
    let profiles = ProfileDir::new();
    let cli = CliRunner::new(profiles.path());

    let saved = cli.run_robot(&[
        "save",
        "--vendor",
        "046d",
        "--product",
        "c215",
        "--name",
        "Extreme 3D",
        "--axis",
        "ABS_X=0,1023,3,63,0,center",
        "--axis",
        "ABS_RZ=0,255,0,15,0",
    ]);
    saved
        .assert_success()
        .assert_json_field("/ok", &json!(true))
        .assert_json_field("/axes", &json!(2));
    assert_eq!(
        profiles.file_names(),
        vec!["046d-c215-0000 (Extreme 3D).conf".to_string()]
    );

    cli.run_robot(&[
        "find",
        "--vendor",
        "046d",
        "--product",
        "c215",
        "--name",
        "Extreme 3D",
    ])
    .assert_success()
    .assert_json_field("/found", &json!(true))
    .assert_json_field("/profile/axes/ABS_RZ/flat", &json!(15));
}

#[test]
fn robot_remove_deletes_file() {
    init_test_logging();
    let profiles = ProfileDir::with_files(&[("pad.conf", GAMEPAD)]);
    let cli = CliRunner::new(profiles.path());

    cli.run_robot(&["remove", "pad.conf"])
        .assert_success()
        .assert_json_field("/ok", &json!(true));
    assert!(profiles.file_names().is_empty());
}

#[test]
fn robot_error_is_json_on_stderr() {
    init_test_logging();
    let profiles = ProfileDir::new();
    let result = CliRunner::new(profiles.path()).run_robot(&["remove", "missing.conf"]);

    result.assert_exit_code(1);
    let error = result.error_json();
    assert_eq!(error.get("error"), Some(&json!(true)));
    assert_eq!(error.get("recoverable"), Some(&json!(true)));
    assert!(error
        .get("message")
        .and_then(Value::as_str)
        .is_some_and(|m| m.contains("missing.conf")));
}

#[test]
fn robot_save_without_identity_fails() {
    init_test_logging();
    let profiles = ProfileDir::new();
    let result = CliRunner::new(profiles.path()).run_robot(&[
        "save",
        "--vendor",
        "046d",
        "--pin",
        "none",
        "--axis",
        "ABS_X=0,255,0,0,0",
    ]);

    result.assert_exit_code(1);
    assert!(result.error_json().get("suggestion").is_some_and(Value::is_string));
    assert!(profiles.file_names().is_empty());
}

#[test]
fn robot_show_and_path() {
    init_test_logging();
    let profiles = ProfileDir::with_files(&[("pad.conf", GAMEPAD)]);
    let cli = CliRunner::new(profiles.path());

    cli.run_robot(&["show", "pad.conf"])
        .assert_success()
        .assert_json_field("/key/version", &json!(1))
        .assert_json_field("/axes/ABS_X/fuzz", &json!(16));

    let path = cli.run_robot(&["path"]);
    path.assert_success();
    assert_eq!(
        path.json().get("dir").and_then(Value::as_str),
        Some(profiles.path().to_str().unwrap())
    );
}

#[test]
fn robot_compact_format_is_single_line() {
    init_test_logging();
    let profiles = ProfileDir::with_files(&[("pad.conf", GAMEPAD)]);
    let result = CliRunner::new(profiles.path()).run(&["--format=json-compact", "list"]);

    result.assert_success();
    assert_eq!(result.stdout.trim().lines().count(), 1);
    assert!(result.json().is_array());
}

//! E2E tests for the watch command.

use std::time::{Duration, Instant};

use serde_json::Value;

use crate::common::cli::CliRunner;
use crate::common::fixtures::{ProfileDir, GAMEPAD};
use crate::common::init_test_logging;

fn parse_json_lines(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).unwrap_or_else(|_| panic!("Invalid JSONL line: {line}"))
        })
        .collect()
}

#[test]
fn watch_timeout_exits_and_reports_initial_load() {
    init_test_logging();
    let profiles = ProfileDir::with_files(&[("pad.conf", GAMEPAD)]);
    let cli = CliRunner::new(profiles.path());

    let start = Instant::now();
    let result = cli.run_robot(&["watch", "--timeout=1", "--interval-ms=50"]);
    let elapsed = start.elapsed();

    result.assert_success();
    assert!(
        elapsed < Duration::from_secs(10),
        "watch --timeout=1 should exit promptly (elapsed: {elapsed:?})"
    );

    let events = parse_json_lines(&result.stdout);
    let first = events.first().expect("initial reload event");
    assert_eq!(first.get("event").and_then(Value::as_str), Some("reload"));
    assert_eq!(first.pointer("/summary/loaded"), Some(&Value::from(1)));
}

#[test]
fn watch_rejects_zero_interval() {
    init_test_logging();
    let profiles = ProfileDir::new();
    CliRunner::new(profiles.path())
        .run(&["watch", "--timeout=1", "--interval-ms=0"])
        .assert_exit_code(1)
        .assert_stderr_contains("--interval-ms");
}

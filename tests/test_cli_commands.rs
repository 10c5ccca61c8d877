mod common;

use common::TezasProcess;

fn fixture(name: &str) -> String {
    TezasProcess::path_str(&TezasProcess::fixture_path(name)).to_owned()
}

// ============================================================================
// version
// ============================================================================

#[test]
fn version_human() {
    let output = TezasProcess::spawn_command(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("tezas "), "{stdout}");
    assert!(stdout.contains('.'), "{stdout}");
}

#[test]
fn version_json() {
    let output = TezasProcess::spawn_command(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("version JSON should be valid");
    assert_eq!(parsed["name"], "tezas");
    assert!(parsed.get("version").is_some());
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn validate_good_config() {
    let output = TezasProcess::spawn_command(&["validate", &fixture("site.yaml")]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("ok: "));
}

#[test]
fn validate_empty_file_uses_defaults() {
    let output = TezasProcess::spawn_command(&["validate", &fixture("empty.yaml")]);
    assert!(output.status.success());
}

#[test]
fn validate_reports_every_timing_error() {
    let output = TezasProcess::spawn_command(&["validate", &fixture("invalid_timings.yaml")]);
    assert_eq!(output.status.code(), Some(2));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FAIL"), "{stdout}");
    assert!(stdout.contains("intro.presents"), "{stdout}");
    assert!(stdout.contains("intro.wormhole"), "{stdout}");
    assert!(stdout.contains("intro.skip_available"), "{stdout}");
}

#[test]
fn validate_unknown_section_suggests() {
    let output = TezasProcess::spawn_command(&["validate", &fixture("unknown_section.yaml")]);
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("did you mean 'events'"), "{stdout}");
}

#[test]
fn validate_rejects_unbounded_completion() {
    let output = TezasProcess::spawn_command(&["validate", &fixture("unbounded_intro.yaml")]);
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("intro.complete"), "{stdout}");
}

#[test]
fn intro_with_unbounded_config_exits_cleanly() {
    let output = TezasProcess::spawn_command(&["intro", "--config", &fixture("unbounded_intro.yaml")]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn intro_skip_beyond_a_day_is_usage_error() {
    let output = TezasProcess::spawn_command(&["intro", "--skip-at", "300000000000y"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!String::from_utf8_lossy(&output.stderr).contains("panicked"));
}

#[test]
fn validate_empty_section_list_fails() {
    let output = TezasProcess::spawn_command(&["validate", &fixture("empty_sections.yaml")]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn validate_yaml_syntax_error() {
    let output = TezasProcess::spawn_command(&["validate", &fixture("bad_yaml.yaml")]);
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("parse error"), "{stdout}");
}

#[test]
fn validate_overlap_is_warning_unless_strict() {
    let path = fixture("overlapping_layout.yaml");

    let lenient = TezasProcess::spawn_command(&["validate", &path]);
    assert!(lenient.status.success());
    assert!(String::from_utf8_lossy(&lenient.stdout).contains("overlap"));

    let strict = TezasProcess::spawn_command(&["validate", "--strict", &path]);
    assert_eq!(strict.status.code(), Some(2));
}

#[test]
fn validate_json_checks_all_files() {
    let output = TezasProcess::spawn_command(&[
        "validate",
        "--format",
        "json",
        &fixture("site.yaml"),
        &fixture("empty_sections.yaml"),
    ]);
    assert_eq!(output.status.code(), Some(2));

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = parsed.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["valid"], true);
    assert_eq!(reports[1]["valid"], false);
}

#[test]
fn validate_missing_file() {
    let output = TezasProcess::spawn_command(&["validate", "/nonexistent/site.yaml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stdout).contains("file not found"));
}

// ============================================================================
// countdown
// ============================================================================

#[test]
fn countdown_at_fixed_time() {
    let output = TezasProcess::spawn_command(&[
        "countdown",
        "--config",
        &fixture("site.yaml"),
        "--now",
        "2026-02-07T21:58:30",
    ]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "01 DAYS : 02 HOURS : 01 MINS : 30 SECS"
    );
}

#[test]
fn countdown_after_target_shows_zeros() {
    let output = TezasProcess::spawn_command(&[
        "countdown",
        "--target",
        "2026-02-09T00:00:00",
        "--now",
        "2026-03-01T00:00:00",
        "--format",
        "json",
    ]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["running"], false);
    assert_eq!(parsed["days"], 0);
    assert_eq!(parsed["seconds"], 0);
}

#[test]
fn countdown_bad_target_is_config_error() {
    let output = TezasProcess::spawn_command(&["countdown", "--target", "whenever"]);
    assert_eq!(output.status.code(), Some(2));
}

// ============================================================================
// usage
// ============================================================================

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = TezasProcess::spawn_command(&["launch"]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

//! End-to-end runs of the page commands, checked through the JSONL event
//! stream on stdout.

mod common;

use common::TezasProcess;
use serde_json::Value;

fn fixture(name: &str) -> String {
    TezasProcess::path_str(&TezasProcess::fixture_path(name)).to_owned()
}

fn sequences_are_contiguous(events: &[Value]) -> bool {
    events
        .iter()
        .enumerate()
        .all(|(i, e)| e["sequence"].as_u64() == Some(i as u64))
}

#[test]
fn visit_twice_plays_intro_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    let session = TezasProcess::path_str(&session).to_owned();
    let config = fixture("site.yaml");
    let args = ["visit", "--config", &config, "--session", &session];

    let first = TezasProcess::spawn_command(&args);
    assert!(
        first.status.success(),
        "{}",
        String::from_utf8_lossy(&first.stderr)
    );
    let events = TezasProcess::events(&first);
    let types = TezasProcess::event_types(&events);
    assert_eq!(types.first().map(String::as_str), Some("PageMounted"));
    assert_eq!(events[0]["intro_already_shown"], false);
    assert_eq!(TezasProcess::of_type(&events, "PhaseEntered").len(), 3);
    let completed = TezasProcess::of_type(&events, "IntroCompleted");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["path"], "natural");
    assert_eq!(completed[0]["final_phase"], 3);
    assert!(sequences_are_contiguous(&events));

    let started = types.iter().position(|t| t == "TrackerStarted").unwrap();
    let intro_done = types.iter().position(|t| t == "IntroCompleted").unwrap();
    assert!(intro_done < started, "tracker must start after the intro: {types:?}");

    let second = TezasProcess::spawn_command(&args);
    assert!(second.status.success());
    let events = TezasProcess::events(&second);
    assert_eq!(events[0]["type"], "PageMounted");
    assert_eq!(events[0]["intro_already_shown"], true);
    assert!(TezasProcess::of_type(&events, "IntroStarted").is_empty());
    assert_eq!(TezasProcess::of_type(&events, "TrackerStarted").len(), 1);
}

#[test]
fn visit_without_session_file_always_plays_intro() {
    let config = fixture("site.yaml");
    for _ in 0..2 {
        let output = TezasProcess::spawn_command(&["visit", "--config", &config]);
        assert!(output.status.success());
        let events = TezasProcess::events(&output);
        assert_eq!(TezasProcess::of_type(&events, "IntroStarted").len(), 1);
    }
}

#[test]
fn visit_skip_completes_early() {
    let config = fixture("site.yaml");
    let output = TezasProcess::spawn_command(&["visit", "--config", &config, "--skip-at", "100ms"]);
    assert!(output.status.success());

    let events = TezasProcess::events(&output);
    let completed = TezasProcess::of_type(&events, "IntroCompleted");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["path"], "skipped");
    assert_eq!(completed[0]["final_phase"], 1);
    assert!(
        TezasProcess::of_type(&events, "PhaseEntered")
            .iter()
            .all(|e| e["phase"].as_u64() <= Some(1))
    );
}

#[test]
fn visit_replays_trace_through_tracker() {
    let config = fixture("site.yaml");
    let trace = fixture("trace.yaml");
    let output = TezasProcess::spawn_command(&[
        "visit", "--config", &config, "--trace", &trace, "--skip-at", "0ms",
    ]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let events = TezasProcess::events(&output);
    let activated: Vec<&str> = TezasProcess::of_type(&events, "SectionActivated")
        .iter()
        .filter_map(|e| e["section"].as_str())
        .collect();
    assert_eq!(activated, ["events", "timeline", "home"]);

    let stopped = TezasProcess::of_type(&events, "TrackerStopped");
    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0]["final_section"], "home");

    let types = TezasProcess::event_types(&events);
    assert_eq!(types.last().map(String::as_str), Some("TrackerStopped"));
    assert!(types.contains(&"PageUnmounted".to_owned()));
}

#[test]
fn track_reports_sections_without_intro() {
    let config = fixture("site.yaml");
    let trace = fixture("trace.yaml");
    let output = TezasProcess::spawn_command(&["track", "--config", &config, "--trace", &trace]);
    assert!(output.status.success());

    let events = TezasProcess::events(&output);
    assert!(TezasProcess::of_type(&events, "IntroStarted").is_empty());
    assert_eq!(events[0]["type"], "TrackerStarted");
    assert_eq!(events[0]["header_offset"], 80.0);
    assert_eq!(TezasProcess::of_type(&events, "SectionActivated").len(), 3);
}

#[test]
fn intro_command_skip() {
    let config = fixture("site.yaml");
    let output = TezasProcess::spawn_command(&["intro", "--config", &config, "--skip-at", "300ms"]);
    assert!(output.status.success());

    let events = TezasProcess::events(&output);
    let types = TezasProcess::event_types(&events);
    assert_eq!(types.first().map(String::as_str), Some("IntroStarted"));
    assert_eq!(types.last().map(String::as_str), Some("IntroCompleted"));
    assert_eq!(TezasProcess::of_type(&events, "SkipAvailable").len(), 1);
    assert_eq!(events.last().unwrap()["final_phase"], 2);
}

#[test]
fn events_file_keeps_stdout_clean() {
    let dir = tempfile::tempdir().unwrap();
    let events_path = dir.path().join("events.jsonl");
    let config = fixture("site.yaml");
    let output = TezasProcess::spawn_command(&[
        "intro",
        "--config",
        &config,
        "--events-file",
        TezasProcess::path_str(&events_path),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written = std::fs::read_to_string(&events_path).unwrap();
    assert!(written.lines().count() >= 5, "{written}");
}

#[test]
fn track_with_missing_trace_is_config_error() {
    let config = fixture("site.yaml");
    let output = TezasProcess::spawn_command(&[
        "track",
        "--config",
        &config,
        "--trace",
        "/nonexistent/trace.yaml",
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn visit_with_invalid_config_fails_before_mount() {
    let config = fixture("invalid_timings.yaml");
    let output = TezasProcess::spawn_command(&["visit", "--config", &config]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

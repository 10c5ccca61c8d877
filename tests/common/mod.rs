//! Shared integration-test harness for running the `tezas` binary and
//! reading its JSONL event stream.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

/// Helpers around one invocation of the `tezas` binary.
pub struct TezasProcess;

impl TezasProcess {
    /// Runs the binary with `args` to completion.
    ///
    /// Logging is silenced and colour disabled so stdout carries only
    /// command output.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_tezas"))
            .args(args)
            .arg("--quiet")
            .env_remove("TEZAS_CONFIG")
            .env_remove("TEZAS_SESSION_FILE")
            .env_remove("TEZAS_LOG_LEVEL")
            .env("TEZAS_COLOR", "never")
            .output()
            .expect("failed to spawn tezas")
    }

    /// Parses every non-empty stdout line as JSON.
    #[allow(clippy::missing_panics_doc)]
    pub fn events(output: &Output) -> Vec<Value> {
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad JSONL line {l:?}: {e}")))
            .collect()
    }

    /// Event types in emission order.
    pub fn event_types(events: &[Value]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| e.get("type").and_then(Value::as_str))
            .map(str::to_owned)
            .collect()
    }

    /// All events of one type.
    pub fn of_type<'a>(events: &'a [Value], ty: &str) -> Vec<&'a Value> {
        events
            .iter()
            .filter(|e| e.get("type").and_then(Value::as_str) == Some(ty))
            .collect()
    }

    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    pub fn path_str(path: &Path) -> &str {
        path.to_str().expect("non-UTF-8 path")
    }
}

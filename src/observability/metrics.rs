//! Metrics collection for `tezas`.
//!
//! Prometheus-compatible metrics for intro progress and section tracking.
//! Every label value comes from a closed enum, so label cardinality is
//! bounded by construction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::TezasError;
use crate::intro::{CompletionPath, IntroPhase};
use crate::scroll::SectionId;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `TezasError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), TezasError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| TezasError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "tezas_phase_transitions_total",
        "Total number of intro phase transitions"
    );
    describe_counter!(
        "tezas_intro_completions_total",
        "Intro completions by path (natural or skipped)"
    );
    describe_histogram!(
        "tezas_intro_duration_ms",
        "Time from intro start to completion in milliseconds"
    );
    describe_counter!(
        "tezas_intro_bypassed_total",
        "Page mounts that skipped the intro because the session flag was set"
    );
    describe_counter!(
        "tezas_section_activations_total",
        "Number of times each section became active"
    );
    describe_gauge!("tezas_active_section", "Currently active section (1 = active)");
    describe_gauge!(
        "tezas_scroll_listeners",
        "Number of live scroll tracker subscriptions"
    );
}

/// Records an intro phase transition.
pub fn record_phase_transition(from: IntroPhase, to: IntroPhase) {
    counter!(
        "tezas_phase_transitions_total",
        "from" => from.name(),
        "to" => to.name()
    )
    .increment(1);
}

/// Records intro completion and how long it took.
pub fn record_intro_completion(path: CompletionPath, elapsed: Duration) {
    counter!("tezas_intro_completions_total", "path" => path.as_str()).increment(1);
    histogram!("tezas_intro_duration_ms", "path" => path.as_str())
        .record(elapsed.as_secs_f64() * 1000.0);
}

/// Records a mount that bypassed the intro.
pub fn record_intro_bypassed() {
    counter!("tezas_intro_bypassed_total").increment(1);
}

/// Records a section activation and moves the active-section gauge.
///
/// Zeros out the previous section label before setting the new one,
/// preventing stale labels from showing `1.0`.
pub fn record_section_activation(section: SectionId, previous: Option<SectionId>) {
    counter!("tezas_section_activations_total", "section" => section.as_str()).increment(1);
    if let Some(prev) = previous {
        gauge!("tezas_active_section", "section" => prev.as_str()).set(0.0);
    }
    gauge!("tezas_active_section", "section" => section.as_str()).set(1.0);
}

/// Adjusts the live scroll listener gauge by `delta`.
pub fn adjust_scroll_listeners(delta: f64) {
    gauge!("tezas_scroll_listeners").increment(delta);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros silently no-op when no global recorder is installed
        record_phase_transition(IntroPhase::Stars, IntroPhase::Department);
        record_intro_completion(CompletionPath::Skipped, Duration::from_millis(2500));
        record_intro_bypassed();
        record_section_activation(SectionId::Events, Some(SectionId::Home));
        record_section_activation(SectionId::Home, None);
        adjust_scroll_listeners(1.0);
        adjust_scroll_listeners(-1.0);
    }
}

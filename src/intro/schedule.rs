//! Intro timeline: one ordered list of `(offset, action)` pairs driven by a
//! single task and cancelled by a single token.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::phase::IntroPhase;

/// Offsets, measured from intro start, at which each step fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroTimings {
    /// Phase 0 → 1.
    pub department: Duration,
    /// Skip affordance appears.
    pub skip_available: Duration,
    /// Phase 1 → 2.
    pub presents: Duration,
    /// Phase 2 → 3.
    pub wormhole: Duration,
    /// Completion callback fires.
    pub complete: Duration,
}

impl Default for IntroTimings {
    fn default() -> Self {
        Self {
            department: Duration::from_millis(1000),
            skip_available: Duration::from_millis(2000),
            presents: Duration::from_millis(3000),
            wormhole: Duration::from_millis(4000),
            complete: Duration::from_millis(6000),
        }
    }
}

/// What happens when a schedule entry comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Advance to the given phase.
    Enter(IntroPhase),
    /// Show the skip affordance.
    ShowSkip,
    /// Fire the completion callback.
    Complete,
}

/// A single timed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Offset from the schedule's start instant.
    pub offset: Duration,
    /// Action to run at that offset.
    pub action: ScheduledAction,
}

/// Ordered list of timed actions.
///
/// Entries are kept sorted by offset; entries sharing an offset keep their
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Builds a schedule from arbitrary entries.
    #[must_use]
    pub fn new(mut entries: Vec<ScheduleEntry>) -> Self {
        // stable: ties keep declaration order
        entries.sort_by_key(|e| e.offset);
        Self { entries }
    }

    /// The intro's schedule for the given timings.
    #[must_use]
    pub fn intro(timings: &IntroTimings) -> Self {
        Self::new(vec![
            ScheduleEntry {
                offset: timings.department,
                action: ScheduledAction::Enter(IntroPhase::Department),
            },
            ScheduleEntry {
                offset: timings.skip_available,
                action: ScheduledAction::ShowSkip,
            },
            ScheduleEntry {
                offset: timings.presents,
                action: ScheduledAction::Enter(IntroPhase::Presents),
            },
            ScheduleEntry {
                offset: timings.wormhole,
                action: ScheduledAction::Enter(IntroPhase::Wormhole),
            },
            ScheduleEntry {
                offset: timings.complete,
                action: ScheduledAction::Complete,
            },
        ])
    }

    #[must_use]
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the schedule on a background task.
    ///
    /// Each entry fires at `started_at + offset`, in order. The task exits
    /// when every entry has fired, when `on_fire` returns `Break`, or as soon
    /// as `cancel` is cancelled; cancellation always wins over a timer that
    /// comes due at the same instant.
    pub fn spawn<F>(self, started_at: Instant, cancel: CancellationToken, mut on_fire: F) -> JoinHandle<()>
    where
        F: FnMut(ScheduledAction) -> ControlFlow<()> + Send + 'static,
    {
        tokio::spawn(async move {
            for entry in self.entries {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("schedule cancelled");
                        return;
                    }
                    () = sleep_until_offset(started_at, entry.offset) => {}
                }

                trace!(offset_ms = entry.offset.as_millis(), action = ?entry.action, "schedule entry due");
                if on_fire(entry.action).is_break() {
                    return;
                }
            }
        })
    }
}

/// Sleeps until `offset` after `start`. An offset past the end of the
/// clock's range never elapses.
pub async fn sleep_until_offset(start: Instant, offset: Duration) {
    match start.checked_add(offset) {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

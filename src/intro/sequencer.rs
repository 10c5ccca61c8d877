//! The intro sequencer: a one-shot timed phase progression that ends in a
//! completion callback.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};

use super::phase::{CompletionPath, IntroPhase, IntroStatus};
use super::schedule::{IntroTimings, Schedule, ScheduledAction};

/// Completion callback. Invoked at most once.
pub type OnComplete = Box<dyn FnOnce() + Send + 'static>;

/// Runs the intro timeline and guarantees a single completion.
///
/// The sequencer owns one background task driving an ordered
/// [`Schedule`]. Completion fires through exactly one of two paths:
/// the completion timer, or [`skip`](Self::skip). Whichever path wins
/// cancels the schedule, so no phase transition can follow it.
///
/// Dropping the sequencer tears it down: pending timers are cancelled and
/// the callback is discarded without being called.
#[derive(Debug)]
pub struct IntroSequencer {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

/// Cloneable control handle for a running [`IntroSequencer`].
///
/// Lets a skip button (or any other caller) complete the intro without
/// owning the sequencer. A handle does not keep the timers alive.
#[derive(Debug, Clone)]
pub struct IntroHandle {
    shared: Arc<Shared>,
}

struct Shared {
    status: watch::Sender<IntroStatus>,
    control: Mutex<Control>,
    cancel: CancellationToken,
    started_at: Instant,
    emitter: Arc<EventEmitter>,
}

struct Control {
    on_complete: Option<OnComplete>,
    torn_down: bool,
}

impl Control {
    /// Live means neither completed nor torn down.
    const fn is_live(&self) -> bool {
        !self.torn_down && self.on_complete.is_some()
    }
}

impl std::fmt::Debug for Shared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shared")
            .field("status", &*self.status.borrow())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl IntroSequencer {
    /// Starts the intro with no event stream attached.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(timings: &IntroTimings, on_complete: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::start_with_events(timings, Arc::new(EventEmitter::noop()), on_complete)
    }

    /// Starts the intro, reporting progress to `emitter`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_with_events<F>(
        timings: &IntroTimings,
        emitter: Arc<EventEmitter>,
        on_complete: F,
    ) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let started_at = Instant::now();
        let (status, _) = watch::channel(IntroStatus::INITIAL);
        let shared = Arc::new(Shared {
            status,
            control: Mutex::new(Control {
                on_complete: Some(Box::new(on_complete)),
                torn_down: false,
            }),
            cancel: CancellationToken::new(),
            started_at,
            emitter,
        });

        info!(complete_ms = timings.complete.as_millis(), "intro started");
        shared.emitter.emit(Event::IntroStarted {
            timestamp: Utc::now(),
        });

        let driver = Arc::clone(&shared);
        let task = Schedule::intro(timings).spawn(started_at, shared.cancel.clone(), move |action| {
            driver.apply(action)
        });

        Self {
            shared,
            task: Some(task),
        }
    }

    /// Returns a cloneable control handle.
    #[must_use]
    pub fn handle(&self) -> IntroHandle {
        IntroHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Completes the intro immediately.
    ///
    /// Works at any time before completion, even before the skip
    /// affordance is shown. Returns `true` if this call fired the
    /// completion callback; `false` if the intro had already completed or
    /// was torn down.
    pub fn skip(&self) -> bool {
        self.shared.complete(CompletionPath::Skipped)
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> IntroStatus {
        *self.shared.status.borrow()
    }

    /// Returns the current (or final) phase.
    #[must_use]
    pub fn phase(&self) -> IntroPhase {
        self.status().phase()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status().is_completed()
    }

    /// Subscribes to status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<IntroStatus> {
        self.shared.status.subscribe()
    }

    /// Returns `true` while any scheduled step may still fire.
    #[must_use]
    pub fn has_pending_timers(&self) -> bool {
        !self.shared.cancel.is_cancelled()
            && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancels all pending timers and discards the completion callback.
    ///
    /// Idempotent. Has no effect on the status of an already completed
    /// intro.
    pub fn teardown(&mut self) {
        self.shared.teardown();
        self.task.take();
    }
}

impl Drop for IntroSequencer {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl IntroHandle {
    /// See [`IntroSequencer::skip`].
    pub fn skip(&self) -> bool {
        self.shared.complete(CompletionPath::Skipped)
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> IntroStatus {
        *self.shared.status.borrow()
    }

    /// Subscribes to status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<IntroStatus> {
        self.shared.status.subscribe()
    }
}

impl Shared {
    fn apply(&self, action: ScheduledAction) -> ControlFlow<()> {
        match action {
            ScheduledAction::Enter(phase) => self.enter(phase),
            ScheduledAction::ShowSkip => self.show_skip(),
            ScheduledAction::Complete => {
                self.complete(CompletionPath::Natural);
                ControlFlow::Break(())
            }
        }
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn enter(&self, phase: IntroPhase) -> ControlFlow<()> {
        let control = self.control.lock().expect("intro control lock poisoned");
        if !control.is_live() {
            return ControlFlow::Break(());
        }

        let mut from = None;
        self.status.send_if_modified(|status| match status {
            IntroStatus::Running { phase: current, .. } if phase > *current => {
                from = Some(*current);
                *current = phase;
                true
            }
            _ => false,
        });

        if let Some(from) = from {
            let elapsed_ms = self.elapsed_ms();
            info!(from = from.index(), to = phase.index(), elapsed_ms, "intro phase transition");
            metrics::record_phase_transition(from, phase);
            self.emitter.emit(Event::PhaseEntered {
                timestamp: Utc::now(),
                phase: phase.index(),
                phase_name: phase.name().to_owned(),
                elapsed_ms,
            });
        } else {
            debug!(to = phase.index(), "ignoring non-forward phase transition");
        }
        drop(control);
        ControlFlow::Continue(())
    }

    fn show_skip(&self) -> ControlFlow<()> {
        let control = self.control.lock().expect("intro control lock poisoned");
        if !control.is_live() {
            return ControlFlow::Break(());
        }

        let shown = self.status.send_if_modified(|status| match status {
            IntroStatus::Running { skip_available, .. } if !*skip_available => {
                *skip_available = true;
                true
            }
            _ => false,
        });
        if shown {
            debug!("skip affordance available");
            self.emitter.emit(Event::SkipAvailable {
                timestamp: Utc::now(),
                elapsed_ms: self.elapsed_ms(),
            });
        }
        drop(control);
        ControlFlow::Continue(())
    }

    /// Fires the completion callback if nothing has fired it yet.
    fn complete(&self, path: CompletionPath) -> bool {
        let mut control = self.control.lock().expect("intro control lock poisoned");
        if control.torn_down {
            debug!(path = path.as_str(), "completion ignored after teardown");
            return false;
        }
        let Some(on_complete) = control.on_complete.take() else {
            debug!(path = path.as_str(), "completion already fired");
            return false;
        };

        let mut final_phase = IntroPhase::Stars;
        self.status.send_modify(|status| {
            final_phase = status.phase();
            *status = IntroStatus::Completed {
                phase: final_phase,
                path,
            };
        });
        self.cancel.cancel();

        let elapsed = self.started_at.elapsed();
        info!(
            path = path.as_str(),
            final_phase = final_phase.index(),
            elapsed_ms = elapsed.as_millis(),
            "intro completed"
        );
        metrics::record_intro_completion(path, elapsed);
        self.emitter.emit(Event::IntroCompleted {
            timestamp: Utc::now(),
            path: path.as_str().to_owned(),
            final_phase: final_phase.index(),
            elapsed_ms: self.elapsed_ms(),
        });
        drop(control);

        // Outside the lock: the callback may call back into the handle.
        on_complete();
        true
    }

    fn teardown(&self) {
        let mut control = self.control.lock().expect("intro control lock poisoned");
        let discarded = control.on_complete.take();
        control.torn_down = true;
        drop(control);

        self.cancel.cancel();
        if discarded.is_some() {
            debug!(elapsed_ms = self.elapsed_ms(), "intro torn down before completion");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let calls = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&calls);
        (calls, move || {
            sink.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_status() {
        let (_calls, cb) = counter();
        let seq = IntroSequencer::start(&IntroTimings::default(), cb);
        assert_eq!(seq.status(), IntroStatus::INITIAL);
        assert!(seq.has_pending_timers());
    }

    #[tokio::test(start_paused = true)]
    async fn test_natural_completion_fires_once() {
        let (calls, cb) = counter();
        let seq = IntroSequencer::start(&IntroTimings::default(), cb);

        tokio::time::sleep(Duration::from_millis(6001)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            seq.status(),
            IntroStatus::Completed {
                phase: IntroPhase::Wormhole,
                path: CompletionPath::Natural,
            }
        );

        assert!(!seq.skip(), "skip after completion must be a no-op");
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_wins_and_freezes_phase() {
        let (calls, cb) = counter();
        let seq = IntroSequencer::start(&IntroTimings::default(), cb);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(seq.phase(), IntroPhase::Department);
        assert!(seq.skip());
        assert!(!seq.skip());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!seq.has_pending_timers());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            seq.status(),
            IntroStatus::Completed {
                phase: IntroPhase::Department,
                path: CompletionPath::Skipped,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_flag_appears_at_two_seconds() {
        let (_calls, cb) = counter();
        let seq = IntroSequencer::start(&IntroTimings::default(), cb);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(!seq.status().layers().skip_button);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(seq.status().layers().skip_button);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_discards_callback() {
        let (calls, cb) = counter();
        let mut seq = IntroSequencer::start(&IntroTimings::default(), cb);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        seq.teardown();
        seq.teardown();
        assert!(!seq.has_pending_timers());
        assert!(!seq.skip());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(seq.phase(), IntroPhase::Department);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timers() {
        let (calls, cb) = counter();
        let seq = IntroSequencer::start(&IntroTimings::default(), cb);
        let handle = seq.handle();
        drop(seq);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(handle.status(), IntroStatus::INITIAL);
        assert!(!handle.skip());
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_may_reenter_handle() {
        let slot: Arc<Mutex<Option<IntroHandle>>> = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&slot);
        let seq = IntroSequencer::start(&IntroTimings::default(), move || {
            let handle = inner.lock().unwrap().clone().unwrap();
            assert!(handle.status().is_completed());
            assert!(!handle.skip());
        });
        *slot.lock().unwrap() = Some(seq.handle());

        assert!(seq.handle().skip());
    }
}

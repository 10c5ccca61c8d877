//! Scroll event delivery and the tracker's listener lifecycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};

use super::layout::LayoutSource;
use super::section::SectionId;
use super::tracker::ScrollSectionTracker;

/// One animation frame at 60 Hz. Scroll ticks are coalesced to at most one
/// recomputation per frame.
pub const FRAME: Duration = Duration::from_millis(16);

/// Source of scroll events: the page's current vertical offset.
///
/// Rapid updates between two frames collapse to the latest value. Clones
/// share the same feed; only subscribers count as listeners.
#[derive(Debug, Clone)]
pub struct ScrollFeed {
    offset: Arc<watch::Sender<f64>>,
}

impl ScrollFeed {
    /// Creates a feed positioned at the top of the page.
    #[must_use]
    pub fn new() -> Self {
        Self::at(0.0)
    }

    /// Creates a feed at a given offset (e.g. restored scroll position).
    #[must_use]
    pub fn at(offset: f64) -> Self {
        let (offset, _) = watch::channel(offset);
        Self {
            offset: Arc::new(offset),
        }
    }

    /// Publishes a scroll event.
    pub fn scroll_to(&self, offset: f64) {
        self.offset.send_replace(offset);
    }

    /// Current offset.
    #[must_use]
    pub fn offset(&self) -> f64 {
        *self.offset.borrow()
    }

    /// Registers a listener.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.offset.subscribe()
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.offset.receiver_count()
    }
}

impl Default for ScrollFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// A mounted scroll tracker.
///
/// Owns the listener task. The listener is released when the subscription
/// is stopped or dropped, on every exit path including unwinding.
#[derive(Debug)]
pub struct ScrollSubscription {
    active: watch::Receiver<SectionId>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ScrollSubscription {
    /// Mounts `tracker` on `feed`, reading geometry from `layout`.
    ///
    /// The active section is recomputed once immediately for the feed's
    /// current offset, then on each scroll event, at most once per
    /// [`FRAME`]. Must be called from within a tokio runtime.
    pub fn start(
        tracker: ScrollSectionTracker,
        layout: Arc<dyn LayoutSource>,
        feed: &ScrollFeed,
        emitter: Arc<EventEmitter>,
    ) -> Self {
        let offsets = feed.subscribe();
        let (active_tx, active) = watch::channel(tracker.active());
        let cancel = CancellationToken::new();

        info!(
            sections = ?tracker.sections(),
            header_offset = tracker.header_offset(),
            "scroll tracker started"
        );
        emitter.emit(Event::TrackerStarted {
            timestamp: Utc::now(),
            sections: tracker
                .sections()
                .iter()
                .map(|s| s.as_str().to_owned())
                .collect(),
            header_offset: tracker.header_offset(),
        });
        metrics::adjust_scroll_listeners(1.0);

        let missing = tracker.missing(layout.as_ref());
        if !missing.is_empty() {
            debug!(?missing, "tracked sections missing from layout");
        }

        let offsets = WatchStream::new(offsets).throttle(FRAME);
        let task = tokio::spawn(listen(
            tracker,
            layout,
            offsets,
            active_tx,
            cancel.clone(),
            emitter,
        ));

        Self {
            active,
            cancel,
            task: Some(task),
        }
    }

    /// Currently active section.
    #[must_use]
    pub fn active(&self) -> SectionId {
        *self.active.borrow()
    }

    /// Read-only view of the active section for navigation consumers.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SectionId> {
        self.active.clone()
    }

    /// Returns `true` until the listener has been released.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Releases the scroll listener. Idempotent.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            // The listener may be parked between frames; abort drops its
            // receiver now instead of at the next wake-up.
            task.abort();
        }
    }

    /// Releases the listener and waits for the task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ScrollSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Decrements the listener gauge and reports the final section however the
/// listener task ends, including abort.
struct ListenerGuard {
    active: watch::Sender<SectionId>,
    emitter: Arc<EventEmitter>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let final_section = *self.active.borrow();
        debug!(final_section = %final_section, "scroll tracker stopped");
        metrics::adjust_scroll_listeners(-1.0);
        self.emitter.emit(Event::TrackerStopped {
            timestamp: Utc::now(),
            final_section: final_section.as_str().to_owned(),
        });
    }
}

async fn listen<S>(
    mut tracker: ScrollSectionTracker,
    layout: Arc<dyn LayoutSource>,
    offsets: S,
    active: watch::Sender<SectionId>,
    cancel: CancellationToken,
    emitter: Arc<EventEmitter>,
) where
    S: tokio_stream::Stream<Item = f64>,
{
    let guard = ListenerGuard {
        active,
        emitter: Arc::clone(&emitter),
    };
    tokio::pin!(offsets);

    loop {
        let offset = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            next = offsets.next() => match next {
                Some(offset) => offset,
                // feed dropped: nothing more to observe
                None => break,
            },
        };

        let previous = tracker.active();
        if let Some(section) = tracker.observe(layout.as_ref(), offset) {
            debug!(from = %previous, to = %section, offset, "active section changed");
            metrics::record_section_activation(section, Some(previous));
            emitter.emit(Event::SectionActivated {
                timestamp: Utc::now(),
                section: section.as_str().to_owned(),
                previous: previous.as_str().to_owned(),
                scroll_offset: offset,
            });
            guard.active.send_replace(section);
        }
    }

    drop(guard);
}

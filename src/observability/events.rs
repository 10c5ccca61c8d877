//! Structured event stream for `tezas`.
//!
//! Discrete, typed events emitted as the intro plays and the scroll
//! tracker moves between sections. Events are serialized as
//! newline-delimited JSON (JSONL) with a monotonically increasing
//! sequence number for ordering guarantees.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a page visit.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The host page mounted.
    PageMounted {
        /// When the page mounted.
        timestamp: DateTime<Utc>,
        /// Identifier of this visit.
        visit_id: Uuid,
        /// Whether the session flag was already set.
        intro_already_shown: bool,
    },

    /// The host page unmounted.
    PageUnmounted {
        /// When the page unmounted.
        timestamp: DateTime<Utc>,
        /// Identifier of this visit.
        visit_id: Uuid,
    },

    /// The intro sequence started at phase 0.
    IntroStarted {
        /// When the intro started.
        timestamp: DateTime<Utc>,
    },

    /// The intro advanced to a new phase.
    PhaseEntered {
        /// When the transition occurred.
        timestamp: DateTime<Utc>,
        /// Phase index (1..=3).
        phase: u8,
        /// Phase name.
        phase_name: String,
        /// Milliseconds since the intro started.
        elapsed_ms: u64,
    },

    /// The skip affordance became available.
    SkipAvailable {
        /// When the affordance appeared.
        timestamp: DateTime<Utc>,
        /// Milliseconds since the intro started.
        elapsed_ms: u64,
    },

    /// The intro finished and handed control to the main view.
    IntroCompleted {
        /// When completion fired.
        timestamp: DateTime<Utc>,
        /// `"natural"` or `"skipped"`.
        path: String,
        /// Last phase reached before completion.
        final_phase: u8,
        /// Milliseconds since the intro started.
        elapsed_ms: u64,
    },

    /// The scroll tracker began observing.
    TrackerStarted {
        /// When observation began.
        timestamp: DateTime<Utc>,
        /// Tracked sections in priority order.
        sections: Vec<String>,
        /// Header offset added to the scroll position.
        header_offset: f64,
    },

    /// A different section became active.
    SectionActivated {
        /// When the section became active.
        timestamp: DateTime<Utc>,
        /// Newly active section.
        section: String,
        /// Previously active section.
        previous: String,
        /// Scroll offset that produced the change.
        scroll_offset: f64,
    },

    /// The scroll tracker released its listener.
    TrackerStopped {
        /// When observation stopped.
        timestamp: DateTime<Utc>,
        /// Section active at the time of stopping.
        final_section: String,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps an [`Event`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// The wrapped event (flattened into the same JSON object).
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) atomically increments the sequence
/// counter, serializes the event as a single JSON line, and flushes the
/// underlying writer. Serialization or I/O failures are silently dropped
/// so that a broken event sink never interrupts the page.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug.
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or opened.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::noop()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

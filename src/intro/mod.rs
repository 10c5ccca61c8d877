//! Timed intro sequence
//!
//! A one-shot animation shown once per session. Phases advance on a fixed
//! timeline and the sequence ends with a single completion callback that
//! hands control to the main page.
//!
//! # Architecture
//!
//! - [`IntroPhase`] / [`IntroStatus`]: the finite state, observable via `watch`
//! - [`Schedule`]: ordered `(offset, action)` list run by one cancellable task
//! - [`IntroSequencer`]: owns the task and enforces exactly-once completion
//! - [`IntroLayers`]: which overlays a renderer should draw for a status

pub mod phase;
pub mod schedule;
pub mod sequencer;

pub use phase::{CompletionPath, IntroLayers, IntroPhase, IntroStatus};
pub use schedule::{IntroTimings, Schedule, ScheduleEntry, ScheduledAction, sleep_until_offset};
pub use sequencer::{IntroHandle, IntroSequencer, OnComplete};

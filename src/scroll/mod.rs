//! Scroll-synchronized section tracking
//!
//! Maps the page's vertical scroll offset to the single active section that
//! the navigation bar highlights.
//!
//! # Architecture
//!
//! - [`SectionId`] / [`SectionSpan`]: identifiers and half-open vertical spans
//! - [`LayoutSource`]: live geometry, re-read on every tick
//! - [`ScrollSectionTracker`]: pure probe-and-scan state machine
//! - [`ScrollFeed`] / [`ScrollSubscription`]: frame-throttled listener with
//!   RAII teardown
//! - [`NavigationState`]: nav bar state built on top of the tracker

pub mod layout;
pub mod nav;
pub mod observer;
pub mod section;
pub mod tracker;

pub use layout::{LayoutSource, PageLayout};
pub use nav::NavigationState;
pub use observer::{FRAME, ScrollFeed, ScrollSubscription};
pub use section::{ParseSectionError, SectionId, SectionSpan};
pub use tracker::{HEADER_OFFSET, ScrollSectionTracker};

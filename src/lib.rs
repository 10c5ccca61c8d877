//! `tezas` - view-state core for the TEZAS 2K26 symposium site
//!
//! Two cooperating state machines drive the page: a timed, skippable
//! intro shown once per session, and a scroll tracker that decides which
//! named section the navigation bar highlights. [`page::HostPage`] wires
//! them together behind an injected session store.

pub mod cli;
pub mod config;
pub mod countdown;
pub mod error;
pub mod intro;
pub mod observability;
pub mod page;
pub mod scroll;
pub mod session;

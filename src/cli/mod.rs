//! Command-line interface
//!
//! Argument definitions and command handlers for the `tezas` binary.

pub mod args;
pub mod commands;

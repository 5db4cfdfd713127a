//! `projection-viz` library crate.
//!
//! The binary (`pv`) is a thin wrapper around this library so that:
//!
//! - the alignment engine is testable without spawning processes
//! - the CLI and the TUI share one load -> compute pipeline

pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;

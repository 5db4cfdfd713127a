//! Terminal reporting: run summary and the visible-row table.

pub mod format;

pub use format::*;

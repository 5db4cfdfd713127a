//! Input/output helpers.
//!
//! - JSON payload ingest + schema checks (`ingest`)
//! - merged table CSV export (`export`)
//! - view JSON read/write (`view`)

pub mod export;
pub mod ingest;
pub mod view;

pub use export::*;
pub use ingest::*;
pub use view::*;

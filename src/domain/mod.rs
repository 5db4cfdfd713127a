//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - selection enums (`Timeframe`, `ShowMode`, `Metric`, `Source`)
//! - raw uploaded records (`HistoricalRecord`, `ProjectionRecord`)
//! - parsed period labels (`PeriodLabel`)
//! - engine shapes (`SourceSeries`, `MergedRow`, `MergedTable`, `DisplayRange`)

pub mod period;
pub mod types;

pub use period::PeriodLabel;
pub use types::*;

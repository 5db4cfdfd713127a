//! Time-series alignment and aggregation engine.
//!
//! Data flows one way:
//!
//! raw records -> `aggregate` / `normalize` -> `align` -> `derive` -> `range` / `duplicates`
//!
//! `compute_view` runs the whole chain. It is pure: selections come in as
//! arguments, nothing is cached, and a new selection means a new call.

pub mod aggregate;
pub mod align;
pub mod derive;
pub mod duplicates;
pub mod normalize;
pub mod range;

pub use aggregate::aggregate_historical;
pub use align::{align, filter_visible};
pub use derive::{apply_bands, band};
pub use duplicates::identical_metrics;
pub use normalize::{baseline_series, goal_series, infer_frequency, normalize_projection};
pub use range::display_range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    DisplayRange, Frequency, HistoricalRecord, MergedTable, Metric, ProjectionSet, RecordIssue, Selection, Source,
    SourceSeries, Timeframe,
};

/// A normalized series plus the records rejected while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub series: SourceSeries,
    pub issues: Vec<RecordIssue>,
}

impl Normalized {
    pub fn empty(frequency: Frequency) -> Self {
        Self {
            series: SourceSeries::empty(frequency),
            issues: Vec::new(),
        }
    }
}

/// Already-parsed inputs for one computation.
#[derive(Debug, Clone, Copy)]
pub struct EngineInputs<'a> {
    pub historical: &'a [HistoricalRecord],
    pub projections: &'a ProjectionSet,
    pub timeframe: Timeframe,
}

/// Row counts per source, for summary display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceCounts {
    pub historical: usize,
    pub baseline: usize,
    pub goal: usize,
}

/// Everything the rendering side needs for one view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewResult {
    pub timeframe: Timeframe,
    pub frequency: Frequency,
    /// Every label from every source, with bands filled in.
    pub aligned: MergedTable,
    /// `aligned` restricted to rows with a visible value.
    pub visible: MergedTable,
    pub range: DisplayRange,
    pub identical: Vec<Metric>,
    pub counts: SourceCounts,
    pub issues: Vec<RecordIssue>,
}

/// Compute the aligned table, display range, and duplicate flags for a view.
pub fn compute_view(inputs: &EngineInputs<'_>, selection: &Selection) -> ViewResult {
    let timeframe = inputs.timeframe;
    let frequency = timeframe.frequency();

    let historical = aggregate_historical(inputs.historical, frequency);
    let baseline = baseline_series(inputs.projections, timeframe);
    let goal = goal_series(inputs.projections, timeframe);

    let counts = SourceCounts {
        historical: historical.series.len(),
        baseline: baseline.series.len(),
        goal: goal.series.len(),
    };

    let mut aligned = align(
        &[
            (Source::Historical, &historical.series),
            (Source::Baseline, &baseline.series),
            (Source::Goal, &goal.series),
        ],
        frequency,
    );
    apply_bands(&mut aligned);

    let visible = filter_visible(&aligned, selection);
    let range = display_range(&visible, selection);
    let identical = identical_metrics(&aligned, selection, timeframe);

    let issues: Vec<RecordIssue> = [historical.issues, baseline.issues, goal.issues]
        .into_iter()
        .flatten()
        .collect();

    debug!(
        timeframe = timeframe.key(),
        rows = aligned.len(),
        visible = visible.len(),
        ?range,
        identical = identical.len(),
        issues = issues.len(),
        "computed view"
    );

    ViewResult {
        timeframe,
        frequency,
        aligned,
        visible,
        range,
        identical,
        counts,
        issues,
    }
}

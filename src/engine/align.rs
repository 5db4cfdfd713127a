//! Outer join of normalized series on period label.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{Frequency, MergedRow, MergedTable, PeriodLabel, Selection, Source, SourceSeries};

/// Join `inputs` into one row per distinct label, sorted ascending.
///
/// A source contributes a value slot only to rows whose label it contains.
/// Series of a frequency other than `frequency` cannot share labels with the
/// view and are left out.
pub fn align(inputs: &[(Source, &SourceSeries)], frequency: Frequency) -> MergedTable {
    let mut rows: BTreeMap<PeriodLabel, MergedRow> = BTreeMap::new();

    for &(source, series) in inputs {
        if series.frequency != frequency && !series.is_empty() {
            warn!(
                ?source,
                series_frequency = ?series.frequency,
                view_frequency = ?frequency,
                "series frequency does not match the view; not aligned"
            );
            continue;
        }
        for point in &series.points {
            let row = rows
                .entry(point.label)
                .or_insert_with(|| MergedRow::new(point.label));
            *row.source_mut(source) = Some(point.values);
        }
    }

    let rows: Vec<MergedRow> = rows.into_values().collect();
    debug!(?frequency, sources = inputs.len(), rows = rows.len(), "aligned series");

    MergedTable { frequency, rows }
}

/// Keep rows holding at least one value among the visible fields.
///
/// This is the caller-side selection filter; `align` never drops metrics.
pub fn filter_visible(table: &MergedTable, selection: &Selection) -> MergedTable {
    let rows = table
        .rows
        .iter()
        .filter(|row| selection.fields().any(|(m, s)| row.value(m, s).is_some()))
        .cloned()
        .collect();
    MergedTable {
        frequency: table.frequency,
        rows,
    }
}

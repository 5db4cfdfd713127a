//! Display range for the visible fields.
//!
//! Rules, in order:
//!
//! 1. no finite visible value, or all visible values equal -> `Auto`
//! 2. `span = max(1, max - min)`; nearly flat data (`span / |max| < 5%`) -> `Auto`
//! 3. pad 8% of span on both sides, clamp the lower bound at zero
//! 4. a padded range still narrower than 10% of its upper bound -> `Auto`

use crate::domain::{DisplayRange, MergedTable, Selection};

const FLAT_RATIO: f64 = 0.05;
const PAD_RATIO: f64 = 0.08;
const MIN_RELATIVE_SPAN: f64 = 0.10;

/// Compute the display range over the visible `(metric, source)` fields.
pub fn display_range(table: &MergedTable, selection: &Selection) -> DisplayRange {
    let Some((min, max)) = visible_extent(table, selection) else {
        return DisplayRange::Auto;
    };
    range_from_extent(min, max)
}

pub fn range_from_extent(min: f64, max: f64) -> DisplayRange {
    if min == max {
        return DisplayRange::Auto;
    }

    let span = (max - min).max(1.0);
    if span / max.abs() < FLAT_RATIO {
        return DisplayRange::Auto;
    }

    let pad = span * PAD_RATIO;
    let lower = (min - pad).max(0.0);
    let upper = max + pad;
    if upper <= lower || upper - lower < MIN_RELATIVE_SPAN * upper {
        return DisplayRange::Auto;
    }

    DisplayRange::Bounds { lower, upper }
}

/// Min/max over visible fields, ignoring absent and non-finite values.
pub fn visible_extent(table: &MergedTable, selection: &Selection) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for row in &table.rows {
        for (metric, source) in selection.fields() {
            if let Some(v) = row.value(metric, source).filter(|v| v.is_finite()) {
                min = min.min(v);
                max = max.max(v);
            }
        }
    }
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

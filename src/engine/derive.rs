//! Baseline vs goal comparison fields.

use crate::domain::{Band, MergedTable, Metric, Source};

/// Band between a baseline and a goal value.
///
/// `None` unless both values are present and finite.
pub fn band(baseline: Option<f64>, goal: Option<f64>) -> Option<Band> {
    let (b, g) = (baseline?, goal?);
    if !(b.is_finite() && g.is_finite()) {
        return None;
    }
    Some(Band {
        min: b.min(g),
        span: (g - b).abs(),
        delta: g - b,
    })
}

/// Fill `bands` on every row. Existing bands are overwritten.
pub fn apply_bands(table: &mut MergedTable) {
    for row in &mut table.rows {
        for metric in Metric::ALL {
            row.bands[metric.index()] = band(
                row.value(metric, Source::Baseline),
                row.value(metric, Source::Goal),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, MergedRow, MetricValues, PeriodLabel};

    #[test]
    fn band_from_two_values() {
        let b = band(Some(140_000.0), Some(150_000.0)).unwrap();
        assert_eq!(b.min, 140_000.0);
        assert_eq!(b.span, 10_000.0);
        assert_eq!(b.delta, 10_000.0);

        let b = band(Some(5.0), Some(2.0)).unwrap();
        assert_eq!((b.min, b.span, b.delta), (2.0, 3.0, -3.0));
    }

    #[test]
    fn band_requires_both_finite() {
        assert_eq!(band(None, Some(1.0)), None);
        assert_eq!(band(Some(1.0), None), None);
        assert_eq!(band(Some(f64::NAN), Some(1.0)), None);
        assert_eq!(band(Some(1.0), Some(f64::INFINITY)), None);
    }

    #[test]
    fn apply_bands_per_metric() {
        let mut baseline = MetricValues::default();
        baseline.set(Metric::Revenue, Some(10.0));
        baseline.set(Metric::Expenses, Some(4.0));
        let mut goal = MetricValues::default();
        goal.set(Metric::Revenue, Some(12.0));

        let mut row = MergedRow::new(PeriodLabel::Month { year: 2024, month: 1 });
        row.baseline = Some(baseline);
        row.goal = Some(goal);
        let mut table = MergedTable {
            frequency: Frequency::Monthly,
            rows: vec![row],
        };

        apply_bands(&mut table);
        let row = &table.rows[0];
        assert_eq!(row.band(Metric::Revenue).map(|b| b.delta), Some(2.0));
        assert_eq!(row.band(Metric::Expenses), None);
        assert_eq!(row.band(Metric::NetProfit), None);
    }
}

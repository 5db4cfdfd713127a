//! Detect metrics whose baseline and goal series are indistinguishable.

use crate::domain::{MergedTable, Metric, Selection, Source, Timeframe};

const TOLERANCE: f64 = 1e-6;

/// Visible metrics whose baseline and goal agree within `1e-6` at every row
/// where both are present.
///
/// Only evaluated for timeframes carrying a goal series, with both baseline
/// and goal visible. Rows missing either side are skipped, so a metric with
/// no comparable row is reported. An empty table reports nothing.
pub fn identical_metrics(table: &MergedTable, selection: &Selection, timeframe: Timeframe) -> Vec<Metric> {
    if table.is_empty() || !timeframe.has_goal() || !(selection.sources.baseline && selection.sources.goal) {
        return Vec::new();
    }

    selection
        .metrics
        .iter()
        .copied()
        .filter(|&metric| is_identical(table, metric))
        .collect()
}

fn is_identical(table: &MergedTable, metric: Metric) -> bool {
    table.rows.iter().all(|row| {
        match (row.value(metric, Source::Baseline), row.value(metric, Source::Goal)) {
            (Some(b), Some(g)) => (b - g).abs() <= TOLERANCE,
            _ => true,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, MergedRow, MetricValues, PeriodLabel};

    fn row(month: u32, baseline: Option<f64>, goal: Option<f64>) -> MergedRow {
        let mut b = MetricValues::default();
        b.set(Metric::Revenue, baseline);
        b.set(Metric::Expenses, Some(1.0));
        let mut g = MetricValues::default();
        g.set(Metric::Revenue, goal);
        g.set(Metric::Expenses, Some(2.0));
        let mut r = MergedRow::new(PeriodLabel::Month { year: 2024, month });
        r.baseline = Some(b);
        r.goal = Some(g);
        r
    }

    fn table(rows: Vec<MergedRow>) -> MergedTable {
        MergedTable {
            frequency: Frequency::Monthly,
            rows,
        }
    }

    #[test]
    fn equal_series_are_flagged() {
        let t = table(vec![
            row(1, Some(10.0), Some(10.0)),
            row(2, Some(20.0), Some(20.0 + 1e-9)),
            row(3, None, Some(99.0)),
        ]);
        let got = identical_metrics(&t, &Selection::all(), Timeframe::ThreeYearsMonthly);
        assert_eq!(got, vec![Metric::Revenue]);
    }

    #[test]
    fn only_for_goal_timeframes_with_both_visible() {
        let t = table(vec![row(1, Some(10.0), Some(10.0))]);
        assert!(identical_metrics(&t, &Selection::all(), Timeframe::FiveYearsQuarterly).is_empty());

        let mut selection = Selection::all();
        selection.sources.goal = false;
        assert!(identical_metrics(&t, &selection, Timeframe::OneYearMonthly).is_empty());
    }

    #[test]
    fn nothing_to_compare_is_identical() {
        let t = table(vec![row(1, None, Some(1.0)), row(2, Some(1.0), None)]);
        let selection = Selection {
            metrics: vec![Metric::Revenue],
            ..Selection::all()
        };
        assert_eq!(identical_metrics(&t, &selection, Timeframe::OneYearMonthly), vec![Metric::Revenue]);
    }

    #[test]
    fn absent_goal_value_is_skipped() {
        let t = table(vec![row(1, Some(10.0), None)]);
        let got = identical_metrics(&t, &Selection::all(), Timeframe::ThreeYearsMonthly);
        assert_eq!(got, vec![Metric::Revenue]);
    }

    #[test]
    fn empty_table_reports_nothing() {
        assert!(identical_metrics(&table(Vec::new()), &Selection::all(), Timeframe::ThreeYearsMonthly).is_empty());
    }
}

//! Historical bucketing: monthly records rolled up to the view frequency.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{Frequency, HistoricalRecord, Metric, MetricValues, PeriodLabel, RecordIssue, SeriesPoint, Source, SourceSeries};
use crate::engine::Normalized;
use crate::error::LabelError;

/// Roll monthly historical records up to `freq`.
///
/// - monthly: each record passes through with absent metrics kept absent.
/// - quarterly/annual: metrics are summed per bucket, absent counting as 0.
///   A bucket reports 0 for a metric that no record in it carried.
///
/// Records whose `month` is missing or malformed are skipped and reported.
pub fn aggregate_historical(records: &[HistoricalRecord], freq: Frequency) -> Normalized {
    let mut issues = Vec::new();
    let mut buckets: BTreeMap<PeriodLabel, MetricValues> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let month = match parse_record_month(record) {
            Ok(m) => m,
            Err(e) => {
                warn!(index, error = %e, "skipping historical record");
                issues.push(RecordIssue {
                    source: Source::Historical,
                    index,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let values = record.metrics.to_values();
        match freq {
            Frequency::Monthly => {
                if buckets.insert(month, values).is_some() {
                    issues.push(RecordIssue {
                        source: Source::Historical,
                        index,
                        message: format!("duplicate month {month}; later record wins"),
                    });
                }
            }
            Frequency::Quarterly | Frequency::Annual => {
                let Some(label) = month.bucket(freq) else { continue };
                let bucket = buckets.entry(label).or_insert_with(MetricValues::zeroed);
                for metric in Metric::ALL {
                    let sum = bucket.get(metric).unwrap_or(0.0) + values.get(metric).unwrap_or(0.0);
                    bucket.set(metric, Some(sum));
                }
            }
        }
    }

    let points: Vec<SeriesPoint> = buckets
        .into_iter()
        .map(|(label, values)| SeriesPoint { label, values })
        .collect();

    debug!(?freq, records = records.len(), periods = points.len(), "aggregated historical series");

    Normalized {
        series: SourceSeries {
            frequency: freq,
            points,
        },
        issues,
    }
}

fn parse_record_month(record: &HistoricalRecord) -> Result<PeriodLabel, LabelError> {
    let month = record
        .month
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(LabelError::MissingPeriod)?;
    PeriodLabel::parse_month(month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawMetrics;

    fn rec(month: &str, revenue: Option<f64>, expenses: Option<f64>) -> HistoricalRecord {
        HistoricalRecord {
            month: Some(month.to_string()),
            metrics: RawMetrics {
                revenue,
                expenses,
                ..RawMetrics::default()
            },
        }
    }

    #[test]
    fn annual_sums_months() {
        let records = vec![rec("2023-01", Some(100.0), None), rec("2023-02", Some(200.0), None)];
        let out = aggregate_historical(&records, Frequency::Annual);
        assert_eq!(out.series.len(), 1);
        let p = &out.series.points[0];
        assert_eq!(p.label.to_string(), "2023");
        assert_eq!(p.values.get(Metric::Revenue), Some(300.0));
        // sum of nothing is reported as zero, not absent
        assert_eq!(p.values.get(Metric::Expenses), Some(0.0));
    }

    #[test]
    fn monthly_keeps_absence_and_sorts() {
        let records = vec![rec("2023-03", Some(3.0), None), rec("2023-01", None, Some(1.0))];
        let out = aggregate_historical(&records, Frequency::Monthly);
        let labels: Vec<String> = out.series.points.iter().map(|p| p.label.to_string()).collect();
        assert_eq!(labels, ["2023-01", "2023-03"]);
        assert_eq!(out.series.points[0].values.get(Metric::Revenue), None);
        assert_eq!(out.series.points[0].values.get(Metric::Expenses), Some(1.0));
        assert!(out.issues.is_empty());
    }

    #[test]
    fn quarterly_totals_match_raw_sums() {
        let months = ["2022-11", "2022-12", "2023-01", "2023-02", "2023-03", "2023-04"];
        let records: Vec<_> = months
            .iter()
            .enumerate()
            .map(|(i, m)| rec(m, Some((i + 1) as f64 * 10.0), Some(1.0)))
            .collect();

        let out = aggregate_historical(&records, Frequency::Quarterly);
        let got: Vec<(String, Option<f64>, Option<f64>)> = out
            .series
            .points
            .iter()
            .map(|p| (p.label.to_string(), p.values.get(Metric::Revenue), p.values.get(Metric::Expenses)))
            .collect();
        assert_eq!(
            got,
            vec![
                ("2022-Q4".to_string(), Some(30.0), Some(2.0)),
                ("2023-Q1".to_string(), Some(120.0), Some(3.0)),
                ("2023-Q2".to_string(), Some(60.0), Some(1.0)),
            ]
        );
    }

    #[test]
    fn malformed_month_is_skipped_and_reported() {
        let records = vec![
            rec("2023-01", Some(1.0), None),
            rec("2023-1x", Some(50.0), None),
            rec("2023-02", Some(2.0), None),
            HistoricalRecord::default(),
        ];
        let out = aggregate_historical(&records, Frequency::Annual);
        assert_eq!(out.series.points[0].values.get(Metric::Revenue), Some(3.0));
        let idx: Vec<usize> = out.issues.iter().map(|i| i.index).collect();
        assert_eq!(idx, [1, 3]);
    }

    #[test]
    fn empty_input_is_empty_series() {
        let out = aggregate_historical(&[], Frequency::Quarterly);
        assert!(out.series.is_empty());
        assert_eq!(out.series.frequency, Frequency::Quarterly);
    }
}

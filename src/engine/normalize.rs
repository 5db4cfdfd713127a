//! Projection normalization.
//!
//! Projection arrays arrive month-, quarter-, or year-keyed depending on the
//! timeframe. Each record's period field is resolved once into a
//! `PeriodLabel`; everything downstream only sees `{label, values}`.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{
    Frequency, GoalPolicy, MetricValues, PeriodLabel, ProjectionRecord, ProjectionSet, RecordIssue, SeriesPoint,
    Source, SourceSeries, Timeframe,
};
use crate::engine::Normalized;
use crate::error::LabelError;

/// Infer the frequency of a projection array from its first record.
///
/// Empty input cannot be inferred and yields `default`.
pub fn infer_frequency(records: &[ProjectionRecord], default: Frequency) -> Frequency {
    records.first().map(ProjectionRecord::frequency_hint).unwrap_or(default)
}

/// Normalize one projection array into a sorted `SourceSeries`.
///
/// Records without a usable period field, or whose period kind differs from
/// the inferred frequency, are skipped and reported against `source`.
pub fn normalize_projection(records: &[ProjectionRecord], default: Frequency, source: Source) -> Normalized {
    let frequency = infer_frequency(records, default);
    let mut issues = Vec::new();
    let mut by_label: BTreeMap<PeriodLabel, MetricValues> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let label = match resolve_label(record, frequency) {
            Ok(label) => label,
            Err(message) => {
                warn!(?source, index, %message, "skipping projection record");
                issues.push(RecordIssue { source, index, message });
                continue;
            }
        };

        if by_label.insert(label, record.metrics.to_values()).is_some() {
            issues.push(RecordIssue {
                source,
                index,
                message: format!("duplicate period {label}; later record wins"),
            });
        }
    }

    let points: Vec<SeriesPoint> = by_label
        .into_iter()
        .map(|(label, values)| SeriesPoint { label, values })
        .collect();

    debug!(?source, ?frequency, records = records.len(), periods = points.len(), "normalized projection series");

    Normalized {
        series: SourceSeries { frequency, points },
        issues,
    }
}

fn resolve_label(record: &ProjectionRecord, frequency: Frequency) -> Result<PeriodLabel, String> {
    let period = record.period().ok_or_else(|| LabelError::MissingPeriod.to_string())?;
    let label = period.label().map_err(|e| e.to_string())?;
    if label.frequency() != frequency {
        return Err(format!(
            "{:?} period {label} in a {:?} series",
            label.frequency(),
            frequency
        ));
    }
    Ok(label)
}

/// Baseline projection series for a timeframe.
pub fn baseline_series(set: &ProjectionSet, timeframe: Timeframe) -> Normalized {
    normalize_projection(set.baseline_for(timeframe), timeframe.frequency(), Source::Baseline)
}

/// Goal-based projection series for a timeframe.
///
/// Only the monthly 1y and 3y views carry one. Both read the 3-year monthly
/// goal array; the 1y view keeps its first twelve periods.
pub fn goal_series(set: &ProjectionSet, timeframe: Timeframe) -> Normalized {
    let policy = timeframe.goal_policy();
    if policy == GoalPolicy::None {
        return Normalized::empty(timeframe.frequency());
    }

    let mut out = normalize_projection(&set.goal_three_years_monthly, Frequency::Monthly, Source::Goal);
    if let GoalPolicy::First(n) = policy {
        out.series.points.truncate(n);
    }
    out
}

//! Read/write view JSON files.
//!
//! A view file is the portable form of one computed view:
//! - timeframe, frequency, and the visible selection
//! - display range and metrics flagged as identical across projections
//! - the visible rows as flat chart records
//!
//! `pv plot --view` reloads it without recomputing anything.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{DisplayRange, Frequency, Metric, PeriodLabel, Selection, SourceFlags, Timeframe};
use crate::engine::{SourceCounts, ViewResult};
use crate::error::AppError;
use crate::plot::{PlotData, PlotSeries};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub timeframe: Timeframe,
    pub frequency: Frequency,
    pub metrics: Vec<Metric>,
    pub sources: SourceFlags,
    pub range: DisplayRange,
    pub identical: Vec<Metric>,
    pub counts: SourceCounts,
    pub rows: Vec<Map<String, Value>>,
}

impl ViewFile {
    pub fn from_view(view: &ViewResult, selection: &Selection) -> Self {
        Self {
            tool: "pv".to_string(),
            generated_at: Utc::now(),
            timeframe: view.timeframe,
            frequency: view.frequency,
            metrics: selection.metrics.clone(),
            sources: selection.sources,
            range: view.range,
            identical: view.identical.clone(),
            counts: view.counts,
            rows: view.visible.rows.iter().map(|r| r.to_flat_record()).collect(),
        }
    }

    /// Series for plotting, read back from the flat records.
    pub fn plot_data(&self) -> PlotData {
        let labels = self
            .rows
            .iter()
            .map(|r| r.get("label").and_then(Value::as_str).unwrap_or_default().to_string())
            .collect();

        let selection = Selection {
            metrics: self.metrics.clone(),
            sources: self.sources,
        };
        let series = selection
            .fields()
            .map(|(metric, source)| {
                let field = format!("{}_{}", metric.key(), source.suffix());
                PlotSeries {
                    metric,
                    source,
                    values: self.rows.iter().map(|r| r.get(&field).and_then(Value::as_f64)).collect(),
                }
            })
            .collect();

        PlotData {
            frequency: self.frequency,
            labels,
            series,
            range: self.range,
        }
    }
}

/// Write a view JSON file.
pub fn write_view_json(path: &Path, view: &ViewResult, selection: &Selection) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create view JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &ViewFile::from_view(view, selection))
        .map_err(|e| AppError::new(2, format!("Failed to write view JSON: {e}")))?;

    Ok(())
}

/// Read a view JSON file.
pub fn read_view_json(path: &Path) -> Result<ViewFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open view JSON '{}': {e}", path.display())))?;
    let view: ViewFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid view JSON: {e}")))?;

    // Labels must match the file's frequency, or the x axis would be meaningless.
    for row in &view.rows {
        let label = row
            .get("label")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::new(2, "Invalid view JSON: row without a string `label`"))?;
        PeriodLabel::parse(label, view.frequency)?;
    }

    Ok(view)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn rejects_labels_of_the_wrong_frequency() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "tool": "pv",
                "generated_at": "2024-01-01T00:00:00Z",
                "timeframe": "five_years_quarterly",
                "frequency": "quarterly",
                "metrics": ["revenue"],
                "sources": {{"historical": true, "baseline": true, "goal": false}},
                "range": {{"kind": "auto"}},
                "identical": [],
                "counts": {{"historical": 1, "baseline": 0, "goal": 0}},
                "rows": [{{"label": "2024-01", "revenue_hist": 1.0}}]
            }}"#
        )
        .unwrap();

        let err = read_view_json(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("2024-01"));
    }
}

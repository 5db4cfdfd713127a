//! Plot-ready series, shared by the ASCII renderer and the TUI chart.

pub mod ascii;

pub use ascii::render_ascii_plot;

use crate::domain::{DisplayRange, Frequency, Metric, Selection, Source};
use crate::engine::ViewResult;

/// One visible `(metric, source)` line. `values[i]` belongs to `PlotData::labels[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub metric: Metric,
    pub source: Source,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub frequency: Frequency,
    pub labels: Vec<String>,
    pub series: Vec<PlotSeries>,
    pub range: DisplayRange,
}

impl PlotData {
    pub fn from_view(view: &ViewResult, selection: &Selection) -> Self {
        let rows = &view.visible.rows;
        let series = selection
            .fields()
            .map(|(metric, source)| PlotSeries {
                metric,
                source,
                values: rows.iter().map(|r| r.value(metric, source)).collect(),
            })
            .collect();

        Self {
            frequency: view.frequency,
            labels: rows.iter().map(|r| r.label.to_string()).collect(),
            series,
            range: view.range,
        }
    }

    /// Finite min/max across every series.
    pub fn extent(&self) -> Option<(f64, f64)> {
        let mut values = self
            .series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .filter(|v| v.is_finite());
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Y bounds to draw with: the display range, or the padded data extent.
    pub fn y_bounds(&self) -> (f64, f64) {
        if let Some(bounds) = self.range.bounds() {
            return bounds;
        }
        let (lo, hi) = self.extent().unwrap_or((0.0, 1.0));
        let span = hi - lo;
        // Flat data still needs a non-empty band.
        let pad = if span > 0.0 { span * 0.05 } else { (hi.abs() * 0.05).max(1.0) };
        (lo - pad, hi + pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_bounds_pads_flat_series() {
        let data = PlotData {
            frequency: Frequency::Annual,
            labels: vec!["2024".to_string()],
            series: vec![PlotSeries {
                metric: Metric::Revenue,
                source: Source::Historical,
                values: vec![Some(0.0)],
            }],
            range: DisplayRange::Auto,
        };
        assert_eq!(data.extent(), Some((0.0, 0.0)));
        assert_eq!(data.y_bounds(), (-1.0, 1.0));
    }
}

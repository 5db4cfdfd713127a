//! Export a merged table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per period, one column per `(metric, source)` plus the band fields.

use std::fs::File;
use std::path::Path;

use crate::domain::{MergedTable, Metric, Source};
use crate::error::AppError;

/// Column names in export order.
pub fn export_columns() -> Vec<String> {
    let mut cols = vec!["label".to_string()];
    for metric in Metric::ALL {
        for source in Source::ALL {
            cols.push(format!("{}_{}", metric.key(), source.suffix()));
        }
        cols.push(format!("{}_band_min", metric.key()));
        cols.push(format!("{}_band_span", metric.key()));
        cols.push(format!("{}_delta", metric.key()));
    }
    cols
}

/// Write a merged table as CSV. Absent values are empty cells.
pub fn write_table_csv(path: &Path, table: &MergedTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_table(csv::Writer::from_writer(file), table)
}

pub fn write_table<W: std::io::Write>(mut writer: csv::Writer<W>, table: &MergedTable) -> Result<(), AppError> {
    writer
        .write_record(export_columns())
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in &table.rows {
        let mut record = vec![row.label.to_string()];
        for metric in Metric::ALL {
            for source in Source::ALL {
                record.push(fmt_cell(row.value(metric, source)));
            }
            let band = row.band(metric);
            record.push(fmt_cell(band.map(|b| b.min)));
            record.push(fmt_cell(band.map(|b| b.span)));
            record.push(fmt_cell(band.map(|b| b.delta)));
        }
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn fmt_cell(v: Option<f64>) -> String {
    v.filter(|v| v.is_finite()).map(|v| v.to_string()).unwrap_or_default()
}

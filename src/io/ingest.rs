//! JSON ingest for the two uploaded payloads.
//!
//! This is the file-loading side of the tool: it owns schema checks and turns
//! the documents into plain records. Period parsing and bucketing are left to
//! the engine.
//!
//! - `data.json` must be `{ "old_data": [...] }`
//! - `projections.json` must be `{ "projections_data": { ... } }`, optionally
//!   with `goal_based_projections.three_years_monthly`
//!
//! Schema violations are exit code 2. Missing or non-array inner values are
//! tolerated and read as empty.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{HistoricalRecord, ProjectionRecord, ProjectionSet, ViewConfig};
use crate::error::AppError;

/// Both payloads, parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedInputs {
    pub historical: Vec<HistoricalRecord>,
    pub projections: ProjectionSet,
}

/// Load both files named by the config.
pub fn load_inputs(config: &ViewConfig) -> Result<LoadedInputs, AppError> {
    Ok(LoadedInputs {
        historical: load_historical(&config.data_path)?,
        projections: load_projections(&config.projections_path)?,
    })
}

pub fn load_historical(path: &Path) -> Result<Vec<HistoricalRecord>, AppError> {
    let text = read_text(path)?;
    let records = parse_historical(&text)?;
    info!(path = %path.display(), records = records.len(), "loaded historical data");
    Ok(records)
}

pub fn load_projections(path: &Path) -> Result<ProjectionSet, AppError> {
    let text = read_text(path)?;
    let set = parse_projections(&text)?;
    info!(
        path = %path.display(),
        timeframes = set.projections.len(),
        goal_records = set.goal_three_years_monthly.len(),
        "loaded projections"
    );
    Ok(set)
}

/// Parse the text of a `data.json` payload.
pub fn parse_historical(text: &str) -> Result<Vec<HistoricalRecord>, AppError> {
    let json: Value =
        serde_json::from_str(text).map_err(|e| AppError::new(2, format!("Invalid data.json JSON: {e}")))?;

    let Some(old_data) = json.get("old_data").filter(|v| v.is_array()) else {
        return Err(AppError::new(2, "data.json must contain { old_data: [...] }"));
    };

    from_value(old_data, "old_data")
}

/// Parse the text of a `projections.json` payload.
pub fn parse_projections(text: &str) -> Result<ProjectionSet, AppError> {
    let json: Value =
        serde_json::from_str(text).map_err(|e| AppError::new(2, format!("Invalid projections.json JSON: {e}")))?;

    let Some(data) = json.get("projections_data").filter(|v| is_truthy(v)) else {
        return Err(AppError::new(
            2,
            "projections.json must contain { projections_data: { ... } }",
        ));
    };

    let mut projections = BTreeMap::new();
    match data.as_object() {
        Some(map) => {
            for (key, value) in map {
                projections.insert(key.clone(), record_array(value, &format!("projections_data.{key}"))?);
            }
        }
        None => warn!("projections_data is not an object; no baseline projections loaded"),
    }

    let goal_three_years_monthly = match json
        .get("goal_based_projections")
        .and_then(|g| g.get("three_years_monthly"))
    {
        Some(value) => record_array(value, "goal_based_projections.three_years_monthly")?,
        None => Vec::new(),
    };

    Ok(ProjectionSet {
        projections,
        goal_three_years_monthly,
    })
}

fn record_array(value: &Value, context: &str) -> Result<Vec<ProjectionRecord>, AppError> {
    if !value.is_array() {
        if !value.is_null() {
            warn!(context, "expected an array; treating as empty");
        }
        return Ok(Vec::new());
    }
    from_value(value, context)
}

fn from_value<T: DeserializeOwned>(value: &Value, context: &str) -> Result<T, AppError> {
    T::deserialize(value).map_err(|e| AppError::new(2, format!("Invalid records in `{context}`: {e}")))
}

fn read_text(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", path.display())))
}

/// Loose JSON truthiness (`null`, `false`, `0`, `""` are falsy).
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::YearToken;

    #[test]
    fn historical_requires_old_data_array() {
        let err = parse_historical(r#"{"old_data": {}}"#).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(parse_historical(r#"{"rows": []}"#).is_err());
        assert!(parse_historical("not json").is_err());
    }

    #[test]
    fn historical_records_keep_nulls_and_missing() {
        let records = parse_historical(
            r#"{"old_data": [
                {"month": "2023-01", "revenue": 120000, "net_profit": null},
                {"month": "2023-02", "expenses": 5.5}
            ]}"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].metrics.revenue, Some(120000.0));
        assert_eq!(records[0].metrics.net_profit, None);
        assert_eq!(records[1].metrics.expenses, Some(5.5));
        assert_eq!(records[1].metrics.revenue, None);
    }

    #[test]
    fn projections_require_projections_data() {
        assert!(parse_projections(r#"{"goal_based_projections": {}}"#).is_err());
        assert!(parse_projections(r#"{"projections_data": null}"#).is_err());
    }

    #[test]
    fn projections_tolerate_missing_inner_arrays() {
        let set = parse_projections(
            r#"{
                "projections_data": {
                    "ten_years_annual": [{"year": 2024, "revenue": 1}, {"year": "2025"}],
                    "five_years_quarterly": null
                },
                "goal_based_projections": {}
            }"#,
        )
        .unwrap();
        let annual = &set.projections["ten_years_annual"];
        assert_eq!(annual[0].year, Some(YearToken::Number(2024)));
        assert_eq!(annual[1].year, Some(YearToken::Text("2025".to_string())));
        assert!(set.projections["five_years_quarterly"].is_empty());
        assert!(set.goal_three_years_monthly.is_empty());
    }
}

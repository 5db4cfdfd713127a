use std::io::Write;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::{NamedTempFile, tempdir};

use projection_viz::app::pipeline::run_view;
use projection_viz::domain::{Metric, ShowMode, Source, Timeframe, ViewConfig};
use projection_viz::io::{export_columns, read_view_json, write_table_csv, write_view_json};
use projection_viz::plot::{PlotData, render_ascii_plot};

fn write_json(value: serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{value}").unwrap();
    file
}

fn quarterly_run() -> projection_viz::app::pipeline::RunOutput {
    let data = write_json(json!({
        "old_data": [
            {"month": "2023-01", "revenue": 100.0, "expenses": 40.0},
            {"month": "2023-02", "revenue": 200.0, "expenses": 60.0},
            {"month": "2023-04", "revenue": 300.0}
        ]
    }));
    let projections = write_json(json!({
        "projections_data": {
            "five_years_quarterly": [
                {"quarter": "2023-Q3", "revenue": 400.0, "expenses": 90.0},
                {"quarter": "2023-Q4", "revenue": 500.0, "expenses": 95.0}
            ]
        }
    }));

    let config = ViewConfig {
        data_path: data.path().to_path_buf(),
        projections_path: projections.path().to_path_buf(),
        timeframe: Timeframe::FiveYearsQuarterly,
        show: ShowMode::Both,
        include_goal: true,
        metrics: vec![Metric::Revenue, Metric::Expenses],
        table: false,
        plot: false,
        plot_width: 40,
        plot_height: 10,
        export_csv: None,
        export_view: None,
    };
    run_view(&config).unwrap()
}

#[test]
fn view_file_round_trips_labels_and_range() {
    let run = quarterly_run();
    let dir = tempdir().unwrap();
    let path = dir.path().join("view.json");

    write_view_json(&path, &run.view, &run.selection).unwrap();
    let file = read_view_json(&path).unwrap();

    assert_eq!(file.tool, "pv");
    assert_eq!(file.timeframe, Timeframe::FiveYearsQuarterly);
    assert_eq!(file.range, run.view.range);
    assert_eq!(file.metrics, vec![Metric::Revenue, Metric::Expenses]);

    let labels: Vec<&str> = file.rows.iter().map(|r| r["label"].as_str().unwrap()).collect();
    assert_eq!(labels, ["2023-Q1", "2023-Q2", "2023-Q3", "2023-Q4"]);

    // a source without the label contributes no fields to that row
    assert_eq!(file.rows[0]["revenue_hist"], 300.0);
    assert!(file.rows[0].get("revenue_proj").is_none());
    assert_eq!(file.rows[2]["revenue_proj"], 400.0);
    assert!(file.rows[2]["revenue_delta"].is_null());

    // plotting from the file matches plotting from the live view
    let from_file = file.plot_data();
    let live = PlotData::from_view(&run.view, &run.selection);
    assert_eq!(from_file, live);
    assert_eq!(render_ascii_plot(&from_file, 40, 10), render_ascii_plot(&live, 40, 10));
}

#[test]
fn csv_export_has_one_line_per_visible_row() {
    let run = quarterly_run();
    let dir = tempdir().unwrap();
    let path = dir.path().join("view.csv");

    write_table_csv(&path, &run.view.visible).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, export_columns());

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), run.view.visible.len());
    assert_eq!(&rows[1][0], "2023-Q2");

    let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
    assert_eq!(&rows[1][col("revenue_hist")], "300");
    // quarterly buckets report 0 for metrics no record carried
    assert_eq!(&rows[1][col("expenses_hist")], "0");
    assert_eq!(&rows[1][col("revenue_proj")], "");
}

#[test]
fn plot_series_follow_selection_order() {
    let run = quarterly_run();
    let data = PlotData::from_view(&run.view, &run.selection);
    let fields: Vec<(Metric, Source)> = data.series.iter().map(|s| (s.metric, s.source)).collect();
    assert_eq!(
        fields,
        [
            (Metric::Revenue, Source::Historical),
            (Metric::Expenses, Source::Historical),
            (Metric::Revenue, Source::Baseline),
            (Metric::Expenses, Source::Baseline),
            (Metric::Revenue, Source::Goal),
            (Metric::Expenses, Source::Goal),
        ]
    );
    assert!(data.series[4].values.iter().all(Option::is_none));
}

#[test]
fn annual_view_file_round_trips_integer_years() {
    let data = write_json(json!({ "old_data": [] }));
    let projections = write_json(json!({
        "projections_data": {
            "ten_years_annual": [
                {"year": 999, "revenue": 1.0},
                {"year": 9999, "revenue": 2.0},
                {"year": 10024, "revenue": 3.0}
            ]
        }
    }));
    let config = ViewConfig {
        data_path: data.path().to_path_buf(),
        projections_path: projections.path().to_path_buf(),
        timeframe: Timeframe::TenYearsAnnual,
        show: ShowMode::Both,
        include_goal: true,
        metrics: Metric::ALL.to_vec(),
        table: false,
        plot: false,
        plot_width: 40,
        plot_height: 10,
        export_csv: None,
        export_view: None,
    };
    let run = run_view(&config).unwrap();

    // out-of-range years are reported, not written out
    assert_eq!(run.view.issues.len(), 1);
    assert_eq!(run.view.issues[0].index, 2);

    let dir = tempdir().unwrap();
    let path = dir.path().join("annual.json");
    write_view_json(&path, &run.view, &run.selection).unwrap();
    let file = read_view_json(&path).unwrap();

    let labels: Vec<&str> = file.rows.iter().map(|r| r["label"].as_str().unwrap()).collect();
    assert_eq!(labels, ["0999", "9999"]);
}

//! Command-line parsing for the projection viewer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the engine code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{Metric, ShowMode, Timeframe};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pv", version, about = "Historical vs. projected financials, aligned per period")]
pub struct Cli {
    /// Debug logging to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Align historical and projected data for one timeframe, print a summary,
    /// and optionally plot/export.
    View(ViewArgs),
    /// Plot a previously exported view JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same engine as `pv view`, but recomputes on every toggle
    /// and renders in a terminal UI using Ratatui.
    Tui(ViewArgs),
}

/// Inputs and display options for a view.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// Historical payload (`{ "old_data": [...] }`).
    #[arg(long, env = "PV_DATA", value_name = "JSON")]
    pub data: PathBuf,

    /// Projection payload (`{ "projections_data": {...} }`).
    #[arg(long, env = "PV_PROJECTIONS", value_name = "JSON")]
    pub projections: PathBuf,

    /// Timeframe key.
    #[arg(short = 't', long, value_enum, default_value_t = Timeframe::OneYearMonthly)]
    pub timeframe: Timeframe,

    /// Which datasets to show.
    #[arg(long, value_enum, default_value_t = ShowMode::Both)]
    pub show: ShowMode,

    /// Hide the goal-based projection.
    #[arg(long)]
    pub no_goal: bool,

    /// Visible metrics (comma-separated).
    #[arg(
        short = 'm',
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = Metric::ALL.to_vec()
    )]
    pub metrics: Vec<Metric>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Print the visible rows as a table.
    #[arg(long)]
    pub table: bool,

    /// Export the visible rows to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the view (range, flags, flat rows) to JSON.
    #[arg(long = "export-view")]
    pub export_view: Option<PathBuf>,
}

/// Options for plotting a saved view.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// View JSON file produced by `pv view --export-view`.
    #[arg(long, value_name = "JSON")]
    pub view: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_args_parse_metrics_list() {
        let cli = Cli::parse_from([
            "pv",
            "view",
            "--data",
            "d.json",
            "--projections",
            "p.json",
            "--timeframe",
            "five_years_quarterly",
            "--metrics",
            "revenue,net_profit",
            "--show",
            "proj",
        ]);
        let Command::View(args) = cli.command else {
            panic!("expected view");
        };
        assert_eq!(args.timeframe, Timeframe::FiveYearsQuarterly);
        assert_eq!(args.metrics, vec![Metric::Revenue, Metric::NetProfit]);
        assert_eq!(args.show, ShowMode::Proj);
        assert!(args.plot);
    }
}

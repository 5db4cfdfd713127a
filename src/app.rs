//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - loads payloads and computes the view
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PlotArgs, ViewArgs};
use crate::domain::ViewConfig;
use crate::error::AppError;
use crate::plot::PlotData;

pub mod pipeline;

/// Entry point for the `pv` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `pv` and `pv --data x.json ...` to behave like `pv tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let default_level = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        // Log lines would land on the alternate screen.
        (Command::Tui(_), false) => "off",
        (_, false) => "warn",
    };
    init_logging(default_level);

    match cli.command {
        Command::View(args) => handle_view(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_view(args: ViewArgs) -> Result<(), AppError> {
    let config = view_config_from_args(&args);
    let run = pipeline::run_view(&config)?;

    println!("{}", crate::report::format_summary(&run.view, &run.selection));

    if config.table {
        println!("{}", crate::report::format_table(&run.view.visible, &run.selection));
    }

    if config.plot {
        let data = PlotData::from_view(&run.view, &run.selection);
        let plot = crate::plot::render_ascii_plot(&data, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_table_csv(path, &run.view.visible)?;
    }
    if let Some(path) = &config.export_view {
        crate::io::view::write_view_json(path, &run.view, &run.selection)?;
    }

    Ok(())
}

fn handle_tui(args: ViewArgs) -> Result<(), AppError> {
    crate::tui::run(view_config_from_args(&args))
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let view = crate::io::view::read_view_json(&args.view)?;
    let plot = crate::plot::render_ascii_plot(&view.plot_data(), args.width, args.height);

    println!("{plot}");
    Ok(())
}

pub fn view_config_from_args(args: &ViewArgs) -> ViewConfig {
    ViewConfig {
        data_path: args.data.clone(),
        projections_path: args.projections.clone(),
        timeframe: args.timeframe,
        show: args.show,
        include_goal: !args.no_goal,
        metrics: args.metrics.clone(),
        table: args.table,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_view: args.export_view.clone(),
    }
}

/// Rewrite argv so `pv` defaults to `pv tui`.
///
/// Rules:
/// - `pv`                        -> `pv tui`
/// - `pv --data a.json ...`      -> `pv tui --data a.json ...`
/// - `pv --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "view" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_becomes_tui() {
        assert_eq!(rewrite_args(argv(&["pv"])), argv(&["pv", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["pv", "--data", "a.json"])),
            argv(&["pv", "tui", "--data", "a.json"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["pv", "view"])), argv(&["pv", "view"]));
        assert_eq!(rewrite_args(argv(&["pv", "--help"])), argv(&["pv", "--help"]));
    }

    #[test]
    fn no_plot_wins_over_plot() {
        let cli = crate::cli::Cli::parse_from([
            "pv",
            "view",
            "--data",
            "d.json",
            "--projections",
            "p.json",
            "--no-plot",
            "--no-goal",
        ]);
        let Command::View(args) = cli.command else {
            panic!("expected view");
        };
        let config = view_config_from_args(&args);
        assert!(!config.plot);
        assert!(!config.include_goal);
        assert_eq!(config.selection().metrics.len(), 4);
    }
}

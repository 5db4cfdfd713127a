//! Ratatui-based terminal UI.
//!
//! Payloads are loaded once. Every toggle (timeframe, show mode, goal, metric)
//! recomputes the whole view from those immutable inputs and redraws.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tracing::info;

use crate::app::pipeline::compute_from_inputs;
use crate::domain::{DisplayRange, Metric, Source, ViewConfig};
use crate::engine::ViewResult;
use crate::error::AppError;
use crate::io::ingest::{LoadedInputs, load_inputs};
use crate::plot::PlotData;

mod plotters_chart;

use plotters_chart::{ChartLine, PvPlottersChart, Stroke};

/// Start the TUI.
pub fn run(config: ViewConfig) -> Result<(), AppError> {
    // Load before touching the terminal so input errors print normally.
    let inputs = load_inputs(&config)?;
    let mut app = App::new(inputs, config);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    inputs: LoadedInputs,
    config: ViewConfig,
    view: ViewResult,
    status: String,
}

impl App {
    fn new(inputs: LoadedInputs, config: ViewConfig) -> Self {
        let view = compute_from_inputs(&inputs, config.timeframe, &config.selection());
        let status = match view.issues.len() {
            0 => "Loaded.".to_string(),
            n => format!("Loaded; {n} record(s) skipped."),
        };
        Self {
            inputs,
            config,
            view,
            status,
        }
    }

    fn recompute(&mut self) {
        self.view = compute_from_inputs(&self.inputs, self.config.timeframe, &self.config.selection());
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply one key press. Returns `true` to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => {
                self.config.timeframe = self.config.timeframe.prev();
                self.recompute();
                self.status = format!("timeframe: {}", self.config.timeframe.display_name());
            }
            KeyCode::Right => {
                self.config.timeframe = self.config.timeframe.next();
                self.recompute();
                self.status = format!("timeframe: {}", self.config.timeframe.display_name());
            }
            KeyCode::Char('s') => {
                self.config.show = self.config.show.next();
                self.recompute();
                self.status = format!("show: {}", self.config.show.display_name());
            }
            KeyCode::Char('g') => {
                self.config.include_goal = !self.config.include_goal;
                self.recompute();
                self.status = format!("goal: {}", on_off(self.config.include_goal));
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = (c as u8 - b'1') as usize;
                let metric = Metric::ALL[idx];
                let mut selection = self.config.selection();
                selection.toggle_metric(metric);
                self.config.metrics = selection.metrics;
                self.recompute();
                self.status = format!(
                    "{}: {}",
                    metric.display_name(),
                    on_off(self.config.metrics.contains(&metric))
                );
            }
            KeyCode::Char('e') => self.export_view(),
            _ => {}
        }
        false
    }

    fn export_view(&mut self) {
        let path = self.export_path();
        match crate::io::view::write_view_json(&path, &self.view, &self.config.selection()) {
            Ok(()) => {
                info!(path = %path.display(), "exported view");
                self.status = format!("Wrote view: {}", path.display());
            }
            Err(err) => {
                self.status = format!("Export failed: {err}");
            }
        }
    }

    fn export_path(&self) -> PathBuf {
        self.config
            .export_view
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("pv-view-{}.json", self.config.timeframe.key())))
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let view = &self.view;
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("pv", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" - {} ({})", view.timeframe.display_name(), view.frequency.axis_label())),
        ]));

        let metrics: Vec<&str> = self.config.selection().metrics.iter().map(|m| m.display_name()).collect();
        lines.push(Line::from(Span::styled(
            format!(
                "show: {} | goal: {} | metrics: {}",
                self.config.show.display_name(),
                if view.timeframe.has_goal() { on_off(self.config.include_goal) } else { "n/a" },
                if metrics.is_empty() { "(none)".to_string() } else { metrics.join(", ") },
            ),
            Style::default().fg(Color::Gray),
        )));

        let mut summary = format!(
            "rows: {} visible / {} aligned | old={} proj={} goal={} | range: {}",
            view.visible.len(),
            view.aligned.len(),
            view.counts.historical,
            view.counts.baseline,
            view.counts.goal,
            fmt_range(view.range),
        );
        if !view.issues.is_empty() {
            summary.push_str(&format!(" | skipped: {}", view.issues.len()));
        }
        if !view.identical.is_empty() {
            let names: Vec<&str> = view.identical.iter().map(|m| m.display_name()).collect();
            summary.push_str(&format!(" | goal = proj: {}", names.join(", ")));
        }
        lines.push(Line::from(Span::styled(summary, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Projections").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let data = PlotData::from_view(&self.view, &self.config.selection());
        if data.labels.is_empty() || data.series.is_empty() {
            let msg = Paragraph::new("No visible data for this selection.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let lines = chart_lines(&data);
        let (y0, y1) = data.y_bounds();
        let widget = PvPlottersChart {
            lines: &lines,
            labels: &data.labels,
            x_bounds: x_bounds(data.labels.len()),
            y_bounds: [y0, y1],
            x_label: data.frequency.axis_label(),
            fmt_y: fmt_axis_y,
        };
        frame.render_widget(widget, chunks[0]);

        let legend: Vec<Span> = data
            .series
            .iter()
            .flat_map(|s| {
                let (r, g, b) = s.metric.color();
                [
                    Span::styled(stroke_symbol(stroke(s.source)), Style::default().fg(Color::Rgb(r, g, b))),
                    Span::raw(format!("{} ({})  ", s.metric.display_name(), s.source.display_name())),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(legend)), chunks[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ timeframe  s show  g goal  1-4 metrics  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Split each plot series into runs of present values, coloured per metric.
fn chart_lines(data: &PlotData) -> Vec<ChartLine> {
    data.series
        .iter()
        .map(|s| {
            let mut segments = Vec::new();
            let mut current: Vec<(f64, f64)> = Vec::new();
            for (i, v) in s.values.iter().enumerate() {
                match v.filter(|v| v.is_finite()) {
                    Some(v) => current.push((i as f64, v)),
                    None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                    None => {}
                }
            }
            if !current.is_empty() {
                segments.push(current);
            }
            ChartLine {
                segments,
                color: s.metric.color(),
                stroke: stroke(s.source),
            }
        })
        .collect()
}

fn x_bounds(n: usize) -> [f64; 2] {
    // A single period still needs a non-empty x range.
    if n <= 1 { [-0.5, 0.5] } else { [0.0, (n - 1) as f64] }
}

/// One colour per metric; the source is told apart by stroke.
fn stroke(source: Source) -> Stroke {
    match source {
        Source::Historical => Stroke::Solid,
        Source::Baseline => Stroke::Dashed,
        Source::Goal => Stroke::Dotted,
    }
}

fn stroke_symbol(stroke: Stroke) -> &'static str {
    match stroke {
        Stroke::Solid => "━━ ",
        Stroke::Dashed => "╍╍ ",
        Stroke::Dotted => "┅┅ ",
    }
}

fn on_off(v: bool) -> &'static str {
    if v { "on" } else { "off" }
}

fn fmt_range(range: DisplayRange) -> String {
    match range {
        DisplayRange::Auto => "auto".to_string(),
        DisplayRange::Bounds { lower, upper } => format!("[{}, {}]", fmt_axis_y(lower), fmt_axis_y(upper)),
    }
}

/// Compact axis value (`12.5k`, `1.2M`).
fn fmt_axis_y(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Frequency, HistoricalRecord, ProjectionRecord, ProjectionSet, RawMetrics, ShowMode, Timeframe,
    };
    use crate::plot::PlotSeries;

    fn raw(revenue: f64) -> RawMetrics {
        RawMetrics {
            revenue: Some(revenue),
            ..RawMetrics::default()
        }
    }

    fn app() -> App {
        let historical = vec![HistoricalRecord {
            month: Some("2023-12".to_string()),
            metrics: raw(100.0),
        }];
        let mut projections = ProjectionSet::default();
        projections.projections.insert(
            "one_year_monthly".to_string(),
            vec![ProjectionRecord {
                month: Some("2024-01".to_string()),
                metrics: raw(110.0),
                ..ProjectionRecord::default()
            }],
        );
        projections.projections.insert(
            "ten_years_annual".to_string(),
            vec![ProjectionRecord {
                year: Some(crate::domain::YearToken::Number(2024)),
                metrics: raw(1_300.0),
                ..ProjectionRecord::default()
            }],
        );

        let config = ViewConfig {
            data_path: PathBuf::from("data.json"),
            projections_path: PathBuf::from("projections.json"),
            timeframe: Timeframe::OneYearMonthly,
            show: ShowMode::Both,
            include_goal: true,
            metrics: Metric::ALL.to_vec(),
            table: false,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_csv: None,
            export_view: None,
        };
        App::new(LoadedInputs { historical, projections }, config)
    }

    #[test]
    fn timeframe_keys_recompute_view() {
        let mut app = app();
        assert_eq!(app.view.aligned.len(), 2);

        assert!(!app.handle_key(KeyCode::Left));
        assert_eq!(app.config.timeframe, Timeframe::FifteenYearsAnnual);
        assert!(!app.handle_key(KeyCode::Left));
        assert_eq!(app.view.timeframe, Timeframe::TenYearsAnnual);
        assert_eq!(app.view.frequency, Frequency::Annual);
        // 2023 from history, 2024 from the annual projection.
        assert_eq!(app.view.aligned.len(), 2);
    }

    #[test]
    fn show_and_metric_toggles_filter_rows() {
        let mut app = app();
        app.handle_key(KeyCode::Char('s'));
        assert_eq!(app.config.show, ShowMode::Old);
        assert_eq!(app.view.visible.len(), 1);

        app.handle_key(KeyCode::Char('1'));
        assert!(!app.config.metrics.contains(&Metric::Revenue));
        assert!(app.view.visible.is_empty());

        app.handle_key(KeyCode::Char('1'));
        assert_eq!(app.config.metrics, Metric::ALL.to_vec());
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn chart_lines_split_at_gaps() {
        let data = PlotData {
            frequency: Frequency::Monthly,
            labels: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            series: vec![PlotSeries {
                metric: Metric::Revenue,
                source: Source::Goal,
                values: vec![Some(1.0), None, Some(2.0), Some(3.0)],
            }],
            range: DisplayRange::Auto,
        };
        let lines = chart_lines(&data);
        assert_eq!(lines[0].segments, vec![vec![(0.0, 1.0)], vec![(2.0, 2.0), (3.0, 3.0)]]);
        assert_eq!(lines[0].color, Metric::Revenue.color());
        assert_eq!(lines[0].stroke, Stroke::Dotted);
    }

    #[test]
    fn every_source_of_a_metric_shares_its_colour() {
        let data = PlotData {
            frequency: Frequency::Annual,
            labels: vec!["2024".into()],
            series: Source::ALL
                .into_iter()
                .map(|source| PlotSeries {
                    metric: Metric::GrossProfit,
                    source,
                    values: vec![Some(1.0)],
                })
                .collect(),
            range: DisplayRange::Auto,
        };
        let lines = chart_lines(&data);
        assert!(lines.iter().all(|l| l.color == Metric::GrossProfit.color()));
        let strokes: Vec<Stroke> = lines.iter().map(|l| l.stroke).collect();
        assert_eq!(strokes, [Stroke::Solid, Stroke::Dashed, Stroke::Dotted]);
    }

    #[test]
    fn axis_formatting() {
        assert_eq!(fmt_axis_y(950.0), "950");
        assert_eq!(fmt_axis_y(12_500.0), "12.5k");
        assert_eq!(fmt_axis_y(-2_000_000.0), "-2.0M");
    }
}

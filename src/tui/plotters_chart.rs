//! Plotters-powered projection chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// How a line is stroked. Colour identifies the metric, stroke the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Solid,
    /// Every other step between periods is drawn.
    Dashed,
    /// Points only.
    Dotted,
}

/// One visible `(metric, source)` line, already split at gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    /// Runs of consecutive present values as `(row index, value)`.
    pub segments: Vec<Vec<(f64, f64)>>,
    pub color: (u8, u8, u8),
    pub stroke: Stroke,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct PvPlottersChart<'a> {
    pub lines: &'a [ChartLine],
    /// Period labels; x = index into this slice.
    pub labels: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub fmt_y: fn(f64) -> String,
}

impl Widget for PvPlottersChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let labels = self.labels;
        let fmt_x = move |v: &f64| {
            let idx = v.round();
            if idx < 0.0 || (idx - v).abs() > 0.25 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        };

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 10)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&fmt_x)
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for line in self.lines {
                let (r, g, b) = line.color;
                let color = RGBColor(r, g, b);
                for segment in &line.segments {
                    match line.stroke {
                        Stroke::Solid => {
                            chart.draw_series(LineSeries::new(segment.iter().copied(), &color))?;
                        }
                        Stroke::Dashed => {
                            for step in segment.windows(2).step_by(2) {
                                chart.draw_series(LineSeries::new(step.iter().copied(), &color))?;
                            }
                        }
                        Stroke::Dotted => {}
                    }
                    // Single-point segments have no line; the pixel keeps them visible.
                    //
                    // `Circle` markers are avoided: the ratatui backend maps their
                    // radii to huge canvas circles.
                    chart.draw_series(segment.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

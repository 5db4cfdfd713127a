//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - x axis: period index (labels are evenly spaced)
//! - historical series: uppercase metric initial (`R`, `N`, `G`, `E`)
//! - baseline projection: lowercase initial
//! - goal projection: `*`

use crate::plot::{PlotData, PlotSeries};

/// Render the visible series of a view.
pub fn render_ascii_plot(data: &PlotData, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    if data.labels.is_empty() {
        return "Plot: no visible data.\n".to_string();
    }

    let (y_min, y_max) = data.y_bounds();

    let mut grid = vec![vec![' '; width]; height];
    let n = data.labels.len();

    for series in &data.series {
        draw_series(&mut grid, series, n, y_min, y_max);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {}=[{}, {}] | y=[{y_min:.2}, {y_max:.2}]\n",
        data.frequency.axis_label(),
        data.labels[0],
        data.labels[n - 1],
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let legend: Vec<String> = data
        .series
        .iter()
        .map(|s| {
            format!(
                "{} {} ({})",
                s.source.glyph(s.metric),
                s.metric.display_name(),
                s.source.display_name()
            )
        })
        .collect();
    if !legend.is_empty() {
        out.push_str(&format!("Legend: {}\n", legend.join("  ")));
    }

    out
}

fn draw_series(grid: &mut [Vec<char>], series: &PlotSeries, n: usize, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();
    let glyph = series.source.glyph(series.metric);

    // Consecutive present values are joined; a gap breaks the line.
    let mut prev: Option<(usize, usize)> = None;
    for (i, v) in series.values.iter().enumerate() {
        let Some(v) = v.filter(|v| v.is_finite()) else {
            prev = None;
            continue;
        };
        let x = map_x(i, n, width);
        let y = map_y(v, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, y, glyph);
        }
        grid[y][x] = glyph;
        prev = Some((x, y));
    }
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

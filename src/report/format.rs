//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine stays free of presentation concerns
//! - output changes are localized (important for snapshot tests)

use crate::domain::{DisplayRange, MergedTable, Metric, Selection, Source};
use crate::engine::ViewResult;

/// Format the run summary: timeframe, sources, counts, range, flags, and skipped records.
pub fn format_summary(view: &ViewResult, selection: &Selection) -> String {
    let mut out = String::new();

    out.push_str("=== pv - Projection View ===\n");
    out.push_str(&format!(
        "Timeframe: {} ({})\n",
        view.timeframe.display_name(),
        view.timeframe.key()
    ));
    out.push_str(&format!("Axis: {}\n", view.frequency.axis_label()));
    out.push_str(&format!("Sources: {}\n", join_or_none(selection.sources.iter().map(Source::display_name))));
    out.push_str(&format!(
        "Metrics: {}\n",
        join_or_none(selection.metrics.iter().map(|m| m.display_name()))
    ));
    out.push_str(&format!(
        "Rows: aligned={} visible={} | historical={} baseline={} goal={}\n",
        view.aligned.len(),
        view.visible.len(),
        view.counts.historical,
        view.counts.baseline,
        view.counts.goal,
    ));
    out.push_str(&format!("Range: {}\n", fmt_range(view.range)));

    if !view.identical.is_empty() {
        out.push_str(&format!(
            "Note: goal projection matches baseline for {}\n",
            join_or_none(view.identical.iter().map(|m| m.display_name()))
        ));
    }

    if !view.issues.is_empty() {
        out.push_str(&format!("\nSkipped records ({}):\n", view.issues.len()));
        for issue in &view.issues {
            out.push_str(&format!(
                "- {}[{}]: {}\n",
                issue.source.display_name(),
                issue.index,
                issue.message
            ));
        }
    }

    out
}

/// Format the visible rows, one column per visible `(metric, source)`.
pub fn format_table(table: &MergedTable, selection: &Selection) -> String {
    let fields: Vec<(Metric, Source)> = selection.fields().collect();
    let mut out = String::new();

    let mut header = format!("{:<8}", table.frequency.axis_label().to_lowercase());
    let mut rule = format!("{:-<8}", "");
    for (metric, source) in &fields {
        let name = format!("{} ({})", metric.display_name(), source.display_name());
        header.push_str(&format!(" {:>20}", truncate(&name, 20)));
        rule.push_str(&format!(" {:-<20}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(rule.trim_end());
    out.push('\n');

    for row in &table.rows {
        let mut line = format!("{:<8}", row.label.to_string());
        for (metric, source) in &fields {
            line.push_str(&format!(" {:>20}", fmt_value(row.value(*metric, *source))));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn fmt_range(range: DisplayRange) -> String {
    match range {
        DisplayRange::Auto => "auto".to_string(),
        DisplayRange::Bounds { lower, upper } => format!("[{}, {}]", fmt_number(lower), fmt_number(upper)),
    }
}

fn fmt_value(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => fmt_number(v),
        _ => "-".to_string(),
    }
}

/// Thousands-grouped number; whole values print without decimals.
pub fn fmt_number(v: f64) -> String {
    let text = if v.fract() == 0.0 { format!("{v:.0}") } else { format!("{v:.2}") };
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

fn join_or_none<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.collect();
    if names.is_empty() { "(none)".to_string() } else { names.join(", ") }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

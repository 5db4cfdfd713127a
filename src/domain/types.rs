//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - deserialized straight from the uploaded JSON payloads
//! - passed through the alignment engine without copies of shape-specific data
//! - exported to JSON/CSV and reloaded later for plotting

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::PeriodLabel;
use crate::error::LabelError;

/// Granularity of a series. Determines label format and ordering rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// X-axis caption for this granularity.
    pub fn axis_label(self) -> &'static str {
        match self {
            Frequency::Monthly => "Month",
            Frequency::Quarterly => "Quarter",
            Frequency::Annual => "Year",
        }
    }
}

/// The closed set of financial metrics carried by every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[value(name = "revenue")]
    Revenue,
    #[value(name = "net_profit")]
    NetProfit,
    #[value(name = "gross_profit")]
    GrossProfit,
    #[value(name = "expenses")]
    Expenses,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Revenue, Metric::NetProfit, Metric::GrossProfit, Metric::Expenses];
    pub const COUNT: usize = Self::ALL.len();

    /// JSON field name.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::NetProfit => "net_profit",
            Metric::GrossProfit => "gross_profit",
            Metric::Expenses => "expenses",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue",
            Metric::NetProfit => "Net Profit",
            Metric::GrossProfit => "Gross Profit",
            Metric::Expenses => "Expenses",
        }
    }

    /// Series colour, shared by every source of the metric.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Metric::Revenue => (0x7a, 0xa2, 0xf7),
            Metric::NetProfit => (0x80, 0xcb, 0xc4),
            Metric::GrossProfit => (0xff, 0xb8, 0x6c),
            Metric::Expenses => (0xef, 0x53, 0x50),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Metric::Revenue => 0,
            Metric::NetProfit => 1,
            Metric::GrossProfit => 2,
            Metric::Expenses => 3,
        }
    }

    /// Lowercase plot glyph.
    pub fn glyph(self) -> char {
        match self {
            Metric::Revenue => 'r',
            Metric::NetProfit => 'n',
            Metric::GrossProfit => 'g',
            Metric::Expenses => 'e',
        }
    }
}

/// Where a value in a merged row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Historical,
    Baseline,
    Goal,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Historical, Source::Baseline, Source::Goal];

    /// Suffix used for flat record fields (`revenue_hist`, `revenue_proj`, ...).
    pub fn suffix(self) -> &'static str {
        match self {
            Source::Historical => "hist",
            Source::Baseline => "proj",
            Source::Goal => "goal",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Source::Historical => "Old",
            Source::Baseline => "Proj",
            Source::Goal => "Goal",
        }
    }

    /// Plot glyph for a metric drawn from this source.
    pub fn glyph(self, metric: Metric) -> char {
        match self {
            Source::Historical => metric.glyph().to_ascii_uppercase(),
            Source::Baseline => metric.glyph(),
            Source::Goal => '*',
        }
    }
}

/// Which sources are currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFlags {
    pub historical: bool,
    pub baseline: bool,
    pub goal: bool,
}

impl SourceFlags {
    pub fn all() -> Self {
        Self {
            historical: true,
            baseline: true,
            goal: true,
        }
    }

    pub fn contains(&self, source: Source) -> bool {
        match source {
            Source::Historical => self.historical,
            Source::Baseline => self.baseline,
            Source::Goal => self.goal,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Source> + '_ {
        Source::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

/// Dataset toggle: which groups of sources are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShowMode {
    /// Historical only.
    Old,
    /// Projections only (baseline + goal).
    Proj,
    /// Everything.
    Both,
}

impl ShowMode {
    pub fn flags(self, include_goal: bool) -> SourceFlags {
        let (historical, projections) = match self {
            ShowMode::Old => (true, false),
            ShowMode::Proj => (false, true),
            ShowMode::Both => (true, true),
        };
        SourceFlags {
            historical,
            baseline: projections,
            goal: projections && include_goal,
        }
    }

    pub fn next(self) -> Self {
        match self {
            ShowMode::Old => ShowMode::Proj,
            ShowMode::Proj => ShowMode::Both,
            ShowMode::Both => ShowMode::Old,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ShowMode::Old => "Old only",
            ShowMode::Proj => "Projections only",
            ShowMode::Both => "Both",
        }
    }
}

/// How the goal-based series is derived for a timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalPolicy {
    /// No goal series for this view.
    None,
    /// The whole goal series.
    All,
    /// The first `n` chronologically sorted goal entries.
    First(usize),
}

/// User-selectable horizon/frequency combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    #[value(name = "one_year_monthly")]
    OneYearMonthly,
    #[value(name = "three_years_monthly")]
    ThreeYearsMonthly,
    #[value(name = "five_years_quarterly")]
    FiveYearsQuarterly,
    #[value(name = "ten_years_annual")]
    TenYearsAnnual,
    #[value(name = "fifteen_years_annual")]
    FifteenYearsAnnual,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::OneYearMonthly,
        Timeframe::ThreeYearsMonthly,
        Timeframe::FiveYearsQuarterly,
        Timeframe::TenYearsAnnual,
        Timeframe::FifteenYearsAnnual,
    ];

    /// Key inside `projections_data`.
    pub fn key(self) -> &'static str {
        match self {
            Timeframe::OneYearMonthly => "one_year_monthly",
            Timeframe::ThreeYearsMonthly => "three_years_monthly",
            Timeframe::FiveYearsQuarterly => "five_years_quarterly",
            Timeframe::TenYearsAnnual => "ten_years_annual",
            Timeframe::FifteenYearsAnnual => "fifteen_years_annual",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Timeframe::OneYearMonthly => "1 Year (Monthly)",
            Timeframe::ThreeYearsMonthly => "3 Years (Monthly)",
            Timeframe::FiveYearsQuarterly => "5 Years (Quarterly)",
            Timeframe::TenYearsAnnual => "10 Years (Annual)",
            Timeframe::FifteenYearsAnnual => "15 Years (Annual)",
        }
    }

    pub fn frequency(self) -> Frequency {
        match self {
            Timeframe::OneYearMonthly | Timeframe::ThreeYearsMonthly => Frequency::Monthly,
            Timeframe::FiveYearsQuarterly => Frequency::Quarterly,
            Timeframe::TenYearsAnnual | Timeframe::FifteenYearsAnnual => Frequency::Annual,
        }
    }

    /// Fixed business rule: only the 1y and 3y monthly views compare against
    /// the goal-based series, and the 1y view keeps its first twelve months.
    pub fn goal_policy(self) -> GoalPolicy {
        match self {
            Timeframe::OneYearMonthly => GoalPolicy::First(12),
            Timeframe::ThreeYearsMonthly => GoalPolicy::All,
            _ => GoalPolicy::None,
        }
    }

    pub fn has_goal(self) -> bool {
        self.goal_policy() != GoalPolicy::None
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// One value per metric; `None` is an explicit absence, distinct from zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricValues {
    values: [Option<f64>; Metric::COUNT],
}

impl MetricValues {
    /// Every metric present with value 0 (an empty sum).
    pub fn zeroed() -> Self {
        Self {
            values: [Some(0.0); Metric::COUNT],
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        self.values[metric.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        Metric::ALL.into_iter().map(|m| (m, self.get(m)))
    }
}

/// Metric fields as they appear in uploaded records (all optional).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub net_profit: Option<f64>,
    #[serde(default)]
    pub gross_profit: Option<f64>,
    #[serde(default)]
    pub expenses: Option<f64>,
}

impl RawMetrics {
    pub fn to_values(&self) -> MetricValues {
        let mut values = MetricValues::default();
        values.set(Metric::Revenue, self.revenue);
        values.set(Metric::NetProfit, self.net_profit);
        values.set(Metric::GrossProfit, self.gross_profit);
        values.set(Metric::Expenses, self.expenses);
        values
    }
}

/// One raw monthly record from `old_data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(flatten)]
    pub metrics: RawMetrics,
}

/// `year` appears as an integer in engine output, but hand-edited files use strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearToken {
    Number(i64),
    Text(String),
}

/// One raw projection record at the source's native frequency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<YearToken>,
    #[serde(flatten)]
    pub metrics: RawMetrics,
}

/// The period-identifying field of a projection record, resolved once.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionPeriod<'a> {
    Month(&'a str),
    Quarter(&'a str),
    Year(&'a YearToken),
}

impl ProjectionRecord {
    /// Month wins over quarter, quarter over year. Empty strings count as absent.
    pub fn period(&self) -> Option<ProjectionPeriod<'_>> {
        if let Some(m) = self.month.as_deref().filter(|s| !s.trim().is_empty()) {
            return Some(ProjectionPeriod::Month(m));
        }
        if let Some(q) = self.quarter.as_deref().filter(|s| !s.trim().is_empty()) {
            return Some(ProjectionPeriod::Quarter(q));
        }
        self.year.as_ref().map(ProjectionPeriod::Year)
    }

    /// Frequency implied by which field is present; anything else reads as annual.
    pub fn frequency_hint(&self) -> Frequency {
        match self.period() {
            Some(ProjectionPeriod::Month(_)) => Frequency::Monthly,
            Some(ProjectionPeriod::Quarter(_)) => Frequency::Quarterly,
            _ => Frequency::Annual,
        }
    }
}

impl ProjectionPeriod<'_> {
    pub fn label(&self) -> Result<PeriodLabel, LabelError> {
        match self {
            ProjectionPeriod::Month(s) => PeriodLabel::parse_month(s),
            ProjectionPeriod::Quarter(s) => PeriodLabel::parse_quarter(s),
            ProjectionPeriod::Year(YearToken::Number(y)) => PeriodLabel::from_year(*y),
            ProjectionPeriod::Year(YearToken::Text(s)) => PeriodLabel::parse_year(s),
        }
    }
}

/// All projection arrays from a `projections.json` payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionSet {
    /// `projections_data`, keyed by timeframe key.
    pub projections: BTreeMap<String, Vec<ProjectionRecord>>,
    /// `goal_based_projections.three_years_monthly`.
    pub goal_three_years_monthly: Vec<ProjectionRecord>,
}

impl ProjectionSet {
    pub fn baseline_for(&self, timeframe: Timeframe) -> &[ProjectionRecord] {
        self.projections.get(timeframe.key()).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One normalized period of a source.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: PeriodLabel,
    pub values: MetricValues,
}

/// Normalized series: unique labels, strictly ascending, single frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSeries {
    pub frequency: Frequency,
    pub points: Vec<SeriesPoint>,
}

impl SourceSeries {
    pub fn empty(frequency: Frequency) -> Self {
        Self {
            frequency,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Comparison fields between baseline and goal for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub span: f64,
    pub delta: f64,
}

/// One row of the aligned table.
///
/// A source slot is `None` when that source has no record for the label; a
/// present slot may still hold absent metric values.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub label: PeriodLabel,
    pub historical: Option<MetricValues>,
    pub baseline: Option<MetricValues>,
    pub goal: Option<MetricValues>,
    pub bands: [Option<Band>; Metric::COUNT],
}

impl MergedRow {
    pub fn new(label: PeriodLabel) -> Self {
        Self {
            label,
            historical: None,
            baseline: None,
            goal: None,
            bands: [None; Metric::COUNT],
        }
    }

    pub fn source(&self, source: Source) -> Option<&MetricValues> {
        match source {
            Source::Historical => self.historical.as_ref(),
            Source::Baseline => self.baseline.as_ref(),
            Source::Goal => self.goal.as_ref(),
        }
    }

    pub fn source_mut(&mut self, source: Source) -> &mut Option<MetricValues> {
        match source {
            Source::Historical => &mut self.historical,
            Source::Baseline => &mut self.baseline,
            Source::Goal => &mut self.goal,
        }
    }

    pub fn value(&self, metric: Metric, source: Source) -> Option<f64> {
        self.source(source).and_then(|v| v.get(metric))
    }

    pub fn band(&self, metric: Metric) -> Option<Band> {
        self.bands[metric.index()]
    }

    /// Chart-ready flat object: `label`, `<metric>_<source>` for each source
    /// that has the label, and the three derived fields for every metric.
    pub fn to_flat_record(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("label".to_string(), Value::String(self.label.to_string()));
        for source in Source::ALL {
            let Some(values) = self.source(source) else { continue };
            for (metric, v) in values.iter() {
                out.insert(format!("{}_{}", metric.key(), source.suffix()), number_or_null(v));
            }
        }
        for metric in Metric::ALL {
            let band = self.band(metric);
            out.insert(format!("{}_band_min", metric.key()), number_or_null(band.map(|b| b.min)));
            out.insert(format!("{}_band_span", metric.key()), number_or_null(band.map(|b| b.span)));
            out.insert(format!("{}_delta", metric.key()), number_or_null(band.map(|b| b.delta)));
        }
        out
    }
}

fn number_or_null(v: Option<f64>) -> Value {
    v.and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Rows sorted ascending by label under `frequency`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    pub frequency: Frequency,
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn empty(frequency: Frequency) -> Self {
        Self {
            frequency,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Y-axis range for rendering. `Auto` leaves scaling to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplayRange {
    Auto,
    Bounds { lower: f64, upper: f64 },
}

impl DisplayRange {
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match *self {
            DisplayRange::Auto => None,
            DisplayRange::Bounds { lower, upper } => Some((lower, upper)),
        }
    }
}

/// A record rejected during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordIssue {
    pub source: Source,
    /// Position in the uploaded array.
    pub index: usize,
    pub message: String,
}

/// Visible metrics and sources for one computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub metrics: Vec<Metric>,
    pub sources: SourceFlags,
}

impl Selection {
    pub fn all() -> Self {
        Self {
            metrics: Metric::ALL.to_vec(),
            sources: SourceFlags::all(),
        }
    }

    pub fn shows_metric(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    /// Toggle a metric while keeping the canonical metric order.
    pub fn toggle_metric(&mut self, metric: Metric) {
        if self.shows_metric(metric) {
            self.metrics.retain(|m| *m != metric);
        } else {
            self.metrics.push(metric);
            self.metrics.sort();
        }
    }

    /// Visible `(metric, source)` fields in display order.
    pub fn fields(&self) -> impl Iterator<Item = (Metric, Source)> + '_ {
        self.sources
            .iter()
            .flat_map(move |s| self.metrics.iter().map(move |m| (*m, s)))
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub data_path: PathBuf,
    pub projections_path: PathBuf,
    pub timeframe: Timeframe,
    pub show: ShowMode,
    pub include_goal: bool,
    pub metrics: Vec<Metric>,

    pub table: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_view: Option<PathBuf>,
}

impl ViewConfig {
    pub fn selection(&self) -> Selection {
        let mut metrics = self.metrics.clone();
        metrics.sort();
        metrics.dedup();
        Selection {
            metrics,
            sources: self.show.flags(self.include_goal),
        }
    }
}

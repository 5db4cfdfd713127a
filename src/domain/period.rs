//! Period labels and their ordering.
//!
//! Three label formats exist, one per `Frequency`:
//!
//! - monthly: `YYYY-MM`
//! - quarterly: `YYYY-Qn` (n = floor((month - 1) / 3) + 1)
//! - annual: `YYYY`
//!
//! Labels are parsed once into `PeriodLabel`, so ordering is numeric on
//! `(year, sub-period)` and never depends on string comparison.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::domain::Frequency;
use crate::error::LabelError;

const MAX_YEAR: i64 = 9999;

/// A parsed period label.
///
/// The derived `Ord` is `(year, sub-period)` within a variant. Labels of
/// different frequencies are never compared by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodLabel {
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
    Year(i32),
}

impl PeriodLabel {
    /// Parse a label in the format of `freq`.
    pub fn parse(s: &str, freq: Frequency) -> Result<Self, LabelError> {
        match freq {
            Frequency::Monthly => Self::parse_month(s),
            Frequency::Quarterly => Self::parse_quarter(s),
            Frequency::Annual => Self::parse_year(s),
        }
    }

    pub fn parse_month(s: &str) -> Result<Self, LabelError> {
        let invalid = || LabelError::InvalidMonth(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = parse_digits::<i32>(y, 4).ok_or_else(invalid)?;
        let month = parse_digits::<u32>(m, 2).ok_or_else(invalid)?;
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        Ok(PeriodLabel::Month { year, month })
    }

    pub fn parse_quarter(s: &str) -> Result<Self, LabelError> {
        let invalid = || LabelError::InvalidQuarter(s.to_string());
        let (y, q) = s.trim().split_once("-Q").ok_or_else(invalid)?;
        let year = parse_digits::<i32>(y, 4).ok_or_else(invalid)?;
        let quarter = parse_digits::<u32>(q, 1).ok_or_else(invalid)?;
        if !(1..=4).contains(&quarter) {
            return Err(invalid());
        }
        Ok(PeriodLabel::Quarter { year, quarter })
    }

    pub fn parse_year(s: &str) -> Result<Self, LabelError> {
        let year = parse_digits::<i32>(s.trim(), 4).ok_or_else(|| LabelError::InvalidYear(s.to_string()))?;
        Self::from_year(i64::from(year))
    }

    /// Annual label from an integer year (as found in `{"year": 2024}` records).
    ///
    /// Same range as the text parsers: at most four digits, so every label
    /// this produces parses back.
    pub fn from_year(year: i64) -> Result<Self, LabelError> {
        if !(0..=MAX_YEAR).contains(&year) {
            return Err(LabelError::InvalidYear(year.to_string()));
        }
        Ok(PeriodLabel::Year(year as i32))
    }

    pub fn frequency(&self) -> Frequency {
        match self {
            PeriodLabel::Month { .. } => Frequency::Monthly,
            PeriodLabel::Quarter { .. } => Frequency::Quarterly,
            PeriodLabel::Year(_) => Frequency::Annual,
        }
    }

    pub fn year(&self) -> i32 {
        match *self {
            PeriodLabel::Month { year, .. } | PeriodLabel::Quarter { year, .. } | PeriodLabel::Year(year) => year,
        }
    }

    /// Quarter containing a monthly label. `None` for non-monthly labels.
    pub fn to_quarter(&self) -> Option<PeriodLabel> {
        match *self {
            PeriodLabel::Month { year, month } => Some(PeriodLabel::Quarter {
                year,
                quarter: (month - 1) / 3 + 1,
            }),
            _ => None,
        }
    }

    /// Year containing this label.
    pub fn to_year(&self) -> PeriodLabel {
        PeriodLabel::Year(self.year())
    }

    /// Bucket a monthly label into `freq`. `None` when the label is not monthly.
    pub fn bucket(&self, freq: Frequency) -> Option<PeriodLabel> {
        if self.frequency() != Frequency::Monthly {
            return None;
        }
        match freq {
            Frequency::Monthly => Some(*self),
            Frequency::Quarterly => self.to_quarter(),
            Frequency::Annual => Some(self.to_year()),
        }
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodLabel::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            PeriodLabel::Quarter { year, quarter } => write!(f, "{year:04}-Q{quarter}"),
            PeriodLabel::Year(year) => write!(f, "{year:04}"),
        }
    }
}

impl Serialize for PeriodLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `"YYYY-MM"` -> `"YYYY-Qn"`.
pub fn to_quarter_label(month: &str) -> Result<String, LabelError> {
    let label = PeriodLabel::parse_month(month)?;
    // parse_month only yields monthly labels
    Ok(label.to_quarter().unwrap_or(label).to_string())
}

/// `"YYYY-MM"` -> `"YYYY"`.
pub fn to_year_label(month: &str) -> Result<String, LabelError> {
    Ok(PeriodLabel::parse_month(month)?.to_year().to_string())
}

/// Compare two labels of frequency `freq` by `(year, sub-period)`.
pub fn compare(a: &str, b: &str, freq: Frequency) -> Result<Ordering, LabelError> {
    let a = PeriodLabel::parse(a, freq)?;
    let b = PeriodLabel::parse(b, freq)?;
    Ok(a.cmp(&b))
}

/// Parse an unsigned run of ASCII digits, at most `max_len` long.
fn parse_digits<T: std::str::FromStr>(s: &str, max_len: usize) -> Option<T> {
    if s.is_empty() || s.len() > max_len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

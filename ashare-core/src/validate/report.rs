//! Fixed-shape validation results.
//!
//! Every check produces a `CheckResult<T>`: a validity flag plus an ordered
//! findings list, instead of an open-ended map. The report carries the raw
//! findings for caller inspection independently of the numeric score.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::StockCode;

/// Outcome of one named check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult<T> {
    pub valid: bool,
    pub findings: Vec<T>,
}

impl<T> CheckResult<T> {
    /// Passing check with no findings.
    pub fn clean() -> Self {
        Self {
            valid: true,
            findings: Vec::new(),
        }
    }

    /// Valid iff the findings list is empty.
    pub fn from_findings(findings: Vec<T>) -> Self {
        Self {
            valid: findings.is_empty(),
            findings,
        }
    }

    /// Failing check regardless of findings count.
    pub fn invalid(findings: Vec<T>) -> Self {
        Self {
            valid: false,
            findings,
        }
    }
}

/// Price field named in a structural finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

/// Structural defects: missing data or non-numeric-representable prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructuralFinding {
    /// The series has zero rows.
    EmptySeries,
    /// A price field is non-finite or not strictly positive.
    InvalidPrice {
        date: NaiveDate,
        field: PriceField,
        value: f64,
    },
}

/// Row-level consistency defects. Gating only — no score weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsistencyFinding {
    /// High/low do not bound open/close.
    PriceOrdering { date: NaiveDate },
    /// A price field is exactly zero.
    ZeroPrice { date: NaiveDate },
    /// More than one row carries this date; only the first is kept.
    DuplicateDate { date: NaiveDate },
}

/// A daily move beyond the applicable price limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLimitViolation {
    pub date: NaiveDate,
    pub close: f64,
    pub prev_close: f64,
    pub change_pct: f64,
    pub limit_rate: f64,
}

/// An expected trading session with no row in the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionDay {
    pub date: NaiveDate,
}

/// Category of a volume anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeAnomalyKind {
    /// Nonzero volume below 10% of the trailing rolling mean.
    LowVolume,
    /// Exactly zero volume.
    ZeroVolume,
    /// Volume above the rolling mean plus three standard deviations.
    HighVolume,
}

/// One volume-anomaly category and the rows that triggered it.
///
/// The deduction unit is the category, not the row count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAnomaly {
    pub kind: VolumeAnomalyKind,
    pub count: usize,
    pub dates: Vec<NaiveDate>,
}

/// A run of chronologically contiguous missing sessions. A single missing
/// day is a gap of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: usize,
}

/// Descriptive statistics over the validated series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub rows: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub min_close: f64,
    pub max_close: f64,
    pub mean_close: f64,
    pub min_volume: u64,
    pub max_volume: u64,
    pub mean_volume: f64,
    /// Sample standard deviation of daily returns, annualized by √252.
    pub annualized_volatility: f64,
    /// Expected sessions in the data's own date range minus actual rows.
    pub missing_trading_days: usize,
}

/// Full validation report for one code over one requested range.
///
/// Created fresh per call; carries no history and is never mutated after
/// return. `overall_score` is always within [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub symbol: StockCode,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub structural: CheckResult<StructuralFinding>,
    pub consistency: CheckResult<ConsistencyFinding>,
    pub price_limit: CheckResult<PriceLimitViolation>,
    pub suspension: CheckResult<SuspensionDay>,
    pub volume: CheckResult<VolumeAnomaly>,
    pub continuity: CheckResult<Gap>,
    pub summary: Option<SeriesSummary>,
    /// Structural and consistency checks both pass.
    pub basic_valid: bool,
    pub overall_score: f64,
}

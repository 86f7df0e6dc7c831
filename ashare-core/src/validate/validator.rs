//! DataValidator — the five-check scoring pipeline.
//!
//! Checks run independently and fold into one aggregate score:
//!
//! | check       | deduction              | cap |
//! |-------------|------------------------|-----|
//! | structural  | flat 20 when invalid   | 20  |
//! | price limit | 5 per violating row    | 30  |
//! | suspension  | 2 per missing session  | 20  |
//! | volume      | 3 per anomaly category | 15  |
//! | continuity  | 3 per gap              | 15  |
//!
//! An empty series forces the score to 0. Consistency findings gate
//! `basic_valid` but carry no score weight. The validator does not assume
//! incoming row order — it sorts and de-duplicates defensively.

use chrono::{Duration, NaiveDate};

use super::report::{
    CheckResult, ConsistencyFinding, Gap, PriceField, PriceLimitViolation, SeriesSummary,
    StructuralFinding, SuspensionDay, ValidationReport, VolumeAnomaly, VolumeAnomalyKind,
};
use crate::calendar::{CalendarError, TradingCalendar};
use crate::domain::code::{NEW_LISTING_LIMIT_RATE, ST_LIMIT_RATE};
use crate::domain::{DailyBar, StockCode};

/// Tolerance added to the limit rate before a move counts as a violation.
pub const PRICE_LIMIT_EPSILON: f64 = 0.001;

const VOLUME_WINDOW: usize = 20;
const LOW_VOLUME_FRACTION: f64 = 0.1;
const HIGH_VOLUME_SIGMAS: f64 = 3.0;

const STRUCTURAL_DEDUCTION: f64 = 20.0;
const PRICE_LIMIT_UNIT: f64 = 5.0;
const PRICE_LIMIT_CAP: f64 = 30.0;
const SUSPENSION_UNIT: f64 = 2.0;
const SUSPENSION_CAP: f64 = 20.0;
const VOLUME_UNIT: f64 = 3.0;
const VOLUME_CAP: f64 = 15.0;
const GAP_UNIT: f64 = 3.0;
const GAP_CAP: f64 = 15.0;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Per-call overrides for the applicable price limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// ST (special treatment) share: 5% limit.
    pub st: bool,
    /// Within the first five sessions after listing: 44% limit. Takes
    /// precedence over the ST rate.
    pub newly_listed: bool,
}

impl ValidationOptions {
    /// The limit rate in effect for this code under these options.
    pub fn limit_rate(&self, code: &StockCode) -> f64 {
        if self.newly_listed {
            NEW_LISTING_LIMIT_RATE
        } else if self.st {
            ST_LIMIT_RATE
        } else {
            code.board().limit_rate()
        }
    }
}

/// Stateless validator over an OHLCV series.
#[derive(Debug, Default)]
pub struct DataValidator;

impl DataValidator {
    pub fn new() -> Self {
        Self
    }

    /// Run all checks and fold them into a report.
    ///
    /// The only hard error is an inverted requested range, surfaced by the
    /// calendar; data-quality issues are findings, never errors.
    pub fn report(
        &self,
        calendar: &mut TradingCalendar,
        code: &StockCode,
        bars: &[DailyBar],
        start: NaiveDate,
        end: NaiveDate,
        options: &ValidationOptions,
    ) -> Result<ValidationReport, CalendarError> {
        let expected = calendar.trading_days_between(start, end)?;

        let (series, duplicates) = normalize_series(bars);

        let structural = self.check_structural(&series);
        let mut consistency_findings = duplicates;
        consistency_findings.extend(self.check_consistency(&series).findings);
        let consistency = CheckResult::from_findings(consistency_findings);

        let price_limit = self.check_price_limit(&series, options.limit_rate(code));
        let suspension = self.check_suspensions(&series, &expected);
        let volume = self.check_volume(&series);

        let missing: Vec<NaiveDate> = suspension.findings.iter().map(|s| s.date).collect();
        let continuity = self.check_continuity(&missing);

        let summary = self.summarize(calendar, &series)?;

        let overall_score = overall_score(
            series.is_empty(),
            &structural,
            &price_limit,
            &suspension,
            &volume,
            &continuity,
        );
        let basic_valid = structural.valid && consistency.valid;

        Ok(ValidationReport {
            symbol: code.clone(),
            start,
            end,
            structural,
            consistency,
            price_limit,
            suspension,
            volume,
            continuity,
            summary,
            basic_valid,
            overall_score,
        })
    }

    /// Structural check: the series has rows and every price is a usable
    /// number.
    pub fn check_structural(&self, series: &[DailyBar]) -> CheckResult<StructuralFinding> {
        if series.is_empty() {
            return CheckResult::invalid(vec![StructuralFinding::EmptySeries]);
        }

        let mut findings = Vec::new();
        for bar in series {
            for (field, value) in [
                (PriceField::Open, bar.open),
                (PriceField::High, bar.high),
                (PriceField::Low, bar.low),
                (PriceField::Close, bar.close),
            ] {
                if !value.is_finite() || value <= 0.0 {
                    findings.push(StructuralFinding::InvalidPrice {
                        date: bar.date,
                        field,
                        value,
                    });
                }
            }
        }
        CheckResult::from_findings(findings)
    }

    /// Row-level consistency: OHLC ordering and zero prices.
    pub fn check_consistency(&self, series: &[DailyBar]) -> CheckResult<ConsistencyFinding> {
        let mut findings = Vec::new();
        for bar in series {
            if bar.has_zero_price() {
                findings.push(ConsistencyFinding::ZeroPrice { date: bar.date });
            }
            let ordering_broken = bar.high < bar.open
                || bar.high < bar.close
                || bar.high < bar.low
                || bar.low > bar.open
                || bar.low > bar.close;
            if ordering_broken {
                findings.push(ConsistencyFinding::PriceOrdering { date: bar.date });
            }
        }
        CheckResult::from_findings(findings)
    }

    /// Rows whose close-to-close move exceeds the limit rate plus epsilon.
    pub fn check_price_limit(
        &self,
        series: &[DailyBar],
        limit_rate: f64,
    ) -> CheckResult<PriceLimitViolation> {
        let mut findings = Vec::new();
        for window in series.windows(2) {
            let prev_close = window[0].close;
            let bar = &window[1];
            if !prev_close.is_finite() || prev_close <= 0.0 {
                continue;
            }
            let change_pct = bar.change_pct(prev_close);
            if change_pct.abs() > limit_rate + PRICE_LIMIT_EPSILON {
                findings.push(PriceLimitViolation {
                    date: bar.date,
                    close: bar.close,
                    prev_close,
                    change_pct,
                    limit_rate,
                });
            }
        }
        CheckResult::from_findings(findings)
    }

    /// Expected sessions with no row — suspension candidates.
    pub fn check_suspensions(
        &self,
        series: &[DailyBar],
        expected: &[NaiveDate],
    ) -> CheckResult<SuspensionDay> {
        if series.is_empty() {
            return CheckResult::clean();
        }

        let findings = expected
            .iter()
            .copied()
            .filter(|day| series.binary_search_by(|b| b.date.cmp(day)).is_err())
            .map(|date| SuspensionDay { date })
            .collect();
        CheckResult::from_findings(findings)
    }

    /// Volume anomalies over a trailing 20-row window.
    ///
    /// Three categories: nonzero volume below 10% of the rolling mean,
    /// exactly zero volume, and volume above mean + 3σ. Rolling checks
    /// need more than one full window of rows; zero volume is flagged
    /// regardless of series length.
    pub fn check_volume(&self, series: &[DailyBar]) -> CheckResult<VolumeAnomaly> {
        let mut low_dates = Vec::new();
        let mut zero_dates = Vec::new();
        let mut high_dates = Vec::new();

        for bar in series {
            if bar.volume == 0 {
                zero_dates.push(bar.date);
            }
        }

        if series.len() > VOLUME_WINDOW {
            for i in (VOLUME_WINDOW - 1)..series.len() {
                let window: Vec<f64> = series[i + 1 - VOLUME_WINDOW..=i]
                    .iter()
                    .map(|b| b.volume as f64)
                    .collect();
                let avg = mean(&window);
                let std = sample_std(&window, avg);
                let volume = series[i].volume as f64;

                if volume > 0.0 && volume < avg * LOW_VOLUME_FRACTION {
                    low_dates.push(series[i].date);
                }
                if volume > avg + HIGH_VOLUME_SIGMAS * std {
                    high_dates.push(series[i].date);
                }
            }
        }

        let mut findings = Vec::new();
        for (kind, dates) in [
            (VolumeAnomalyKind::LowVolume, low_dates),
            (VolumeAnomalyKind::ZeroVolume, zero_dates),
            (VolumeAnomalyKind::HighVolume, high_dates),
        ] {
            if !dates.is_empty() {
                findings.push(VolumeAnomaly {
                    kind,
                    count: dates.len(),
                    dates,
                });
            }
        }
        CheckResult::from_findings(findings)
    }

    /// Group missing sessions into chronologically contiguous gaps.
    pub fn check_continuity(&self, missing: &[NaiveDate]) -> CheckResult<Gap> {
        let mut gaps = Vec::new();
        let mut run: Option<(NaiveDate, NaiveDate)> = None;

        for &date in missing {
            match run {
                Some((start, end)) if date - end == Duration::days(1) => {
                    run = Some((start, date));
                }
                Some((start, end)) => {
                    gaps.push(make_gap(start, end));
                    run = Some((date, date));
                }
                None => run = Some((date, date)),
            }
        }
        if let Some((start, end)) = run {
            gaps.push(make_gap(start, end));
        }

        CheckResult::from_findings(gaps)
    }

    /// Descriptive statistics; `None` for an empty series.
    fn summarize(
        &self,
        calendar: &mut TradingCalendar,
        series: &[DailyBar],
    ) -> Result<Option<SeriesSummary>, CalendarError> {
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Ok(None);
        };

        let closes: Vec<f64> = series.iter().map(|b| b.close).collect();
        let volumes: Vec<u64> = series.iter().map(|b| b.volume).collect();

        let returns: Vec<f64> = series
            .windows(2)
            .filter(|w| w[0].close.is_finite() && w[0].close > 0.0)
            .map(|w| w[1].change_pct(w[0].close))
            .collect();
        let ret_mean = mean(&returns);
        let annualized_volatility = sample_std(&returns, ret_mean) * TRADING_DAYS_PER_YEAR.sqrt();

        let expected = calendar.count_trading_days(first.date, last.date)?;
        let missing_trading_days = expected.saturating_sub(series.len());

        Ok(Some(SeriesSummary {
            rows: series.len(),
            start: first.date,
            end: last.date,
            min_close: closes.iter().copied().fold(f64::INFINITY, f64::min),
            max_close: closes.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean_close: mean(&closes),
            min_volume: volumes.iter().copied().min().unwrap_or(0),
            max_volume: volumes.iter().copied().max().unwrap_or(0),
            mean_volume: mean(&volumes.iter().map(|v| *v as f64).collect::<Vec<_>>()),
            annualized_volatility,
            missing_trading_days,
        }))
    }
}

/// Sort ascending and drop repeated dates (first row wins), recording each
/// dropped date.
fn normalize_series(bars: &[DailyBar]) -> (Vec<DailyBar>, Vec<ConsistencyFinding>) {
    let mut series = bars.to_vec();
    series.sort_by_key(|b| b.date);

    let mut duplicates = Vec::new();
    series.dedup_by(|next, kept| {
        if next.date == kept.date {
            duplicates.push(ConsistencyFinding::DuplicateDate { date: next.date });
            true
        } else {
            false
        }
    });

    (series, duplicates)
}

fn make_gap(start: NaiveDate, end: NaiveDate) -> Gap {
    Gap {
        start,
        end,
        days: (end - start).num_days() as usize + 1,
    }
}

fn overall_score(
    empty: bool,
    structural: &CheckResult<StructuralFinding>,
    price_limit: &CheckResult<PriceLimitViolation>,
    suspension: &CheckResult<SuspensionDay>,
    volume: &CheckResult<VolumeAnomaly>,
    continuity: &CheckResult<Gap>,
) -> f64 {
    if empty {
        return 0.0;
    }

    let mut deductions = 0.0;
    if !structural.valid {
        deductions += STRUCTURAL_DEDUCTION;
    }
    deductions += (price_limit.findings.len() as f64 * PRICE_LIMIT_UNIT).min(PRICE_LIMIT_CAP);
    deductions += (suspension.findings.len() as f64 * SUSPENSION_UNIT).min(SUSPENSION_CAP);
    deductions += (volume.findings.len() as f64 * VOLUME_UNIT).min(VOLUME_CAP);
    deductions += (continuity.findings.len() as f64 * GAP_UNIT).min(GAP_CAP);

    (100.0 - deductions).clamp(0.0, 100.0)
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n − 1 denominator), 0 for fewer than two
/// observations.
fn sample_std(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
}

//! DailyBar — one OHLCV row of an A-share daily series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV row for a single code.
///
/// `amount` is the turnover in CNY when the vendor supplies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    #[serde(default)]
    pub amount: Option<f64>,
}

impl DailyBar {
    /// OHLC ordering and positivity check: high is the ceiling, low the
    /// floor, and every price is finite and strictly positive.
    pub fn is_sane(&self) -> bool {
        self.prices().iter().all(|p| p.is_finite() && *p > 0.0)
            && self.high >= self.open
            && self.high >= self.close
            && self.high >= self.low
            && self.low <= self.open
            && self.low <= self.close
    }

    /// True if any price field is exactly zero.
    pub fn has_zero_price(&self) -> bool {
        self.prices().iter().any(|p| *p == 0.0)
    }

    /// Signed daily change relative to the previous close.
    pub fn change_pct(&self, prev_close: f64) -> f64 {
        (self.close - prev_close) / prev_close
    }

    fn prices(&self) -> [f64; 4] {
        [self.open, self.high, self.low, self.close]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 10.0,
            high: 10.8,
            low: 9.7,
            close: 10.5,
            volume: 1_200_000,
            amount: Some(12_600_000.0),
        }
    }

    #[test]
    fn sane_bar_passes() {
        assert!(sample_bar().is_sane());
        assert!(!sample_bar().has_zero_price());
    }

    #[test]
    fn inverted_high_fails() {
        let mut bar = sample_bar();
        bar.high = 9.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn zero_price_detected() {
        let mut bar = sample_bar();
        bar.open = 0.0;
        assert!(bar.has_zero_price());
        assert!(!bar.is_sane());
    }

    #[test]
    fn change_pct_against_previous_close() {
        let bar = sample_bar();
        let pct = bar.change_pct(10.0);
        assert!((pct - 0.05).abs() < 1e-12);
    }

    #[test]
    fn serde_roundtrip_without_amount() {
        let json = r#"{"date":"2024-01-02","open":10.0,"high":10.8,"low":9.7,"close":10.5,"volume":1200000}"#;
        let bar: DailyBar = serde_json::from_str(json).unwrap();
        assert_eq!(bar.amount, None);
        assert_eq!(bar.volume, 1_200_000);
    }
}

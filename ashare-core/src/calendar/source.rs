//! Calendar source trait and the HTTP implementation.
//!
//! A calendar source answers one question: which dates were exchange
//! sessions in a given year. Sources may fail or return nothing — the
//! calendar recovers with its synthetic fallback, so source errors never
//! propagate past [`super::TradingCalendar`].

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use thiserror::Error;

/// Errors a calendar source can surface. All of them are recoverable at the
/// calendar layer.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("calendar source error: {0}")]
    Other(String),
}

/// Capability interface over an external trading-session feed.
pub trait CalendarSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// All exchange session dates in `year`, in any order.
    fn fetch_trading_sessions(&self, year: i32) -> Result<Vec<NaiveDate>, SourceError>;
}

/// JSON body of the session-feed endpoint: a flat list of ISO dates.
#[derive(Debug, Deserialize)]
struct SessionsResponse {
    trade_dates: Vec<NaiveDate>,
}

/// Blocking HTTP calendar source.
///
/// Expects `GET {base_url}?year={year}` to return
/// `{"trade_dates": ["2024-01-02", ...]}`. Callers wanting retry or timeout
/// policies beyond the built-in 30s request timeout wrap the trait.
pub struct HttpCalendarSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpCalendarSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl CalendarSource for HttpCalendarSource {
    fn name(&self) -> &str {
        "http_calendar"
    }

    fn fetch_trading_sessions(&self, year: i32) -> Result<Vec<NaiveDate>, SourceError> {
        let url = format!("{}?year={year}", self.base_url);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SourceError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Other(format!("HTTP {status} for year {year}")));
        }

        let body: SessionsResponse = resp
            .json()
            .map_err(|e| SourceError::ResponseFormatChanged(e.to_string()))?;

        // The feed returns its full history; keep only the requested year.
        let mut dates: Vec<NaiveDate> = body
            .trade_dates
            .into_iter()
            .filter(|d| d.year() == year)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }
}

//! Data provider trait and structured error types.
//!
//! A provider answers `fetch(code, start, end)` with daily OHLCV rows for
//! one canonical code. Absent rows are an empty result, not an error.
//! Provider selection and fallback live in [`chain::ProviderChain`].

pub mod chain;
pub mod csv;

pub use chain::ProviderChain;
pub use csv::CsvProvider;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{DailyBar, StockCode};

/// Structured error types for row fetches.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("malformed row data: {0}")]
    MalformedRow(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("provider error: {0}")]
    Other(String),
}

/// Result of a fetch for a single code.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub code: StockCode,
    pub bars: Vec<DailyBar>,
    /// Name of the provider that answered, or "none" when every provider
    /// in a chain came up empty.
    pub source: String,
}

impl FetchResult {
    /// Empty result for a code: the "no rows" answer, not a failure.
    pub fn empty(code: StockCode, source: impl Into<String>) -> Self {
        Self {
            code,
            bars: Vec::new(),
            source: source.into(),
        }
    }
}

/// Trait for daily-row providers.
///
/// Implementations handle the specifics of one upstream (CSV directory,
/// vendor HTTP feed, ...). Routing and fallback sit above this trait.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for `code` within `[start, end]`, ascending.
    fn fetch(
        &self,
        code: &StockCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, ProviderError>;

    /// Check if the provider is currently usable.
    fn is_available(&self) -> bool {
        true
    }
}

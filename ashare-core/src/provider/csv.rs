//! CSV directory provider.
//!
//! Reads `{dir}/{CANONICAL}.csv` with `Date,Open,High,Low,Close,Volume`
//! headers (optional `Amount`). A missing file is an empty result — the
//! directory simply has no rows for that code.

use std::path::PathBuf;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;

use super::{DataProvider, FetchResult, ProviderError};
use crate::domain::{DailyBar, StockCode};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: u64,
    #[serde(rename = "Amount", default)]
    amount: Option<f64>,
}

impl From<CsvRow> for DailyBar {
    fn from(row: CsvRow) -> Self {
        DailyBar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            amount: row.amount,
        }
    }
}

/// Provider over a directory of per-code CSV files.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_path(&self, code: &StockCode) -> PathBuf {
        self.dir.join(format!("{}.csv", code.canonical()))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        code: &StockCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, ProviderError> {
        let path = self.file_path(code);
        if !path.exists() {
            return Ok(FetchResult::empty(code.clone(), self.name()));
        }

        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(&path)?;

        let mut bars: Vec<DailyBar> = Vec::new();
        for record in reader.deserialize::<CsvRow>() {
            let row = record.map_err(|e| {
                ProviderError::MalformedRow(format!("{}: {e}", path.display()))
            })?;
            if row.date >= start && row.date <= end {
                bars.push(row.into());
            }
        }

        bars.sort_by_key(|b| b.date);

        Ok(FetchResult {
            code: code.clone(),
            bars,
            source: self.name().to_string(),
        })
    }
}

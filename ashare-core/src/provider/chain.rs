//! Ordered provider fallback.
//!
//! Try the primary provider; on a failure or an empty result, fall through
//! to the next one. If every provider comes up empty the chain answers with
//! an empty result — upstream unavailability is recovered here, never
//! surfaced as a fatal error.

use chrono::NaiveDate;

use super::{DataProvider, FetchResult, ProviderError};
use crate::domain::StockCode;

/// Ordered list of providers tried in sequence.
pub struct ProviderChain {
    providers: Vec<Box<dyn DataProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn DataProvider>>) -> Self {
        Self { providers }
    }

    /// Append a provider at the end of the fallback order.
    pub fn push(&mut self, provider: Box<dyn DataProvider>) {
        self.providers.push(provider);
    }
}

impl DataProvider for ProviderChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn fetch(
        &self,
        code: &StockCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, ProviderError> {
        for provider in &self.providers {
            if !provider.is_available() {
                continue;
            }
            match provider.fetch(code, start, end) {
                Ok(result) if !result.bars.is_empty() => return Ok(result),
                Ok(_) => continue,
                Err(e) => {
                    eprintln!(
                        "WARNING: provider '{}' failed for {code}: {e}",
                        provider.name()
                    );
                    continue;
                }
            }
        }

        Ok(FetchResult::empty(code.clone(), "none"))
    }

    fn is_available(&self) -> bool {
        self.providers.iter().any(|p| p.is_available())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DailyBar;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_bar(d: NaiveDate) -> DailyBar {
        DailyBar {
            date: d,
            open: 10.0,
            high: 10.5,
            low: 9.8,
            close: 10.2,
            volume: 1_000_000,
            amount: None,
        }
    }

    struct FixedProvider {
        name: &'static str,
        bars: Vec<DailyBar>,
    }

    impl DataProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch(
            &self,
            code: &StockCode,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<FetchResult, ProviderError> {
            Ok(FetchResult {
                code: code.clone(),
                bars: self.bars.clone(),
                source: self.name.to_string(),
            })
        }
    }

    struct BrokenProvider;

    impl DataProvider for BrokenProvider {
        fn name(&self) -> &str {
            "broken"
        }

        fn fetch(
            &self,
            _code: &StockCode,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<FetchResult, ProviderError> {
            Err(ProviderError::NetworkUnreachable("connection reset".into()))
        }
    }

    struct OfflineProvider;

    impl DataProvider for OfflineProvider {
        fn name(&self) -> &str {
            "offline"
        }

        fn fetch(
            &self,
            _code: &StockCode,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<FetchResult, ProviderError> {
            panic!("must not be called while unavailable");
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    #[test]
    fn primary_answers_when_it_has_rows() {
        let code = StockCode::parse("600000").unwrap();
        let chain = ProviderChain::new(vec![
            Box::new(FixedProvider {
                name: "primary",
                bars: vec![sample_bar(date(2024, 1, 2))],
            }),
            Box::new(FixedProvider {
                name: "secondary",
                bars: vec![sample_bar(date(2024, 1, 3))],
            }),
        ]);

        let result = chain.fetch(&code, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(result.source, "primary");
    }

    #[test]
    fn empty_primary_falls_through() {
        let code = StockCode::parse("600000").unwrap();
        let chain = ProviderChain::new(vec![
            Box::new(FixedProvider {
                name: "primary",
                bars: vec![],
            }),
            Box::new(FixedProvider {
                name: "secondary",
                bars: vec![sample_bar(date(2024, 1, 2))],
            }),
        ]);

        let result = chain.fetch(&code, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(result.source, "secondary");
    }

    #[test]
    fn failing_primary_falls_through() {
        let code = StockCode::parse("600000").unwrap();
        let chain = ProviderChain::new(vec![
            Box::new(BrokenProvider),
            Box::new(FixedProvider {
                name: "secondary",
                bars: vec![sample_bar(date(2024, 1, 2))],
            }),
        ]);

        let result = chain.fetch(&code, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(result.source, "secondary");
    }

    #[test]
    fn unavailable_provider_is_skipped() {
        let code = StockCode::parse("600000").unwrap();
        let chain = ProviderChain::new(vec![
            Box::new(OfflineProvider),
            Box::new(FixedProvider {
                name: "secondary",
                bars: vec![sample_bar(date(2024, 1, 2))],
            }),
        ]);

        let result = chain.fetch(&code, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(result.source, "secondary");
    }

    #[test]
    fn exhausted_chain_returns_empty_not_error() {
        let code = StockCode::parse("600000").unwrap();
        let chain = ProviderChain::new(vec![Box::new(BrokenProvider)]);

        let result = chain.fetch(&code, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(result.bars.is_empty());
        assert_eq!(result.source, "none");
    }
}

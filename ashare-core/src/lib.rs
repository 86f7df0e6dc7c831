//! A-Share Data Core — code normalization, trading calendar, data quality.
//!
//! This crate makes daily price/volume data from heterogeneous A-share
//! vendors safe to consume uniformly:
//! - Stock-code canonicalization and board classification (`domain`)
//! - Trading-calendar service with snapshot persistence and a synthetic
//!   fallback (`calendar`)
//! - Data providers behind a capability trait with ordered fallback
//!   (`provider`)
//! - Scored, itemized data-quality validation over OHLCV series
//!   (`validate`)
//!
//! All components are synchronous. The only blocking I/O is a calendar
//! refresh (source fetch plus snapshot write); everything else is pure
//! in-memory computation, so every call is independently replayable.

pub mod calendar;
pub mod domain;
pub mod provider;
pub mod validate;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the shared types are Send + Sync, so a calendar
    /// or provider chain can live behind an `RwLock`/`Arc` without retrofit.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::StockCode>();
        require_sync::<domain::StockCode>();
        require_send::<domain::DailyBar>();
        require_sync::<domain::DailyBar>();

        require_send::<calendar::TradingCalendar>();
        require_sync::<calendar::TradingCalendar>();

        require_send::<provider::ProviderChain>();
        require_sync::<provider::ProviderChain>();

        require_send::<validate::ValidationReport>();
        require_sync::<validate::ValidationReport>();
    }
}

//! TradingCalendar — the session-set state machine.
//!
//! Lifecycle: Uninitialized → Populated. Population happens lazily on the
//! first query that needs an uncovered year span, or explicitly through
//! [`TradingCalendar::refresh`]. Once populated, queries answer from the
//! in-memory sorted date list; the calendar never re-fetches on its own.
//!
//! Shared use: every query takes `&mut self`, since any of them may widen
//! the covered span and refresh. Callers sharing one instance across
//! threads put it behind a `Mutex` (or an `RwLock` taken for writing) and
//! let refresh swap the whole date list under the lock — other threads
//! never observe a torn intermediate state.

use std::path::PathBuf;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::snapshot::CalendarSnapshot;
use super::source::CalendarSource;
use super::synthetic::synthetic_year;

/// First year fetched when a refresh is triggered without an explicit span.
pub const DEFAULT_START_YEAR: i32 = 2020;

/// Usage errors for calendar range queries.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// One continuous trading window within a session day, local exchange time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSession {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl TradingSession {
    /// Boundaries inclusive on both ends.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.open <= time && time <= self.close
    }
}

fn morning_session() -> TradingSession {
    TradingSession {
        open: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        close: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
    }
}

fn afternoon_session() -> TradingSession {
    TradingSession {
        open: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        close: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
    }
}

/// The exchange session calendar.
pub struct TradingCalendar {
    source: Box<dyn CalendarSource>,
    snapshot_path: Option<PathBuf>,
    trading_days: Vec<NaiveDate>,
    holidays: Vec<NaiveDate>,
    covered_years: Option<(i32, i32)>,
}

impl TradingCalendar {
    /// Calendar with no persistence.
    pub fn new(source: Box<dyn CalendarSource>) -> Self {
        Self {
            source,
            snapshot_path: None,
            trading_days: Vec::new(),
            holidays: Vec::new(),
            covered_years: None,
        }
    }

    /// Calendar persisted to a snapshot file. If the file exists and
    /// parses, the calendar starts populated from it.
    pub fn with_snapshot(source: Box<dyn CalendarSource>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut calendar = Self::new(source);

        if let Some(snapshot) = CalendarSnapshot::load(&path) {
            let mut days = snapshot.trading_days;
            days.sort_unstable();
            days.dedup();
            if let (Some(first), Some(last)) = (days.first(), days.last()) {
                calendar.covered_years = Some((first.year(), last.year()));
            }
            calendar.holidays = snapshot.holidays;
            calendar.holidays.sort_unstable();
            calendar.holidays.dedup();
            calendar.trading_days = days;
        }

        calendar.snapshot_path = Some(path);
        calendar
    }

    /// Re-fetch the calendar for `start_year..=end_year`, replacing the
    /// in-memory state and the snapshot wholesale.
    ///
    /// Source failures and empty years fall back to the synthetic calendar
    /// for that year; refresh itself is infallible.
    pub fn refresh(&mut self, start_year: i32, end_year: i32) {
        let mut days: Vec<NaiveDate> = Vec::new();

        for year in start_year..=end_year {
            match self.source.fetch_trading_sessions(year) {
                Ok(fetched) if !fetched.is_empty() => {
                    days.extend(fetched.into_iter().filter(|d| d.year() == year));
                }
                Ok(_) => {
                    eprintln!(
                        "WARNING: calendar source '{}' returned no sessions for {year}, \
                         using synthetic fallback",
                        self.source.name()
                    );
                    days.extend(synthetic_year(year));
                }
                Err(e) => {
                    eprintln!(
                        "WARNING: calendar source '{}' failed for {year} ({e}), \
                         using synthetic fallback",
                        self.source.name()
                    );
                    days.extend(synthetic_year(year));
                }
            }
        }

        days.sort_unstable();
        days.dedup();
        self.holidays = complement(&days);
        self.trading_days = days;
        self.covered_years = Some((start_year, end_year));

        if let Some(path) = &self.snapshot_path {
            let snapshot = CalendarSnapshot {
                trading_days: self.trading_days.clone(),
                holidays: self.holidays.clone(),
            };
            if let Err(e) = snapshot.save(path) {
                eprintln!("WARNING: calendar snapshot write failed: {e}");
            }
        }
    }

    /// Refresh over the default span: [`DEFAULT_START_YEAR`] through one
    /// year past the current date.
    pub fn refresh_default(&mut self) {
        let end_year = Local::now().year() + 1;
        self.refresh(DEFAULT_START_YEAR, end_year);
    }

    /// True once a refresh (explicit or lazy) has run.
    pub fn is_populated(&self) -> bool {
        self.covered_years.is_some()
    }

    fn ensure_covers(&mut self, lo_year: i32, hi_year: i32) {
        match self.covered_years {
            Some((a, b)) if a <= lo_year && hi_year <= b => {}
            Some((a, b)) => self.refresh(a.min(lo_year), b.max(hi_year)),
            None => self.refresh(lo_year.min(DEFAULT_START_YEAR), hi_year),
        }
    }

    /// Trading dates within `[start, end]`, ascending.
    ///
    /// `start > end` is a usage error, not an empty result.
    pub fn trading_days_between(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidRange { start, end });
        }
        self.ensure_covers(start.year(), end.year());

        let lo = self.trading_days.partition_point(|d| *d < start);
        let hi = self.trading_days.partition_point(|d| *d <= end);
        Ok(self.trading_days[lo..hi].to_vec())
    }

    /// Number of trading dates within `[start, end]`.
    pub fn count_trading_days(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<usize, CalendarError> {
        Ok(self.trading_days_between(start, end)?.len())
    }

    /// Membership test at day granularity.
    pub fn is_trading_day(&mut self, date: NaiveDate) -> bool {
        self.ensure_covers(date.year(), date.year());
        self.trading_days.binary_search(&date).is_ok()
    }

    /// The n-th trading date at-or-after `date` (n >= 1), if populated that
    /// far.
    pub fn next_trading_day(&mut self, date: NaiveDate, n: usize) -> Option<NaiveDate> {
        if n == 0 {
            return None;
        }
        self.ensure_covers(date.year(), date.year());
        let idx = self.trading_days.partition_point(|d| *d < date);
        self.trading_days.get(idx + n - 1).copied()
    }

    /// The n-th trading date at-or-before `date` (n >= 1), if populated
    /// that far.
    pub fn previous_trading_day(&mut self, date: NaiveDate, n: usize) -> Option<NaiveDate> {
        if n == 0 {
            return None;
        }
        self.ensure_covers(date.year(), date.year());
        let idx = self.trading_days.partition_point(|d| *d <= date);
        if idx >= n {
            Some(self.trading_days[idx - n])
        } else {
            None
        }
    }

    /// Non-trading calendar dates within `[start, end]`, restricted to the
    /// covered span.
    pub fn holidays_between(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidRange { start, end });
        }
        self.ensure_covers(start.year(), end.year());

        let lo = self.holidays.partition_point(|d| *d < start);
        let hi = self.holidays.partition_point(|d| *d <= end);
        Ok(self.holidays[lo..hi].to_vec())
    }

    /// Morning and afternoon sessions for a trading day, else `None`.
    pub fn trading_hours(&mut self, date: NaiveDate) -> Option<[TradingSession; 2]> {
        if self.is_trading_day(date) {
            Some([morning_session(), afternoon_session()])
        } else {
            None
        }
    }

    /// True if the instant falls on a trading day and inside either
    /// session, boundaries inclusive.
    pub fn is_trading_time(&mut self, instant: NaiveDateTime) -> bool {
        match self.trading_hours(instant.date()) {
            Some(sessions) => sessions.iter().any(|s| s.contains(instant.time())),
            None => false,
        }
    }

    /// `today` if it is a trading day, else the next trading day.
    pub fn current_trading_day(&mut self, today: NaiveDate) -> Option<NaiveDate> {
        if self.is_trading_day(today) {
            Some(today)
        } else {
            self.next_trading_day(today, 1)
        }
    }
}

/// Calendar dates within the covered span that are not trading dates.
fn complement(trading_days: &[NaiveDate]) -> Vec<NaiveDate> {
    let (Some(first), Some(last)) = (trading_days.first(), trading_days.last()) else {
        return Vec::new();
    };

    let mut holidays = Vec::new();
    let mut date = *first;
    while date <= *last {
        if trading_days.binary_search(&date).is_err() {
            holidays.push(date);
        }
        date += Duration::days(1);
    }
    holidays
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::source::SourceError;

    /// Source backed by a fixed date list; years outside it come up empty.
    struct StaticSource(Vec<NaiveDate>);

    impl CalendarSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn fetch_trading_sessions(&self, year: i32) -> Result<Vec<NaiveDate>, SourceError> {
            Ok(self.0.iter().copied().filter(|d| d.year() == year).collect())
        }
    }

    struct FailingSource;

    impl CalendarSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch_trading_sessions(&self, _year: i32) -> Result<Vec<NaiveDate>, SourceError> {
            Err(SourceError::NetworkUnreachable("connection refused".into()))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january_2024_calendar() -> TradingCalendar {
        // First two weeks of January 2024, weekdays, Jan 1 excluded.
        let days = vec![
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 4),
            date(2024, 1, 5),
            date(2024, 1, 8),
            date(2024, 1, 9),
            date(2024, 1, 10),
            date(2024, 1, 11),
            date(2024, 1, 12),
        ];
        let mut calendar = TradingCalendar::new(Box::new(StaticSource(days)));
        calendar.refresh(2024, 2024);
        calendar
    }

    #[test]
    fn trading_days_are_ascending_and_bounded() {
        let mut calendar = january_2024_calendar();
        let days = calendar
            .trading_days_between(date(2024, 1, 3), date(2024, 1, 10))
            .unwrap();
        assert!(days.windows(2).all(|w| w[0] < w[1]));
        assert!(days.iter().all(|d| *d >= date(2024, 1, 3) && *d <= date(2024, 1, 10)));
        assert_eq!(days.len(), 6);
    }

    #[test]
    fn count_matches_list_length() {
        let mut calendar = january_2024_calendar();
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 12);
        let listed = calendar.trading_days_between(start, end).unwrap().len();
        assert_eq!(calendar.count_trading_days(start, end).unwrap(), listed);
    }

    #[test]
    fn inverted_range_is_a_usage_error() {
        let mut calendar = january_2024_calendar();
        let err = calendar
            .trading_days_between(date(2024, 1, 31), date(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(err, CalendarError::InvalidRange { .. }));
    }

    #[test]
    fn is_trading_day_consistent_with_listing() {
        let mut calendar = january_2024_calendar();
        for probe in [date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 6)] {
            let listed = calendar.trading_days_between(probe, probe).unwrap();
            assert_eq!(calendar.is_trading_day(probe), listed == vec![probe]);
        }
    }

    #[test]
    fn next_and_previous_trading_day() {
        let mut calendar = january_2024_calendar();
        // Jan 6 is a Saturday.
        assert_eq!(
            calendar.next_trading_day(date(2024, 1, 6), 1),
            Some(date(2024, 1, 8))
        );
        // At-or-after: a trading day is its own next.
        assert_eq!(
            calendar.next_trading_day(date(2024, 1, 8), 1),
            Some(date(2024, 1, 8))
        );
        assert_eq!(
            calendar.next_trading_day(date(2024, 1, 6), 3),
            Some(date(2024, 1, 10))
        );
        assert_eq!(calendar.next_trading_day(date(2024, 1, 13), 1), None);

        assert_eq!(
            calendar.previous_trading_day(date(2024, 1, 6), 1),
            Some(date(2024, 1, 5))
        );
        assert_eq!(
            calendar.previous_trading_day(date(2024, 1, 5), 2),
            Some(date(2024, 1, 4))
        );
        assert_eq!(calendar.previous_trading_day(date(2024, 1, 1), 1), None);
        assert_eq!(calendar.next_trading_day(date(2024, 1, 8), 0), None);
    }

    #[test]
    fn holidays_are_the_complement() {
        let mut calendar = january_2024_calendar();
        let holidays = calendar
            .holidays_between(date(2024, 1, 2), date(2024, 1, 12))
            .unwrap();
        // The two weekends inside the covered span.
        assert_eq!(
            holidays,
            vec![date(2024, 1, 6), date(2024, 1, 7)]
        );
    }

    #[test]
    fn trading_hours_and_trading_time() {
        let mut calendar = january_2024_calendar();
        let sessions = calendar.trading_hours(date(2024, 1, 2)).unwrap();
        assert_eq!(sessions[0].open, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(sessions[1].close, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        assert!(calendar.trading_hours(date(2024, 1, 6)).is_none());

        let trading = date(2024, 1, 2);
        assert!(calendar.is_trading_time(trading.and_hms_opt(9, 30, 0).unwrap()));
        assert!(calendar.is_trading_time(trading.and_hms_opt(11, 30, 0).unwrap()));
        assert!(calendar.is_trading_time(trading.and_hms_opt(14, 59, 59).unwrap()));
        assert!(!calendar.is_trading_time(trading.and_hms_opt(12, 0, 0).unwrap()));
        assert!(!calendar.is_trading_time(trading.and_hms_opt(15, 0, 1).unwrap()));
        let weekend = date(2024, 1, 6);
        assert!(!calendar.is_trading_time(weekend.and_hms_opt(10, 0, 0).unwrap()));
    }

    #[test]
    fn current_trading_day_rolls_forward() {
        let mut calendar = january_2024_calendar();
        assert_eq!(
            calendar.current_trading_day(date(2024, 1, 2)),
            Some(date(2024, 1, 2))
        );
        assert_eq!(
            calendar.current_trading_day(date(2024, 1, 6)),
            Some(date(2024, 1, 8))
        );
    }

    #[test]
    fn failing_source_falls_back_to_synthetic() {
        let mut calendar = TradingCalendar::new(Box::new(FailingSource));
        calendar.refresh(2024, 2024);
        // Synthetic fallback: weekdays minus the fixed holiday list.
        assert!(calendar.is_trading_day(date(2024, 1, 2)));
        assert!(!calendar.is_trading_day(date(2024, 1, 1)));
        assert!(!calendar.is_trading_day(date(2024, 1, 6)));
    }

    #[test]
    fn lazy_population_on_first_query() {
        let mut calendar = TradingCalendar::new(Box::new(StaticSource(vec![
            date(2022, 6, 1),
            date(2022, 6, 2),
        ])));
        assert!(!calendar.is_populated());
        let days = calendar
            .trading_days_between(date(2022, 6, 1), date(2022, 6, 30))
            .unwrap();
        assert!(calendar.is_populated());
        assert_eq!(days.len(), 2);
    }

    #[test]
    fn point_queries_widen_coverage_like_range_queries() {
        // Populated for 2024 only; 2023 sessions exist at the source.
        let mut calendar = TradingCalendar::new(Box::new(StaticSource(vec![
            date(2023, 3, 1),
            date(2023, 3, 2),
            date(2024, 3, 1),
        ])));
        calendar.refresh(2024, 2024);

        // Membership on an uncovered year must answer from the widened
        // span, matching what the listing reports — in either call order.
        assert!(calendar.is_trading_day(date(2023, 3, 1)));
        assert_eq!(
            calendar.trading_days_between(date(2023, 3, 1), date(2023, 3, 1)).unwrap(),
            vec![date(2023, 3, 1)]
        );

        let mut fresh = TradingCalendar::new(Box::new(StaticSource(vec![
            date(2023, 3, 1),
            date(2023, 3, 2),
            date(2024, 3, 1),
        ])));
        fresh.refresh(2024, 2024);
        assert_eq!(
            fresh.next_trading_day(date(2023, 2, 27), 1),
            Some(date(2023, 3, 1))
        );
        assert_eq!(
            fresh.previous_trading_day(date(2023, 3, 5), 1),
            Some(date(2023, 3, 2))
        );
    }

    #[test]
    fn covered_span_extends_on_out_of_range_query() {
        let mut calendar = TradingCalendar::new(Box::new(StaticSource(vec![
            date(2023, 3, 1),
            date(2024, 3, 1),
        ])));
        calendar.refresh(2024, 2024);
        assert!(calendar
            .trading_days_between(date(2024, 3, 1), date(2024, 3, 1))
            .unwrap()
            .contains(&date(2024, 3, 1)));

        // 2023 was not covered; the query widens the refresh span.
        let days = calendar
            .trading_days_between(date(2023, 1, 1), date(2023, 12, 31))
            .unwrap();
        assert_eq!(days, vec![date(2023, 3, 1)]);
    }
}

//! Trading calendar: exchange sessions, holidays, and trading hours.
//!
//! [`TradingCalendar`] owns a sorted, deduplicated list of trading dates,
//! populated lazily from a [`CalendarSource`] and persisted to a JSON
//! snapshot. When the source is unreachable the calendar falls back to a
//! synthetic weekday calendar (see [`synthetic`]) — an approximation, not
//! source-backed data.

pub mod sessions;
pub mod snapshot;
pub mod source;
pub mod synthetic;

pub use sessions::{CalendarError, TradingCalendar, TradingSession, DEFAULT_START_YEAR};
pub use snapshot::CalendarSnapshot;
pub use source::{CalendarSource, HttpCalendarSource, SourceError};

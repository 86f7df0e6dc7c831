//! Synthetic calendar fallback for when no source is reachable.
//!
//! Weekdays minus a short fixed list of known public holidays. This is an
//! approximation: the real exchange calendar includes make-up sessions and
//! holiday spans the fixed list does not capture, and years outside the
//! list reduce to weekdays only. Tests must not treat synthetic output as
//! equivalent to source-backed data.

use chrono::{Datelike, NaiveDate, Weekday};

/// Known public holidays covered by the fallback.
const FALLBACK_HOLIDAYS: &[&str] = &[
    "2024-01-01",
    "2024-02-09",
    "2024-02-10",
    "2024-02-11",
    "2024-02-12",
    "2024-02-13",
    "2024-02-14",
    "2024-02-15",
    "2024-02-16",
    "2024-02-17",
    "2024-04-04",
    "2024-04-05",
    "2024-04-06",
    "2024-05-01",
    "2024-05-02",
    "2024-05-03",
    "2024-06-10",
    "2024-09-15",
    "2024-09-16",
    "2024-09-17",
    "2024-10-01",
    "2024-10-02",
    "2024-10-03",
    "2024-10-04",
    "2024-10-07",
];

/// Approximate trading dates for one calendar year: weekdays not on the
/// fallback holiday list, ascending.
pub fn synthetic_year(year: i32) -> Vec<NaiveDate> {
    let holidays: Vec<NaiveDate> = FALLBACK_HOLIDAYS
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let mut days = Vec::with_capacity(260);
    let mut date = match NaiveDate::from_ymd_opt(year, 1, 1) {
        Some(d) => d,
        None => return days,
    };

    while date.year() == year {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        if !weekend && !holidays.contains(&date) {
            days.push(date);
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    days
}

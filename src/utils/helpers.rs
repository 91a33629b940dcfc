//! Helper functions and utilities
//!
//! Day-window arithmetic shared by the dashboard aggregation and the
//! schedule evaluation. All windows are derived from a caller-supplied
//! reference time; no timezone normalization happens beyond that.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};

/// Truncate a timestamp to the start of its day
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&at.date_naive().and_time(NaiveTime::MIN))
}

/// Half-open "today" window: [start of day, start of next day)
pub fn today_window(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(at);
    (start, start + Duration::days(1))
}

/// Closed forward window of `days` days starting at the start of today
pub fn forward_window(at: DateTime<Utc>, days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(at);
    (start, start + Duration::days(days))
}

/// Weekday index in the 0=Sunday..6=Saturday convention
pub fn weekday_index(at: DateTime<Utc>) -> u8 {
    at.weekday().num_days_from_sunday() as u8
}

/// Check whether a timestamp falls inside the half-open [from, until) range
pub fn in_day_window(value: DateTime<Utc>, from: DateTime<Utc>, until: DateTime<Utc>) -> bool {
    value >= from && value < until
}

/// Check whether a timestamp falls inside the closed [from, until] range
pub fn in_forward_window(value: DateTime<Utc>, from: DateTime<Utc>, until: DateTime<Utc>) -> bool {
    value >= from && value <= until
}

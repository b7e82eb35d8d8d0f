//! Time types for event queries.
//!
//! [`TimeWindow`] is the half-open `[start, end)` range handed to the
//! calendar provider. The CLI works in whole days, so windows are usually
//! built from two [`NaiveDate`]s with [`TimeWindow::from_dates`].

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use thiserror::Error;

/// Date format accepted on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors produced while building a [`TimeWindow`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeWindowError {
    /// The start bound lies after the end bound.
    #[error("start {start} is after end {end}")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A date string did not match `YYYY-MM-DD`.
    #[error("invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate { input: String },
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate, TimeWindowError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| {
        TimeWindowError::InvalidDate {
            input: input.to_string(),
        }
    })
}

/// Returns the earliest date the rename window starts at when none is given.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).expect("valid date")
}

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window, rejecting inverted bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeWindowError> {
        if start > end {
            return Err(TimeWindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a window from midnight UTC of `start` to midnight UTC of `end`.
    ///
    /// The end date is not widened to the end of that day: the provider
    /// decides how `end` bounds an event.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, TimeWindowError> {
        Self::new(midnight_utc(start), midnight_utc(end))
    }

    /// Start bound formatted for the provider (`2021-01-01T00:00:00Z`).
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// End bound formatted for the provider.
    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0).expect("valid time").and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_from_dates() {
        let window = TimeWindow::from_dates(date(2021, 1, 1), date(2021, 1, 8)).unwrap();
        assert_eq!(window.start, utc(2021, 1, 1, 0, 0, 0));
        assert_eq!(window.end, utc(2021, 1, 8, 0, 0, 0));
    }

    #[test]
    fn same_day_window_is_empty() {
        let window = TimeWindow::from_dates(date(2024, 3, 15), date(2024, 3, 15)).unwrap();
        assert_eq!(window.start, window.end);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = TimeWindow::from_dates(date(2024, 3, 16), date(2024, 3, 15)).unwrap_err();
        assert!(matches!(err, TimeWindowError::Inverted { .. }));
        assert!(err.to_string().contains("is after"));
    }

    #[test]
    fn rfc3339_bounds() {
        let window = TimeWindow::from_dates(date(2021, 1, 1), date(2024, 12, 31)).unwrap();
        assert_eq!(window.start_rfc3339(), "2021-01-01T00:00:00Z");
        assert_eq!(window.end_rfc3339(), "2024-12-31T00:00:00Z");
    }

    #[test]
    fn parse_valid_date() {
        assert_eq!(parse_date("2024-02-29").unwrap(), date(2024, 2, 29));
        assert_eq!(parse_date(" 2021-01-01 ").unwrap(), date(2021, 1, 1));
    }

    #[test]
    fn parse_invalid_date() {
        for input in ["2023-02-29", "15/03/2024", "2024-3", ""] {
            let err = parse_date(input).unwrap_err();
            assert_eq!(
                err,
                TimeWindowError::InvalidDate {
                    input: input.to_string()
                }
            );
        }
    }

    #[test]
    fn default_start() {
        assert_eq!(default_start_date(), date(2021, 1, 1));
    }
}

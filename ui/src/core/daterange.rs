//! Validated inclusive date range for the filter stage.
//!
//! An inverted range is rejected at construction instead of silently
//! producing an empty filtered set downstream; the viewer surfaces the
//! condition as a localized warning.

use std::fmt;

use time::macros::format_description;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeError {
    Inverted { start: Date, end: Date },
}

impl fmt::Display for DateRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRangeError::Inverted { start, end } => {
                write!(f, "start date {start} is after end date {end}")
            }
        }
    }
}

impl std::error::Error for DateRangeError {}

impl DateRange {
    /// Both bounds inclusive; `start > end` is an error.
    pub fn new(start: Date, end: Date) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    /// Day-granularity membership: the timestamp's calendar date must lie
    /// within the range (date pickers are date-only inputs).
    pub fn contains(&self, ts: OffsetDateTime) -> bool {
        let day = ts.date();
        self.start <= day && day <= self.end
    }
}

/// Parse the value string of an `<input type="date">` widget.
pub fn parse_picker_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), &format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateRange::new(date!(2024 - 01 - 05), date!(2024 - 01 - 01)).unwrap_err();
        assert!(matches!(err, DateRangeError::Inverted { .. }));
    }

    #[test]
    fn single_day_range_is_valid() {
        let range = DateRange::new(date!(2024 - 01 - 01), date!(2024 - 01 - 01)).unwrap();
        assert!(range.contains(datetime!(2024-01-01 23:59 UTC)));
        assert!(!range.contains(datetime!(2024-01-02 00:00 UTC)));
    }

    #[test]
    fn bounds_are_inclusive_at_day_granularity() {
        let range = DateRange::new(date!(2024 - 01 - 01), date!(2024 - 01 - 03)).unwrap();
        assert!(range.contains(datetime!(2024-01-01 00:00 UTC)));
        assert!(range.contains(datetime!(2024-01-03 18:45 UTC)));
        assert!(!range.contains(datetime!(2023-12-31 23:59 UTC)));
    }

    #[test]
    fn picker_dates_parse() {
        assert_eq!(parse_picker_date("2024-02-29"), Some(date!(2024 - 02 - 29)));
        assert_eq!(parse_picker_date(" 2024-01-01 "), Some(date!(2024 - 01 - 01)));
        assert_eq!(parse_picker_date("01/02/2024"), None);
        assert_eq!(parse_picker_date(""), None);
    }
}

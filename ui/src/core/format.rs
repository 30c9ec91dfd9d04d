//! Formatting helpers shared by the preview table and chart axes.

use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        "—".to_string()
    }
}

/// `YYYY-MM-DD`, the value format of `<input type="date">`.
pub fn picker_value(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "—".to_string())
}

/// Timestamp cell in the preview table.
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| "—".to_string())
}

/// Compact date label for chart axis ticks.
pub fn axis_date_label(ts: OffsetDateTime) -> String {
    ts.format(&format_description!(
        "[month repr:short] [day padding:none]"
    ))
    .unwrap_or_else(|_| "—".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn picker_value_is_iso_date() {
        assert_eq!(picker_value(datetime!(2024-01-02 00:00 UTC).date()), "2024-01-02");
    }

    #[test]
    fn axis_label_is_compact() {
        assert_eq!(axis_date_label(datetime!(2024-01-02 10:30 UTC)), "Jan 2");
    }

    #[test]
    fn non_finite_numbers_render_as_dash() {
        assert_eq!(format_number(f64::NAN, 2), "—");
        assert_eq!(format_number(21.456, 1), "21.5");
    }
}

//! Dataset model and JSON ingestion for uploaded readings.
//!
//! Expected document shape:
//! ```json
//! {"data": [{"time": "2024-01-01", "t1": 10.0, "t2": 11.5}, ...]}
//! ```
//! Ingestion is all-or-nothing: any malformed row fails the whole upload
//! with a typed [`IngestError`] and no partial dataset is produced.

use std::fmt;

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use super::daterange::DateRange;

/// Name of the mandatory timestamp field; every other key is a metric.
pub const TIME_COLUMN: &str = "time";

/// One uploaded row: a timestamp plus metric values in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub time: OffsetDateTime,
    pub values: Vec<f64>,
}

/// Ordered collection of readings sharing the same metric columns.
///
/// Built once per upload and never mutated afterwards; filtering produces a
/// new `Dataset` with the same columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Reading>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    Json(String),
    MissingDataKey,
    DataNotAnArray,
    Empty,
    RowNotAnObject { index: usize },
    MissingTime { index: usize },
    BadTimestamp { index: usize, raw: String },
    NonNumericMetric { index: usize, column: String },
    InconsistentColumns { index: usize },
    NoMetricColumns,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Json(detail) => write!(f, "invalid JSON ({detail})"),
            IngestError::MissingDataKey => write!(f, "missing top-level \"data\" key"),
            IngestError::DataNotAnArray => write!(f, "\"data\" is not an array"),
            IngestError::Empty => write!(f, "\"data\" array is empty"),
            IngestError::RowNotAnObject { index } => {
                write!(f, "row {index} is not an object")
            }
            IngestError::MissingTime { index } => {
                write!(f, "row {index} has no \"{TIME_COLUMN}\" field")
            }
            IngestError::BadTimestamp { index, raw } => {
                write!(f, "row {index} has an unparseable timestamp {raw:?}")
            }
            IngestError::NonNumericMetric { index, column } => {
                write!(f, "row {index} has a non-numeric value for \"{column}\"")
            }
            IngestError::InconsistentColumns { index } => {
                write!(f, "row {index} does not match the columns of the first row")
            }
            IngestError::NoMetricColumns => {
                write!(f, "no metric columns besides \"{TIME_COLUMN}\"")
            }
        }
    }
}

impl std::error::Error for IngestError {}

impl Dataset {
    /// Parse an uploaded byte stream into a dataset.
    ///
    /// Metric columns are taken from the first row, in document order;
    /// every later row must carry exactly the same keys.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, IngestError> {
        let doc: Value =
            serde_json::from_slice(bytes).map_err(|err| IngestError::Json(err.to_string()))?;
        let data = doc.get("data").ok_or(IngestError::MissingDataKey)?;
        let raw_rows = data.as_array().ok_or(IngestError::DataNotAnArray)?;
        if raw_rows.is_empty() {
            return Err(IngestError::Empty);
        }

        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Reading> = Vec::with_capacity(raw_rows.len());

        for (index, raw) in raw_rows.iter().enumerate() {
            let obj = raw
                .as_object()
                .ok_or(IngestError::RowNotAnObject { index })?;

            let raw_time = obj.get(TIME_COLUMN).ok_or(IngestError::MissingTime { index })?;
            let time_str = raw_time.as_str().ok_or_else(|| IngestError::BadTimestamp {
                index,
                raw: raw_time.to_string(),
            })?;
            let time = parse_timestamp(time_str).ok_or_else(|| IngestError::BadTimestamp {
                index,
                raw: time_str.to_string(),
            })?;

            if index == 0 {
                columns = obj
                    .keys()
                    .filter(|key| key.as_str() != TIME_COLUMN)
                    .cloned()
                    .collect();
                if columns.is_empty() {
                    return Err(IngestError::NoMetricColumns);
                }
            } else if obj.len() != columns.len() + 1
                || !columns.iter().all(|column| obj.contains_key(column))
            {
                return Err(IngestError::InconsistentColumns { index });
            }

            let mut values = Vec::with_capacity(columns.len());
            for column in &columns {
                let value = obj.get(column).and_then(Value::as_f64).ok_or_else(|| {
                    IngestError::NonNumericMetric {
                        index,
                        column: column.clone(),
                    }
                })?;
                values.push(value);
            }

            rows.push(Reading { time, values });
        }

        Ok(Self { columns, rows })
    }

    /// Observed (min, max) timestamps; `None` for an empty dataset.
    pub fn time_bounds(&self) -> Option<(OffsetDateTime, OffsetDateTime)> {
        let first = self.rows.first()?.time;
        let mut min = first;
        let mut max = first;
        for row in &self.rows {
            if row.time < min {
                min = row.time;
            }
            if row.time > max {
                max = row.time;
            }
        }
        Some((min, max))
    }

    /// Subsequence of rows whose timestamp date falls inside `range`.
    /// An empty result is not an error.
    pub fn filter(&self, range: &DateRange) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| range.contains(row.time))
                .cloned()
                .collect(),
        }
    }

    /// `(time, value)` pairs for one metric, in row order.
    /// `None` when the metric is not a known column.
    pub fn series(&self, metric: &str) -> Option<Vec<(OffsetDateTime, f64)>> {
        let slot = self.columns.iter().position(|column| column == metric)?;
        Some(
            self.rows
                .iter()
                .map(|row| (row.time, row.values[slot]))
                .collect(),
        )
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`
/// (offset-less values are taken as UTC) and date-only `YYYY-MM-DD`.
fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    let spaced = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(ts) = PrimitiveDateTime::parse(raw, &spaced) {
        return Some(ts.assume_utc());
    }
    let tee = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(ts) = PrimitiveDateTime::parse(raw, &tee) {
        return Some(ts.assume_utc());
    }
    let date_only = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(raw, &date_only) {
        return Some(date.midnight().assume_utc());
    }
    None
}

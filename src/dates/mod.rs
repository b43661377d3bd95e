//! Calendar date helpers: period alignment and date-range segmentation
//!
//! Remote time-series endpoints cap how much history a single request may
//! cover, so long intervals are split into period-aligned chunks before
//! being requested one by one.

mod period;
mod segment;

pub use period::PeriodCode;
pub use segment::{segment, segment_str, DateRange};

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{HoustonError, Result};

/// Parse a calendar date from the formats the platform emits.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYYMMDD` and full timestamps
/// (`YYYY-MM-DD HH:MM:SS`, optionally `T`-separated) whose time part is
/// discarded.
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    let text = date_str.trim();

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(datetime.date());
        }
    }

    Err(HoustonError::InvalidRange(format!(
        "could not parse date '{}'. Use YYYY-MM-DD",
        date_str
    )))
}

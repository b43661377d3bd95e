use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::{parse_date, PeriodCode};
use crate::error::{HoustonError, Result};

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of calendar days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `(start, end)` as ISO 8601 date strings
    pub fn to_iso(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..={}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Split `[start, end]` into contiguous ranges aligned to `period` starts.
///
/// Each range ends the day before the next boundary, except the last which
/// ends exactly on `end`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use houston_tools::dates::{segment, PeriodCode};
///
/// let start = NaiveDate::from_ymd_opt(2010, 6, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2012, 3, 15).unwrap();
/// let ranges = segment(start, end, PeriodCode::Annual).unwrap();
///
/// assert_eq!(ranges.len(), 3);
/// assert_eq!(ranges[0].to_string(), "2010-06-01..=2010-12-31");
/// assert_eq!(ranges[1].to_string(), "2011-01-01..=2011-12-31");
/// assert_eq!(ranges[2].to_string(), "2012-01-01..=2012-03-15");
/// ```
pub fn segment(start: NaiveDate, end: NaiveDate, period: PeriodCode) -> Result<Vec<DateRange>> {
    if start > end {
        return Err(HoustonError::InvalidRange(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }

    if start == end {
        return Ok(vec![DateRange { start, end }]);
    }

    // start, every period boundary strictly inside (start, end), then end
    let mut boundaries = vec![start];
    let mut next = period.next_boundary(start);
    while let Some(boundary) = next {
        if boundary >= end {
            break;
        }
        boundaries.push(boundary);
        next = period.next_boundary(boundary);
    }
    boundaries.push(end);

    let last = boundaries.len() - 2;
    let mut ranges = Vec::with_capacity(boundaries.len() - 1);
    for (i, pair) in boundaries.windows(2).enumerate() {
        let range_end = if i == last {
            end
        } else {
            // pair[1] > start >= NaiveDate::MIN, so there is always a predecessor
            pair[1].pred_opt().unwrap_or(pair[1])
        };
        ranges.push(DateRange {
            start: pair[0],
            end: range_end,
        });
    }

    debug!(
        "Segmented {}..={} by {} into {} ranges",
        start,
        end,
        period,
        ranges.len()
    );
    Ok(ranges)
}

/// String-in/string-out form of [`segment`].
///
/// Dates are parsed with [`parse_date`] and the period code with
/// [`PeriodCode::from_str`](std::str::FromStr); the ranges come back as ISO
/// 8601 `(start, end)` pairs.
pub fn segment_str(start: &str, end: &str, period: &str) -> Result<Vec<(String, String)>> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    let period: PeriodCode = period.parse()?;

    Ok(segment(start, end, period)?
        .iter()
        .map(DateRange::to_iso)
        .collect())
}

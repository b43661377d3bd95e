use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::HoustonError;

/// Calendar alignment unit used to place segment boundaries.
///
/// Boundaries always fall on period starts: January 1st, the first day of a
/// calendar quarter or month, Mondays, or every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodCode {
    Annual,
    Quarterly,
    Monthly,
    Weekly,
    Daily,
}

impl PeriodCode {
    /// Canonical single-letter code
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodCode::Annual => "A",
            PeriodCode::Quarterly => "Q",
            PeriodCode::Monthly => "M",
            PeriodCode::Weekly => "W",
            PeriodCode::Daily => "D",
        }
    }

    /// Whether `date` is the first day of a period
    pub fn is_boundary(&self, date: NaiveDate) -> bool {
        match self {
            PeriodCode::Annual => date.ordinal() == 1,
            PeriodCode::Quarterly => date.day() == 1 && (date.month() - 1) % 3 == 0,
            PeriodCode::Monthly => date.day() == 1,
            PeriodCode::Weekly => date.weekday().num_days_from_monday() == 0,
            PeriodCode::Daily => true,
        }
    }

    /// First period boundary strictly after `date`.
    ///
    /// Returns `None` when the boundary would fall past the last
    /// representable date.
    pub fn next_boundary(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            PeriodCode::Annual => NaiveDate::from_ymd_opt(date.year() + 1, 1, 1),
            PeriodCode::Quarterly => {
                let quarter_start_month = ((date.month() - 1) / 3) * 3 + 1;
                if quarter_start_month == 10 {
                    NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(date.year(), quarter_start_month + 3, 1)
                }
            }
            PeriodCode::Monthly => {
                if date.month() == 12 {
                    NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
                }
            }
            PeriodCode::Weekly => {
                let offset = 7 - u64::from(date.weekday().num_days_from_monday());
                date.checked_add_days(Days::new(offset))
            }
            PeriodCode::Daily => date.succ_opt(),
        }
    }
}

impl fmt::Display for PeriodCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodCode {
    type Err = HoustonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" | "Y" | "AS" | "YS" | "ANNUAL" | "YEARLY" => Ok(PeriodCode::Annual),
            "Q" | "QS" | "QUARTERLY" => Ok(PeriodCode::Quarterly),
            "M" | "MS" | "MONTHLY" => Ok(PeriodCode::Monthly),
            "W" | "WEEKLY" => Ok(PeriodCode::Weekly),
            "D" | "DAILY" => Ok(PeriodCode::Daily),
            _ => Err(HoustonError::InvalidRange(format!(
                "unknown period code '{}'. Possible choices: A, Q, M, W, D",
                s
            ))),
        }
    }
}

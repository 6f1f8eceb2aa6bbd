//! Calendar-date analysis windows.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};

/// Date format used on the wire and by the imagery backend.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar-date window bounding image retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl AnalysisPeriod {
    /// Create a period, rejecting `start > end`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> FieldResult<Self> {
        if start_date > end_date {
            return Err(FieldError::InvalidPeriod(format!(
                "start date {} is after end date {}",
                start_date, end_date
            )));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Parse a `YYYY-MM-DD` date.
    pub fn parse_date(s: &str) -> FieldResult<NaiveDate> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map_err(|_| FieldError::InvalidDate(s.to_string()))
    }

    /// The `days`-long window ending on `today`.
    pub fn trailing(today: NaiveDate, days: i64) -> FieldResult<Self> {
        Self::new(days_before(today, days)?, today)
    }

    /// Resolve optional request dates against defaults.
    ///
    /// A missing end date defaults to `today`; a missing start date defaults
    /// to `today - lookback_days`, independently of any explicit end date.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        lookback_days: i64,
        today: NaiveDate,
    ) -> FieldResult<Self> {
        let start_date = match start {
            Some(s) => Self::parse_date(s)?,
            None => days_before(today, lookback_days)?,
        };
        let end_date = match end {
            Some(s) => Self::parse_date(s)?,
            None => today,
        };
        Self::new(start_date, end_date)
    }

    /// The same window moved `days` earlier. Both ends shift by the same amount.
    ///
    /// Fails when the shifted window falls outside the representable calendar.
    pub fn shifted_back(&self, days: i64) -> FieldResult<Self> {
        Ok(Self {
            start_date: days_before(self.start_date, days)?,
            end_date: days_before(self.end_date, days)?,
        })
    }

    /// Window length in days.
    pub fn num_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    pub fn start_str(&self) -> String {
        self.start_date.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end_date.format(DATE_FORMAT).to_string()
    }
}

/// `date` minus `days`, or `InvalidPeriod` on calendar overflow.
fn days_before(date: NaiveDate, days: i64) -> FieldResult<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_sub_signed(delta))
        .ok_or_else(|| {
            FieldError::InvalidPeriod(format!(
                "{} minus {} days is outside the supported date range",
                date.format(DATE_FORMAT),
                days
            ))
        })
}

impl std::fmt::Display for AnalysisPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.start_str(), self.end_str())
    }
}

//! Date range for filtering events.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{PmSyncError, PmSyncResult};
use crate::event::CalendarEvent;

/// Inclusive instant range. None values mean unbounded in that direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        DateRange { from, to }
    }

    /// Parse YYYY-MM-DD bounds: `from` at start of day, `to` at end of day.
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> PmSyncResult<Self> {
        let from_dt = from.map(parse_date_start).transpose()?;
        let to_dt = to.map(parse_date_end).transpose()?;

        Ok(DateRange {
            from: from_dt,
            to: to_dt,
        })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| instant >= from) && self.to.is_none_or(|to| instant <= to)
    }

    /// An event matches when its start or its end falls inside the range.
    pub fn matches(&self, event: &CalendarEvent) -> bool {
        self.contains(event.start) || self.contains(event.end)
    }
}

fn parse_date(s: &str) -> PmSyncResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        PmSyncError::Validation(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })
}

/// Parse YYYY-MM-DD as start of day in UTC
fn parse_date_start(s: &str) -> PmSyncResult<DateTime<Utc>> {
    let date = parse_date(s)?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Parse YYYY-MM-DD as end of day in UTC
fn parse_date_end(s: &str) -> PmSyncResult<DateTime<Utc>> {
    let date = parse_date(s)?;
    date.and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| PmSyncError::Validation(format!("Invalid date '{}'", s)))
}

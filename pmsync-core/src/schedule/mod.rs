//! Working-hour planning.
//!
//! The scheduler packs tasks first-fit into weekday working windows, the
//! slot query lists those windows, and the validator checks externally
//! supplied plans against the same per-day limit. All of it is pure.

mod scheduler;
mod slots;
mod validator;

pub use scheduler::{Assignment, SchedulePlan, Scheduler};
pub use slots::{Slot, available_slots};
pub use validator::{ProposedAssignment, ValidationReport, validate, validate_plan};

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};

use crate::config::WorkingHours;

pub(crate) fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Start of the working window on `date`.
pub(crate) fn window_start(date: NaiveDate, hours: &WorkingHours) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hours.start_hour, 0, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time).and_utc()
}

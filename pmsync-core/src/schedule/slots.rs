use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::add_hours;
use crate::config::WorkingHours;
use crate::error::PmSyncResult;
use crate::schedule::{is_weekend, window_start};

/// A full working window on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available_hours: f64,
}

/// Every weekday window in `from..=to`. Existing bookings are not subtracted.
pub fn available_slots(
    from: NaiveDate,
    to: NaiveDate,
    window: &WorkingHours,
) -> PmSyncResult<Vec<Slot>> {
    window.validate()?;

    let mut slots = Vec::new();
    let mut date = from;

    while date <= to {
        if !is_weekend(date) {
            let start = window_start(date, window);
            let Some(end) = add_hours(start, window.hours_per_day) else {
                break;
            };
            slots.push(Slot {
                date,
                start,
                end,
                available_hours: window.hours_per_day,
            });
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn test_two_weeks_yields_ten_slots() {
        // Monday 2025-06-02 through Sunday 2025-06-15
        let slots = available_slots(date(2), date(15), &WorkingHours::default()).unwrap();
        assert_eq!(slots.len(), 10);
        assert!(slots.iter().all(|s| !is_weekend(s.date)));
        assert!(slots.iter().all(|s| s.available_hours == 8.0));
    }

    #[test]
    fn test_slot_covers_working_window() {
        let slots = available_slots(date(2), date(2), &WorkingHours::default()).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap());
        assert_eq!(slots[0].end, Utc.with_ymd_and_hms(2025, 6, 2, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_weekend_only_and_reversed_ranges_are_empty() {
        let window = WorkingHours::default();
        assert!(available_slots(date(7), date(8), &window).unwrap().is_empty());
        assert!(available_slots(date(10), date(2), &window).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        for hours_per_day in [0.0, f64::NAN] {
            let window = WorkingHours {
                start_hour: 9,
                hours_per_day,
            };
            assert!(matches!(
                available_slots(date(2), date(6), &window),
                Err(crate::error::PmSyncError::Config(_))
            ));
        }
    }

    #[test]
    fn test_range_ending_at_max_date_terminates() {
        let last = NaiveDate::MAX;
        let slots = available_slots(last.pred_opt().unwrap(), last, &WorkingHours::default()).unwrap();
        assert!(slots.len() <= 2);
    }
}

//! ICS file parsing using the icalendar crate's parser.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use icalendar::parser::{Component, Property, read_calendar, unfold};

use crate::codec::add_hours;
use crate::error::{PmSyncError, PmSyncResult};
use crate::event::{CalendarEvent, EventStatus, ext};
use crate::ics::unescape_text;

/// Parse ICS content holding a single event.
pub fn parse_event(content: &str) -> PmSyncResult<CalendarEvent> {
    parse_events(content)?
        .into_iter()
        .next()
        .ok_or_else(|| PmSyncError::IcsParse("no VEVENT component".into()))
}

/// Parse every VEVENT in an ICS document.
pub fn parse_events(content: &str) -> PmSyncResult<Vec<CalendarEvent>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| PmSyncError::IcsParse(e.to_string()))?;

    calendar
        .components
        .iter()
        .filter(|c| c.name.as_ref().eq_ignore_ascii_case("VEVENT"))
        .map(event_from_component)
        .collect()
}

fn event_from_component(vevent: &Component) -> PmSyncResult<CalendarEvent> {
    let uid = find_prop(vevent, "UID")
        .map(|p| p.val.to_string())
        .filter(|uid| !uid.trim().is_empty())
        .ok_or_else(|| PmSyncError::IcsParse("VEVENT without UID".into()))?;

    let summary = find_prop(vevent, "SUMMARY")
        .map(|p| unescape_text(p.val.as_ref()))
        .unwrap_or_else(|| "(No title)".to_string());
    let description = find_prop(vevent, "DESCRIPTION").map(|p| unescape_text(p.val.as_ref()));

    // Tool extensions; foreign X- properties are kept too so a rewrite does not drop them
    let extensions: BTreeMap<String, String> = vevent
        .properties
        .iter()
        .filter(|p| p.name.as_ref().to_ascii_lowercase().starts_with("x-"))
        .map(|p| {
            (
                p.name.as_ref().to_ascii_lowercase(),
                unescape_text(p.val.as_ref()),
            )
        })
        .collect();

    let start = find_prop(vevent, "DTSTART")
        .ok_or_else(|| PmSyncError::IcsParse(format!("event {uid} has no DTSTART")))
        .and_then(|p| parse_instant(p.val.as_ref()))?;

    let end = match find_prop(vevent, "DTEND") {
        Some(p) => parse_instant(p.val.as_ref())?,
        None => {
            let duration = inferred_duration(&extensions).ok_or_else(|| {
                PmSyncError::IcsParse(format!("event {uid} has neither DTEND nor a duration"))
            })?;
            add_hours(start, duration).ok_or_else(|| {
                PmSyncError::IcsParse(format!("event {uid} duration of {duration} hours is out of range"))
            })?
        }
    };

    let status = find_prop(vevent, "STATUS")
        .and_then(|p| EventStatus::from_ics_str(p.val.as_ref()))
        .unwrap_or(EventStatus::NeedsAction);

    let priority = find_prop(vevent, "PRIORITY")
        .and_then(|p| p.val.as_ref().trim().parse().ok())
        .unwrap_or(0);

    let categories = find_prop(vevent, "CATEGORIES")
        .map(|p| split_list(p.val.as_ref()))
        .unwrap_or_default();

    Ok(CalendarEvent {
        uid,
        summary,
        description,
        start,
        end,
        status,
        priority,
        categories,
        extensions,
    })
}

fn find_prop<'a>(component: &'a Component<'a>, name: &str) -> Option<&'a Property<'a>> {
    component
        .properties
        .iter()
        .find(|p| p.name.as_ref().eq_ignore_ascii_case(name))
}

/// Parse a DTSTART/DTEND value. Floating times and dates are read as UTC.
fn parse_instant(value: &str) -> PmSyncResult<DateTime<Utc>> {
    let value = value.trim();
    let invalid = || PmSyncError::IcsParse(format!("invalid date-time '{value}'"));

    if let Some(utc) = value.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
            .map(|dt| dt.and_utc())
            .map_err(|_| invalid());
    }
    if value.contains('T') {
        return NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
            .map(|dt| dt.and_utc())
            .map_err(|_| invalid());
    }
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(invalid)
}

/// Duration when DTEND is missing: duration-hours, falling back to estimated-hours.
fn inferred_duration(extensions: &BTreeMap<String, String>) -> Option<f64> {
    [ext::DURATION_HOURS, ext::ESTIMATED_HOURS]
        .iter()
        .filter_map(|key| extensions.get(*key))
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .find(|h| *h > 0.0 && h.is_finite())
}

/// Split a comma-separated TEXT list, honouring escaped commas.
fn split_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            items.push(unescape_text(&current));
            current.clear();
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        items.push(unescape_text(&current));
    }

    items.into_iter().filter(|s| !s.is_empty()).collect()
}

//! ICS file generation.

use crate::constants::PRODID;
use crate::error::{PmSyncError, PmSyncResult};
use crate::event::CalendarEvent;
use crate::ics::{UTC_FORMAT, escape_text};
use icalendar::{Calendar, Component, Property};

/// Generate .ics content holding a single event.
pub fn generate_ics(event: &CalendarEvent) -> PmSyncResult<String> {
    let mut cal = Calendar::new();
    cal.push(build_vevent(event)?);
    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

/// Generate a feed holding every given event under one calendar name.
pub fn generate_feed(calendar_name: &str, events: &[CalendarEvent]) -> PmSyncResult<String> {
    let mut cal = Calendar::new();
    cal.append_property(Property::new("X-WR-CALNAME", escape_text(calendar_name)));

    for event in events {
        cal.push(build_vevent(event)?);
    }
    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

fn build_vevent(event: &CalendarEvent) -> PmSyncResult<icalendar::Event> {
    if event.uid.trim().is_empty() || event.uid.contains(['\r', '\n']) {
        return Err(PmSyncError::IcsGenerate(format!(
            "event uid {:?} cannot be written",
            event.uid
        )));
    }

    let mut ics_event = icalendar::Event::new();
    ics_event.add_property("UID", &event.uid);

    // DTSTAMP is required by RFC 5545; it is not part of CalendarEvent
    let dtstamp = chrono::Utc::now().format(UTC_FORMAT).to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    ics_event.add_property("SUMMARY", escape_text(&event.summary));
    ics_event.add_property("DTSTART", event.start.format(UTC_FORMAT).to_string());
    ics_event.add_property("DTEND", event.end.format(UTC_FORMAT).to_string());

    if let Some(ref desc) = event.description {
        ics_event.add_property("DESCRIPTION", escape_text(desc));
    }

    if !event.categories.is_empty() {
        let categories: Vec<String> = event.categories.iter().map(|c| escape_text(c)).collect();
        ics_event.add_property("CATEGORIES", categories.join(","));
    }

    ics_event.add_property("STATUS", event.status.as_ics_str());
    ics_event.add_property("PRIORITY", event.priority.to_string());

    for (key, value) in &event.extensions {
        ics_event.add_property(key.to_ascii_uppercase(), escape_text(value));
    }

    Ok(ics_event.done())
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with our own
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

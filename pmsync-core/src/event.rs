//! Calendar events as held in a collection.
//!
//! A `CalendarEvent` is the store's unit: standard VEVENT slots plus a set of
//! namespaced `x-pm-tool-*` extensions carrying task fields.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::EXTENSION_PREFIX;

/// Extension keys written by the codec (lower-case, prefix included).
pub mod ext {
    pub const ID: &str = "x-pm-tool-id";
    pub const TITLE: &str = "x-pm-tool-title";
    pub const ESTIMATED_HOURS: &str = "x-pm-tool-estimated-hours";
    pub const DURATION_HOURS: &str = "x-pm-tool-duration-hours";
    pub const HOURLY_RATE: &str = "x-pm-tool-hourly-rate";
    pub const CONFIDENCE: &str = "x-pm-tool-confidence";
    pub const RATIONALE: &str = "x-pm-tool-rationale";

    pub const ALL: [&str; 7] = [
        ID,
        TITLE,
        ESTIMATED_HOURS,
        DURATION_HOURS,
        HOURLY_RATE,
        CONFIDENCE,
        RATIONALE,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: EventStatus,
    /// 1 (high), 5 (medium) or 9 (low); other values may appear in foreign events.
    pub priority: u8,
    pub categories: Vec<String>,
    /// Tool-private properties keyed by lower-case name.
    pub extensions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    NeedsAction,
    InProcess,
    Completed,
}

impl EventStatus {
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            EventStatus::NeedsAction => "NEEDS-ACTION",
            EventStatus::InProcess => "IN-PROCESS",
            EventStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_ics_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEEDS-ACTION" => Some(EventStatus::NeedsAction),
            "IN-PROCESS" => Some(EventStatus::InProcess),
            "COMPLETED" => Some(EventStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ics_str())
    }
}

impl CalendarEvent {
    pub fn extension(&self, key: &str) -> Option<&str> {
        self.extensions
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn set_extension(&mut self, key: &str, value: impl Into<String>) {
        self.extensions.insert(key.to_ascii_lowercase(), value.into());
    }

    /// Task id carried by this event, if it was written by the tool.
    pub fn task_id(&self) -> Option<i64> {
        self.extension(ext::ID)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Extensions in the tool namespace, in key order.
    pub fn tool_extensions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extensions
            .iter()
            .filter(|(k, _)| k.starts_with(EXTENSION_PREFIX))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 3_600_000.0
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {})",
            self.summary,
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%H:%M")
        )
    }
}

//! Colored terminal rendering for sync core types.

use owo_colors::OwoColorize;
use pmsync_core::CalendarEvent;
use pmsync_core::schedule::{Assignment, Slot};
use pmsync_core::sync::{SyncClass, SyncState, TaskSyncStatus};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub trait Render {
    fn render(&self) -> String;
}

impl Render for SyncClass {
    fn render(&self) -> String {
        match self {
            SyncClass::InSync => "✓".green().to_string(),
            SyncClass::Drifted => "~".yellow().to_string(),
            SyncClass::Missing => "+".red().to_string(),
        }
    }
}

impl Render for TaskSyncStatus {
    fn render(&self) -> String {
        let state = SyncState::from(self.status);
        let mut line = format!("{} task {} {}", self.status.render(), self.task_id, state.dimmed());
        if let Some(ref reason) = self.reason {
            line.push_str(&format!(" ({})", reason));
        }
        line
    }
}

impl Render for Assignment {
    fn render(&self) -> String {
        format!(
            "{} {}-{} {:>5}h  #{} {}",
            self.date,
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.hours,
            self.task_id,
            self.description.bold()
        )
    }
}

impl Render for Slot {
    fn render(&self) -> String {
        format!(
            "{} {}-{} {}",
            self.date,
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            format!("{}h free", self.available_hours).dimmed()
        )
    }
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let time = format!(
            "{} → {}",
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        );
        format!("{} {} {}", self.summary.bold(), time.dimmed(), self.status.as_ics_str())
    }
}

//! Task <-> calendar event mapping.
//!
//! Required fields go into standard event slots; every task field the tool
//! needs back goes into an `x-pm-tool-*` extension. The description is a
//! human rendering only: decode reads extensions exclusively.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::constants::TASK_CATEGORY;
use crate::error::{PmSyncError, PmSyncResult};
use crate::event::{CalendarEvent, EventStatus, ext};
use crate::task::{Task, TaskFields, TaskPriority, TaskStatus};

pub fn status_to_event(status: TaskStatus) -> EventStatus {
    match status {
        TaskStatus::Pending => EventStatus::NeedsAction,
        TaskStatus::InProgress => EventStatus::InProcess,
        TaskStatus::Completed => EventStatus::Completed,
    }
}

pub fn status_from_event(status: EventStatus) -> TaskStatus {
    match status {
        EventStatus::NeedsAction => TaskStatus::Pending,
        EventStatus::InProcess => TaskStatus::InProgress,
        EventStatus::Completed => TaskStatus::Completed,
    }
}

pub fn priority_to_event(priority: TaskPriority) -> u8 {
    match priority {
        TaskPriority::High => 1,
        TaskPriority::Medium => 5,
        TaskPriority::Low => 9,
    }
}

/// Unknown numeric priorities decode to `low`.
pub fn priority_from_event(priority: u8) -> TaskPriority {
    match priority {
        1 => TaskPriority::High,
        5 => TaskPriority::Medium,
        _ => TaskPriority::Low,
    }
}

/// `start` plus fractional hours (millisecond precision), or `None` when
/// the result leaves chrono's range.
pub fn add_hours(start: DateTime<Utc>, h: f64) -> Option<DateTime<Utc>> {
    let millis = (h * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64).and_then(|d| start.checked_add_signed(d))
}

/// Encode a task as the event `uid`.
///
/// A missing `end` is inferred as `start + duration`. An `end` that is not
/// strictly after `start` is rejected.
pub fn encode(
    task: &Task,
    uid: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> PmSyncResult<CalendarEvent> {
    let end = match end {
        Some(end) => end,
        None => add_hours(start, task.effective_duration()).ok_or_else(|| {
            PmSyncError::Validation(format!(
                "task {} duration of {} hours does not fit after {}",
                task.id,
                task.effective_duration(),
                start
            ))
        })?,
    };
    if end <= start {
        return Err(PmSyncError::InvalidInterval { start, end });
    }

    let fields = task.fields();
    let mut extensions = BTreeMap::new();
    extensions.insert(ext::ID.to_string(), fields.id.to_string());
    extensions.insert(ext::TITLE.to_string(), fields.title.clone());
    extensions.insert(
        ext::ESTIMATED_HOURS.to_string(),
        fields.estimated_hours.to_string(),
    );
    extensions.insert(
        ext::DURATION_HOURS.to_string(),
        fields.duration_hours.to_string(),
    );
    if let Some(rate) = fields.hourly_rate {
        extensions.insert(ext::HOURLY_RATE.to_string(), rate.to_string());
    }
    if let Some(confidence) = fields.confidence_score {
        extensions.insert(ext::CONFIDENCE.to_string(), confidence.to_string());
    }
    if let Some(ref rationale) = fields.confidence_rationale {
        extensions.insert(ext::RATIONALE.to_string(), rationale.clone());
    }

    Ok(CalendarEvent {
        uid: uid.to_string(),
        summary: task.label().to_string(),
        description: Some(render_description(task)),
        start,
        end,
        status: status_to_event(task.status),
        priority: priority_to_event(task.priority),
        categories: vec![TASK_CATEGORY.to_string()],
        extensions,
    })
}

/// Recover the encoded task fields from an event written by [`encode`].
///
/// Fails only when the event carries no task id; numeric extensions that do
/// not parse decode to zero.
pub fn decode(event: &CalendarEvent) -> PmSyncResult<TaskFields> {
    let id = event.extension(ext::ID).ok_or_else(|| {
        PmSyncError::Codec(format!("event {} has no {} extension", event.uid, ext::ID))
    })?;

    let estimated_hours = number_or_zero(event.extension(ext::ESTIMATED_HOURS));
    let duration_hours = match event.extension(ext::DURATION_HOURS) {
        Some(v) => number_or_zero(Some(v)),
        None => estimated_hours,
    };

    Ok(TaskFields {
        id: id.trim().parse().unwrap_or(0),
        title: event
            .extension(ext::TITLE)
            .map(str::to_string)
            .unwrap_or_else(|| event.summary.clone()),
        estimated_hours,
        duration_hours,
        hourly_rate: event
            .extension(ext::HOURLY_RATE)
            .map(|v| number_or_zero(Some(v))),
        confidence_score: event
            .extension(ext::CONFIDENCE)
            .map(|v| number_or_zero(Some(v))),
        confidence_rationale: event.extension(ext::RATIONALE).map(str::to_string),
        status: status_from_event(event.status),
        priority: priority_from_event(event.priority),
    })
}

fn number_or_zero(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Human-readable event description. Duplicates the numeric fields.
pub fn render_description(task: &Task) -> String {
    let mut lines = Vec::new();

    if !task.description.trim().is_empty() && task.description != task.label() {
        lines.push(task.description.clone());
        lines.push(String::new());
    }

    lines.push(format!("Estimated hours: {}", task.estimated_hours));
    lines.push(format!("Duration: {} hours", task.effective_duration()));
    if let Some(rate) = task.hourly_rate {
        lines.push(format!("Hourly rate: {rate}"));
    }
    lines.push(format!("Status: {}", task.status));
    lines.push(format!("Priority: {}", task.priority));
    if let Some(confidence) = task.confidence_score {
        lines.push(format!("Confidence: {:.0}%", confidence * 100.0));
    }
    if let Some(ref rationale) = task.confidence_rationale {
        lines.push(format!("Rationale: {rationale}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn draft_spec_task() -> Task {
        let mut task = Task::new(42, 3, "Draft spec", 2.5);
        task.description = "Write the first draft of the API spec".to_string();
        task.status = TaskStatus::InProgress;
        task.priority = TaskPriority::Medium;
        task.confidence_score = Some(0.8);
        task.confidence_rationale = Some("clear".to_string());
        task
    }

    fn monday_nine() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_encode_standard_slots_and_extensions() {
        let event = encode(&draft_spec_task(), "uid-42", monday_nine(), None).unwrap();

        assert_eq!(event.summary, "Draft spec");
        assert_eq!(event.status.as_ics_str(), "IN-PROCESS");
        assert_eq!(event.priority.to_string(), "5");
        assert_eq!(event.extension(ext::ID), Some("42"));
        assert_eq!(event.extension(ext::ESTIMATED_HOURS), Some("2.5"));
        assert_eq!(event.extension(ext::CONFIDENCE), Some("0.8"));
        assert_eq!(event.extension(ext::RATIONALE), Some("clear"));
        assert_eq!(event.categories, vec![TASK_CATEGORY.to_string()]);
    }

    #[test]
    fn test_encode_infers_end_from_duration() {
        let mut task = draft_spec_task();
        let event = encode(&task, "uid", monday_nine(), None).unwrap();
        assert_eq!(event.end, monday_nine() + Duration::minutes(150));

        task.duration_hours = Some(1.0);
        let event = encode(&task, "uid", monday_nine(), None).unwrap();
        assert_eq!(event.end, monday_nine() + Duration::hours(1));
    }

    #[test]
    fn test_encode_rejects_non_increasing_interval() {
        let start = monday_nine();
        for end in [start, start - Duration::hours(1)] {
            let err = encode(&draft_spec_task(), "uid", start, Some(end)).unwrap_err();
            assert!(matches!(err, PmSyncError::InvalidInterval { .. }));
        }
    }

    #[test]
    fn test_encode_rejects_duration_past_calendar_range() {
        let mut task = draft_spec_task();
        task.duration_hours = Some(1e13);
        let err = encode(&task, "uid", monday_nine(), None).unwrap_err();
        assert!(matches!(err, PmSyncError::Validation(_)));

        assert_eq!(add_hours(monday_nine(), f64::MAX), None);
        assert_eq!(add_hours(DateTime::<Utc>::MAX_UTC, 1.0), None);
        assert_eq!(add_hours(monday_nine(), 0.5), Some(monday_nine() + Duration::minutes(30)));
    }

    #[test]
    fn test_decode_recovers_encoded_fields() {
        let mut task = draft_spec_task();
        task.hourly_rate = Some(95.5);
        task.priority = TaskPriority::High;
        let event = encode(&task, "uid", monday_nine(), None).unwrap();

        assert_eq!(decode(&event).unwrap(), task.fields());
    }

    #[test]
    fn test_crlf_text_decodes_to_task_fields() {
        let mut task = draft_spec_task();
        task.title = "Review\r\nnotes".to_string();
        task.confidence_rationale = Some("from form\r\nsecond".to_string());
        let event = encode(&task, "uid", monday_nine(), None).unwrap();

        let ics = crate::ics::generate_ics(&event).unwrap();
        let parsed = crate::ics::parse_event(&ics).unwrap();
        let fields = decode(&parsed).unwrap();
        assert_eq!(fields.title, "Review\nnotes");
        assert_eq!(fields, task.fields());
    }

    #[test]
    fn test_decode_ignores_description_text() {
        let task = draft_spec_task();
        let mut event = encode(&task, "uid", monday_nine(), None).unwrap();
        event.description = Some("Estimated hours: 99".to_string());

        assert_eq!(decode(&event).unwrap().estimated_hours, 2.5);
    }

    #[test]
    fn test_decode_unknown_priority_is_low() {
        let mut event = encode(&draft_spec_task(), "uid", monday_nine(), None).unwrap();
        event.priority = 3;
        assert_eq!(decode(&event).unwrap().priority, TaskPriority::Low);
    }

    #[test]
    fn test_decode_non_numeric_extension_is_zero() {
        let mut event = encode(&draft_spec_task(), "uid", monday_nine(), None).unwrap();
        event.set_extension(ext::ESTIMATED_HOURS, "about three");
        event.set_extension(ext::CONFIDENCE, "high");

        let fields = decode(&event).unwrap();
        assert_eq!(fields.estimated_hours, 0.0);
        assert_eq!(fields.confidence_score, Some(0.0));
    }

    #[test]
    fn test_decode_requires_task_id() {
        let mut event = encode(&draft_spec_task(), "uid", monday_nine(), None).unwrap();
        event.extensions.remove(ext::ID);
        assert!(matches!(decode(&event), Err(PmSyncError::Codec(_))));
    }

    #[test]
    fn test_description_duplicates_numbers() {
        let mut task = draft_spec_task();
        task.hourly_rate = Some(80.0);
        let description = render_description(&task);

        assert!(description.starts_with("Write the first draft"));
        assert!(description.contains("Estimated hours: 2.5"));
        assert!(description.contains("Hourly rate: 80"));
        assert!(description.contains("Status: in_progress"));
        assert!(description.contains("Confidence: 80%"));
    }
}

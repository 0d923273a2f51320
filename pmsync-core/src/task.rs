//! Task records as handed to the sync core by the surrounding service.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_TASK_HOURS;
use crate::error::{PmSyncError, PmSyncResult};

/// A unit of project work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub estimated_hours: f64,
    #[serde(default)]
    pub actual_hours: Option<f64>,
    /// Planned duration; falls back to `estimated_hours` when absent.
    #[serde(default)]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Confidence in the estimate, in [0, 1].
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub confidence_rationale: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    /// Uid of the event this task was last mirrored to.
    #[serde(default)]
    pub mirrored_event_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subset of task fields carried losslessly by a calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFields {
    pub id: i64,
    pub title: String,
    pub estimated_hours: f64,
    pub duration_hours: f64,
    pub hourly_rate: Option<f64>,
    pub confidence_score: Option<f64>,
    pub confidence_rationale: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

impl TaskFields {
    /// Names of the fields that differ between `self` and `other`.
    pub fn differing_fields(&self, other: &TaskFields) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.id != other.id {
            fields.push("id");
        }
        if self.title != other.title {
            fields.push("title");
        }
        if self.estimated_hours != other.estimated_hours {
            fields.push("estimated_hours");
        }
        if self.duration_hours != other.duration_hours {
            fields.push("duration_hours");
        }
        if self.hourly_rate != other.hourly_rate {
            fields.push("hourly_rate");
        }
        if self.confidence_score != other.confidence_score {
            fields.push("confidence_score");
        }
        if self.confidence_rationale != other.confidence_rationale {
            fields.push("confidence_rationale");
        }
        if self.status != other.status {
            fields.push("status");
        }
        if self.priority != other.priority {
            fields.push("priority");
        }
        fields
    }
}

impl Task {
    pub fn new(id: i64, project_id: i64, title: &str, estimated_hours: f64) -> Self {
        Task {
            id,
            project_id,
            title: title.to_string(),
            description: String::new(),
            estimated_hours,
            actual_hours: None,
            duration_hours: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            confidence_score: None,
            confidence_rationale: None,
            hourly_rate: None,
            mirrored_event_id: None,
        }
    }

    /// Hours the mirrored event spans.
    pub fn effective_duration(&self) -> f64 {
        self.duration_hours.unwrap_or(self.estimated_hours)
    }

    /// Text used where a single label is needed: the title, else the description.
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.description
        } else {
            &self.title
        }
    }

    /// Check the fields the engine requires before mirroring.
    pub fn validate(&self) -> PmSyncResult<()> {
        if self.title.trim().is_empty() && self.description.trim().is_empty() {
            return Err(PmSyncError::Validation(format!(
                "Missing required fields: task {} has neither title nor description",
                self.id
            )));
        }
        if !(self.estimated_hours > 0.0) || !self.estimated_hours.is_finite() {
            return Err(PmSyncError::Validation(format!(
                "estimated_hours must be positive (task {}: {})",
                self.id, self.estimated_hours
            )));
        }
        let duration = self.effective_duration();
        if !(duration > 0.0) || !duration.is_finite() {
            return Err(PmSyncError::Validation(format!(
                "duration_hours must be positive (task {}: {})",
                self.id, duration
            )));
        }
        if self.estimated_hours > MAX_TASK_HOURS || duration > MAX_TASK_HOURS {
            return Err(PmSyncError::Validation(format!(
                "task {} exceeds {} hours (estimated {}, duration {})",
                self.id, MAX_TASK_HOURS, self.estimated_hours, duration
            )));
        }
        Ok(())
    }

    /// Move the task forward in its lifecycle.
    ///
    /// Status never moves backwards, and `completed` requires `actual_hours`.
    pub fn advance_status(&mut self, next: TaskStatus) -> PmSyncResult<()> {
        if next < self.status {
            return Err(PmSyncError::Validation(format!(
                "task {} cannot move from {} back to {}",
                self.id, self.status, next
            )));
        }
        if next == TaskStatus::Completed && self.actual_hours.is_none() {
            return Err(PmSyncError::Validation(format!(
                "task {} cannot be completed without actual_hours",
                self.id
            )));
        }
        self.status = next;
        Ok(())
    }

    /// The encoded subset. Line endings are normalized to `\n`, the only
    /// form the wire format keeps.
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            id: self.id,
            title: normalize_newlines(&self.title),
            estimated_hours: self.estimated_hours,
            duration_hours: self.effective_duration(),
            hourly_rate: self.hourly_rate,
            confidence_score: self.confidence_score,
            confidence_rationale: self.confidence_rationale.as_deref().map(normalize_newlines),
            status: self.status,
            priority: self.priority,
        }
    }
}

/// Replace CRLF and lone CR with LF.
pub(crate) fn normalize_newlines(s: &str) -> String {
    if !s.contains('\r') {
        return s.to_string();
    }
    s.replace("\r\n", "\n").replace('\r', "\n")
}

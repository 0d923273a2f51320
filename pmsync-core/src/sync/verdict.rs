use serde::{Deserialize, Serialize};

/// Outcome of syncing one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Synced { event_id: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskVerdict {
    pub task_id: i64,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl TaskVerdict {
    pub fn synced(task_id: i64, event_id: impl Into<String>) -> Self {
        TaskVerdict {
            task_id,
            verdict: Verdict::Synced {
                event_id: event_id.into(),
            },
        }
    }

    pub fn failed(task_id: i64, reason: impl Into<String>) -> Self {
        TaskVerdict {
            task_id,
            verdict: Verdict::Failed {
                reason: reason.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncedTask {
    pub task_id: i64,
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTask {
    pub task_id: i64,
    pub error: String,
}

/// Batch result of `sync_all`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncAllReport {
    pub synced_count: usize,
    pub failed_count: usize,
    pub synced: Vec<SyncedTask>,
    pub failed: Vec<FailedTask>,
}

impl FromIterator<TaskVerdict> for SyncAllReport {
    fn from_iter<I: IntoIterator<Item = TaskVerdict>>(iter: I) -> Self {
        let mut report = SyncAllReport::default();
        for TaskVerdict { task_id, verdict } in iter {
            match verdict {
                Verdict::Synced { event_id } => {
                    report.synced.push(SyncedTask { task_id, event_id })
                }
                Verdict::Failed { reason } => report.failed.push(FailedTask {
                    task_id,
                    error: reason,
                }),
            }
        }
        report.synced_count = report.synced.len();
        report.failed_count = report.failed.len();
        report
    }
}

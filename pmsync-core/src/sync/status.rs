//! Reconciliation of tasks against their mirrored events.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codec::decode;
use crate::error::{PmSyncError, PmSyncResult};
use crate::event::CalendarEvent;
use crate::path::CollectionPath;
use crate::store::{Collection, CollectionStore};
use crate::sync::SyncEngine;
use crate::task::{Task, TaskFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncClass {
    InSync,
    Drifted,
    Missing,
}

impl SyncClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncClass::InSync => "in_sync",
            SyncClass::Drifted => "drifted",
            SyncClass::Missing => "missing",
        }
    }
}

impl fmt::Display for SyncClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSyncStatus {
    pub task_id: i64,
    pub status: SyncClass,
    /// Uid of the matching event, if any.
    pub event_id: Option<String>,
    /// Why the task is not in sync.
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStatusReport {
    pub total: usize,
    pub in_sync: usize,
    pub drifted: usize,
    pub missing: usize,
    pub tasks: Vec<TaskSyncStatus>,
}

impl SyncStatusReport {
    pub fn is_converged(&self) -> bool {
        self.in_sync == self.total
    }
}

const MISSING_REASON: &str = "no event carries this task id";

/// Classify each task against `events`.
///
/// Events that cannot be decoded are logged and ignored. When several
/// events carry the same task id, the one named by the task's mirrored id
/// wins, then the first seen.
pub fn reconcile(events: &[CalendarEvent], tasks: &[Task]) -> SyncStatusReport {
    let mut index: HashMap<i64, Vec<(&CalendarEvent, TaskFields)>> = HashMap::new();
    for event in events {
        match decode(event) {
            Ok(fields) => index.entry(fields.id).or_default().push((event, fields)),
            Err(e) => warn!(uid = %event.uid, error = %e, "Skipping undecodable event"),
        }
    }

    let mut report = SyncStatusReport {
        total: tasks.len(),
        ..Default::default()
    };

    for task in tasks {
        let candidates = index.get(&task.id).map(Vec::as_slice).unwrap_or_default();
        let matched = candidates
            .iter()
            .find(|(event, _)| task.mirrored_event_id.as_deref() == Some(event.uid.as_str()))
            .or_else(|| candidates.first());

        let status = match matched {
            None => {
                report.missing += 1;
                TaskSyncStatus {
                    task_id: task.id,
                    status: SyncClass::Missing,
                    event_id: None,
                    reason: Some(MISSING_REASON.to_string()),
                }
            }
            Some((event, fields)) => {
                let differing = task.fields().differing_fields(fields);
                let (status, reason) = if differing.is_empty() {
                    report.in_sync += 1;
                    (SyncClass::InSync, None)
                } else {
                    report.drifted += 1;
                    (SyncClass::Drifted, Some(differing.join(", ")))
                };
                TaskSyncStatus {
                    task_id: task.id,
                    status,
                    event_id: Some(event.uid.clone()),
                    reason,
                }
            }
        };
        report.tasks.push(status);
    }

    report
}

impl<S: CollectionStore> SyncEngine<S> {
    /// Reconcile `tasks` against the owner's default calendar.
    pub async fn sync_status(&self, owner: &str, tasks: &[Task]) -> PmSyncResult<SyncStatusReport> {
        let path = self.calendar_path(owner)?;
        self.sync_status_in(&path, tasks).await
    }

    /// Reconcile `tasks` against the collection at `path`. A missing
    /// collection reports every task as missing.
    pub async fn sync_status_in(
        &self,
        path: &CollectionPath,
        tasks: &[Task],
    ) -> PmSyncResult<SyncStatusReport> {
        let events = match self.store().open(path).await {
            Ok(collection) => self.store().list(&collection).await?,
            Err(PmSyncError::CollectionNotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(reconcile(&events, tasks))
    }

    /// First event in the collection mirroring `task_id`.
    pub async fn find_task_event(
        &self,
        path: &CollectionPath,
        task_id: i64,
    ) -> PmSyncResult<Option<CalendarEvent>> {
        match self.store().open(path).await {
            Ok(collection) => self.find_in(&collection, task_id).await,
            Err(PmSyncError::CollectionNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn find_in(
        &self,
        collection: &Collection,
        task_id: i64,
    ) -> PmSyncResult<Option<CalendarEvent>> {
        let events = self.store().list(collection).await?;
        Ok(events.into_iter().find(|event| event.task_id() == Some(task_id)))
    }
}

//! Mirrors tasks into a collection store.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::codec::{add_hours, encode};
use crate::config::PmSyncConfig;
use crate::date_range::DateRange;
use crate::error::{PmSyncError, PmSyncResult};
use crate::event::CalendarEvent;
use crate::ics::generate_feed;
use crate::path::{CollectionPath, validate_uid};
use crate::schedule::Scheduler;
use crate::store::{Collection, CollectionProps, CollectionStore};
use crate::sync::verdict::{SyncAllReport, TaskVerdict};
use crate::task::Task;

/// Where the mirrored event is placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOptions {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Without an explicit start, place the event in the task's first
    /// working slot from today instead of at the current instant.
    pub auto_schedule: bool,
}

impl SyncOptions {
    pub fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        SyncOptions {
            start: Some(start),
            end: Some(end),
            auto_schedule: false,
        }
    }

    pub fn auto_scheduled() -> Self {
        SyncOptions {
            auto_schedule: true,
            ..Default::default()
        }
    }
}

/// The sole writer of task events.
///
/// Callers serialize mutations per task; the engine does not lock across
/// callers.
pub struct SyncEngine<S> {
    store: S,
    config: PmSyncConfig,
    scheduler: Scheduler,
}

impl<S: CollectionStore> SyncEngine<S> {
    /// Fails with [`PmSyncError::Config`] when `config` does not validate.
    pub fn new(store: S, config: PmSyncConfig) -> PmSyncResult<Self> {
        config.validate()?;
        let scheduler = Scheduler::new(config.working_hours)?;
        Ok(SyncEngine {
            store,
            config,
            scheduler,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PmSyncConfig {
        &self.config
    }

    /// `<owner>/<calendar_name>`.
    pub fn calendar_path(&self, owner: &str) -> PmSyncResult<CollectionPath> {
        CollectionPath::new(owner, &self.config.calendar_name)
    }

    /// Open the collection, creating it with calendar properties if absent.
    pub async fn ensure_collection(&self, path: &CollectionPath) -> PmSyncResult<Collection> {
        match self.store.open(path).await {
            Ok(collection) => return Ok(collection),
            Err(PmSyncError::CollectionNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let props = CollectionProps::calendar(path.name());
        match self
            .with_retry("create", || self.store.create(path, &props))
            .await
        {
            Ok(collection) => {
                info!(path = %path, "Created calendar collection");
                Ok(collection)
            }
            // Lost a creation race; the collection is there now.
            Err(PmSyncError::AlreadyExists(_)) => self.store.open(path).await,
            Err(e) => Err(e),
        }
    }

    /// Write the task's event and return its uid.
    ///
    /// The caller persists the uid as `mirrored_event_id`; see
    /// [`sync_and_link`](Self::sync_and_link).
    pub async fn sync(
        &self,
        task: &Task,
        path: &CollectionPath,
        options: &SyncOptions,
    ) -> PmSyncResult<String> {
        let collection = self.ensure_collection(path).await?;
        task.validate()?;

        let (start, end) = self.resolve_window(task, options)?;
        let uid = self.resolve_uid(task, &collection).await?;
        let event = encode(task, &uid, start, Some(end))?;

        self.with_retry("put", || self.store.put(&collection, &event))
            .await?;

        info!(task_id = task.id, uid = %uid, path = %path, "Synced task");
        Ok(uid)
    }

    /// [`sync`](Self::sync), then record the uid on the task.
    ///
    /// The task is left untouched when the sync fails.
    pub async fn sync_and_link(
        &self,
        task: &mut Task,
        path: &CollectionPath,
        options: &SyncOptions,
    ) -> PmSyncResult<String> {
        let uid = self.sync(task, path, options).await?;
        task.mirrored_event_id = Some(uid.clone());
        Ok(uid)
    }

    /// Remove the task's event. Succeeds when there is nothing to remove.
    pub async fn unsync(&self, task: &Task, path: &CollectionPath) -> PmSyncResult<()> {
        let collection = match self.store.open(path).await {
            Ok(collection) => collection,
            Err(PmSyncError::CollectionNotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };

        let uid = match task.mirrored_event_id.as_deref() {
            Some(uid) if validate_uid(uid).is_ok() => Some(uid.to_string()),
            _ => self
                .find_in(&collection, task.id)
                .await?
                .map(|event| event.uid),
        };

        let Some(uid) = uid else {
            debug!(task_id = task.id, path = %path, "No event to remove");
            return Ok(());
        };

        self.with_retry("delete", || self.store.delete(&collection, &uid))
            .await?;
        info!(task_id = task.id, uid = %uid, path = %path, "Removed task event");
        Ok(())
    }

    /// Sync every task, collecting a verdict per task.
    pub async fn sync_all(&self, tasks: &[Task], path: &CollectionPath) -> SyncAllReport {
        let mut verdicts = Vec::with_capacity(tasks.len());
        for task in tasks {
            verdicts.push(self.verdict_for(task, path, &SyncOptions::default()).await);
        }
        self.summarize(path, verdicts)
    }

    /// Plan the tasks together from `start_date`, then sync each into its
    /// planned window. Tasks the scheduler skips fall back to `now()`.
    pub async fn sync_all_scheduled(
        &self,
        tasks: &[Task],
        path: &CollectionPath,
        start_date: NaiveDate,
    ) -> SyncAllReport {
        let plan = self.scheduler.schedule(tasks, start_date);

        let mut verdicts = Vec::with_capacity(tasks.len());
        for task in tasks {
            let options = match plan.window_for(task.id) {
                Some((start, end)) => SyncOptions::window(start, end),
                None => SyncOptions::default(),
            };
            verdicts.push(self.verdict_for(task, path, &options).await);
        }
        self.summarize(path, verdicts)
    }

    /// Events whose start or end falls inside `range`, earliest first.
    pub async fn events_in_range(
        &self,
        path: &CollectionPath,
        range: &DateRange,
    ) -> PmSyncResult<Vec<CalendarEvent>> {
        let collection = self.store.open(path).await?;
        let mut events: Vec<CalendarEvent> = self
            .store
            .list(&collection)
            .await?
            .into_iter()
            .filter(|event| range.matches(event))
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.uid.cmp(&b.uid)));
        Ok(events)
    }

    /// The whole collection as one VCALENDAR named after its display name.
    pub async fn ics_feed(&self, path: &CollectionPath) -> PmSyncResult<String> {
        let events = self.events_in_range(path, &DateRange::default()).await?;
        let collection = self.store.open(path).await?;
        generate_feed(&collection.props.displayname, &events)
    }

    async fn verdict_for(
        &self,
        task: &Task,
        path: &CollectionPath,
        options: &SyncOptions,
    ) -> TaskVerdict {
        match self.sync(task, path, options).await {
            Ok(uid) => TaskVerdict::synced(task.id, uid),
            Err(e) => {
                warn!(task_id = task.id, error = %e, "Task sync failed");
                TaskVerdict::failed(task.id, e.to_string())
            }
        }
    }

    fn summarize(&self, path: &CollectionPath, verdicts: Vec<TaskVerdict>) -> SyncAllReport {
        let report: SyncAllReport = verdicts.into_iter().collect();
        info!(
            path = %path,
            synced = report.synced_count,
            failed = report.failed_count,
            "Batch sync finished"
        );
        report
    }

    fn resolve_window(
        &self,
        task: &Task,
        options: &SyncOptions,
    ) -> PmSyncResult<(DateTime<Utc>, DateTime<Utc>)> {
        let start = match options.start {
            Some(start) => start,
            None if options.auto_schedule => {
                let plan = self
                    .scheduler
                    .schedule_from_today(std::slice::from_ref(task));
                match (plan.window_for(task.id), options.end) {
                    (Some((start, end)), None) => return Ok((start, end)),
                    (Some((start, _)), Some(_)) => start,
                    (None, _) => Utc::now(),
                }
            }
            None => Utc::now(),
        };

        let end = match options.end {
            Some(end) if end > start => end,
            _ => add_hours(start, task.effective_duration()).ok_or_else(|| {
                PmSyncError::Validation(format!(
                    "task {} duration of {} hours does not fit after {}",
                    task.id,
                    task.effective_duration(),
                    start
                ))
            })?,
        };
        Ok((start, end))
    }

    /// Reuse the mirrored uid while its event still exists.
    async fn resolve_uid(&self, task: &Task, collection: &Collection) -> PmSyncResult<String> {
        if let Some(ref uid) = task.mirrored_event_id {
            if validate_uid(uid).is_ok() {
                match self
                    .with_retry("get", || self.store.get(collection, uid))
                    .await
                {
                    Ok(_) => return Ok(uid.clone()),
                    Err(e) if e.is_not_found() => {
                        debug!(task_id = task.id, uid = %uid, "Mirrored event is gone, allocating a new uid");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(uuid::Uuid::new_v4().to_string())
    }

    /// Run `op` until it succeeds, fails terminally, or the attempt bound is hit.
    async fn with_retry<T, F, Fut>(&self, operation: &'static str, mut op: F) -> PmSyncResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PmSyncResult<T>>,
    {
        let attempts = self.config.retry_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(operation, attempt, error = %e, "Store operation failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

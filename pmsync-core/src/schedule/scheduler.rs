//! First-fit task scheduler.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::add_hours;
use crate::config::WorkingHours;
use crate::constants::{HOURS_EPSILON, MAX_TASK_HOURS};
use crate::error::PmSyncResult;
use crate::schedule::{is_weekend, window_start};
use crate::task::Task;

/// One contiguous block of a task on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub date: NaiveDate,
    pub task_id: i64,
    pub description: String,
    pub hours: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub assignments: Vec<Assignment>,
    /// Number of distinct dates used.
    pub total_duration_days: usize,
    pub earliest_start: Option<NaiveDate>,
    pub latest_end: Option<DateTime<Utc>>,
}

impl SchedulePlan {
    fn from_assignments(assignments: Vec<Assignment>) -> Self {
        let dates: BTreeSet<NaiveDate> = assignments.iter().map(|a| a.date).collect();

        SchedulePlan {
            total_duration_days: dates.len(),
            earliest_start: dates.first().copied(),
            latest_end: assignments.iter().map(|a| a.end).max(),
            assignments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Assignments of one task, in plan order.
    pub fn for_task(&self, task_id: i64) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(move |a| a.task_id == task_id)
    }

    /// Span from the task's first block start to its last block end.
    pub fn window_for(&self, task_id: i64) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut blocks = self.for_task(task_id);
        let first = blocks.next()?;
        let last = blocks.last().unwrap_or(first);
        Some((first.start, last.end))
    }
}

/// Where the next block goes.
struct Cursor {
    date: NaiveDate,
    time: DateTime<Utc>,
    hours_left: f64,
}

impl Cursor {
    fn at(date: NaiveDate, window: &WorkingHours) -> Self {
        Cursor {
            date,
            time: window_start(date, window),
            hours_left: window.hours_per_day,
        }
    }

    /// Move to the next day's window; `false` past the last representable date.
    fn next_day(&mut self, window: &WorkingHours) -> bool {
        match self.date.succ_opt() {
            Some(next) => {
                *self = Cursor::at(next, window);
                true
            }
            None => false,
        }
    }
}

/// Packs tasks into weekday working windows in input order.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    window: WorkingHours,
}

impl Scheduler {
    /// Fails when the window has no positive length or runs past midnight.
    pub fn new(window: WorkingHours) -> PmSyncResult<Self> {
        window.validate()?;
        Ok(Scheduler { window })
    }

    /// Plan `tasks` starting at the working window of `start_date`.
    ///
    /// Tasks longer than a day are split across consecutive working days.
    /// Tasks with no positive estimate, or more than [`MAX_TASK_HOURS`], are
    /// skipped.
    pub fn schedule(&self, tasks: &[Task], start_date: NaiveDate) -> SchedulePlan {
        let mut cursor = Cursor::at(start_date, &self.window);
        let mut assignments = Vec::new();

        'tasks: for task in tasks {
            if !(task.estimated_hours > HOURS_EPSILON) || !task.estimated_hours.is_finite() {
                debug!(task_id = task.id, hours = task.estimated_hours, "Skipping task without estimate");
                continue;
            }
            if task.estimated_hours > MAX_TASK_HOURS {
                debug!(task_id = task.id, hours = task.estimated_hours, "Skipping oversized task");
                continue;
            }

            let mut remaining = task.estimated_hours;
            while remaining > HOURS_EPSILON {
                if is_weekend(cursor.date) || cursor.hours_left <= HOURS_EPSILON {
                    if !cursor.next_day(&self.window) {
                        warn!(task_id = task.id, "Ran out of calendar while scheduling");
                        break 'tasks;
                    }
                    continue;
                }

                let allocated = remaining.min(cursor.hours_left);
                let Some(end) = add_hours(cursor.time, allocated) else {
                    warn!(task_id = task.id, "Ran out of calendar while scheduling");
                    break 'tasks;
                };
                assignments.push(Assignment {
                    date: cursor.date,
                    task_id: task.id,
                    description: task.label().to_string(),
                    hours: allocated,
                    start: cursor.time,
                    end,
                });

                remaining -= allocated;
                cursor.time = end;
                cursor.hours_left -= allocated;
            }
        }

        SchedulePlan::from_assignments(assignments)
    }

    pub fn schedule_from_today(&self, tasks: &[Task]) -> SchedulePlan {
        self.schedule(tasks, Utc::now().date_naive())
    }
}

use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use pmsync_core::{CollectionStore, SyncEngine};

use super::print_json;
use crate::tasks_file;

pub async fn run<S: CollectionStore>(
    engine: &SyncEngine<S>,
    tasks_path: &Path,
    owner: &str,
    task_id: i64,
    json: bool,
) -> Result<()> {
    let mut tasks = tasks_file::load(tasks_path)?;
    let path = engine.calendar_path(owner)?;

    let task = tasks_file::find_mut(&mut tasks, task_id)?;
    engine.unsync(task, &path).await?;
    let removed = task.mirrored_event_id.take();
    tasks_file::save(tasks_path, &tasks)?;

    if json {
        return print_json(&serde_json::json!({
            "task_id": task_id,
            "removed_event_id": removed,
        }));
    }

    match removed {
        Some(uid) => println!("{} Removed event {} for task {}", "✓".green(), uid.dimmed(), task_id),
        None => println!("{} Task {} had no linked event", "✓".green(), task_id),
    }
    Ok(())
}

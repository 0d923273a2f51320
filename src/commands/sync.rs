use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use pmsync_core::{CollectionStore, SyncEngine};

use super::print_json;
use crate::tasks_file;

pub async fn run<S: CollectionStore>(
    engine: &SyncEngine<S>,
    tasks_path: &Path,
    owner: &str,
    start_date: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let mut tasks = tasks_file::load(tasks_path)?;
    let path = engine.calendar_path(owner)?;

    let report = match start_date {
        Some(date) => engine.sync_all_scheduled(&tasks, &path, date).await,
        None => engine.sync_all(&tasks, &path).await,
    };

    // Only successful syncs update the stored link.
    for synced in &report.synced {
        if let Ok(task) = tasks_file::find_mut(&mut tasks, synced.task_id) {
            task.mirrored_event_id = Some(synced.event_id.clone());
        }
    }
    if report.synced_count > 0 {
        tasks_file::save(tasks_path, &tasks)?;
    }

    if json {
        return print_json(&report);
    }

    println!("📅 {}", path);
    for synced in &report.synced {
        println!("   {} task {} {}", "✓".green(), synced.task_id, synced.event_id.dimmed());
    }
    for failed in &report.failed {
        println!("   {} task {} {}", "✗".red(), failed.task_id, failed.error.red());
    }
    println!(
        "\n{} synced, {} failed",
        report.synced_count.green(),
        report.failed_count.red()
    );

    Ok(())
}

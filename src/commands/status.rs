use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use pmsync_core::{CollectionStore, SyncEngine};

use super::print_json;
use crate::render::Render;
use crate::tasks_file;

pub async fn run<S: CollectionStore>(
    engine: &SyncEngine<S>,
    tasks_path: &Path,
    owner: &str,
    json: bool,
) -> Result<()> {
    let tasks = tasks_file::load(tasks_path)?;
    let report = engine.sync_status(owner, &tasks).await?;

    if json {
        return print_json(&report);
    }

    println!("📅 {}", engine.calendar_path(owner)?);
    if report.is_converged() {
        println!("   {}", "Everything up to date".dimmed());
        return Ok(());
    }

    for task in report.tasks.iter().filter(|t| t.reason.is_some()) {
        println!("   {}", task.render());
    }
    println!(
        "\n{} in sync, {} drifted, {} missing",
        report.in_sync.green(),
        report.drifted.yellow(),
        report.missing.red()
    );

    Ok(())
}

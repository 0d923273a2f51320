use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use pmsync_core::PmSyncConfig;
use pmsync_core::schedule::Scheduler;

use super::print_json;
use crate::render::Render;
use crate::tasks_file;

pub fn run(config: &PmSyncConfig, tasks_path: &Path, start_date: NaiveDate, json: bool) -> Result<()> {
    let tasks = tasks_file::load(tasks_path)?;
    let plan = Scheduler::new(config.working_hours)?.schedule(&tasks, start_date);

    if json {
        return print_json(&plan);
    }

    if plan.is_empty() {
        println!("{}", "No tasks to schedule".dimmed());
        return Ok(());
    }

    for assignment in &plan.assignments {
        println!("{}", assignment.render());
    }
    if let (Some(first), Some(last)) = (plan.earliest_start, plan.latest_end) {
        println!(
            "\n{} working days, {} → {}",
            plan.total_duration_days,
            first,
            last.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

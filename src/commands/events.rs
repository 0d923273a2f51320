use anyhow::Result;
use owo_colors::OwoColorize;
use pmsync_core::{CollectionStore, DateRange, SyncEngine};

use super::print_json;
use crate::render::Render;

pub async fn run<S: CollectionStore>(
    engine: &SyncEngine<S>,
    owner: &str,
    range: &DateRange,
    json: bool,
) -> Result<()> {
    let path = engine.calendar_path(owner)?;
    let events = engine.events_in_range(&path, range).await?;

    if json {
        return print_json(&events);
    }

    println!("📅 {}", path);
    if events.is_empty() {
        println!("   {}", "No events".dimmed());
    }
    for event in &events {
        match event.task_id() {
            Some(id) => println!("   #{} {}", id, event.render()),
            None => println!("   {}", event.render()),
        }
    }
    Ok(())
}

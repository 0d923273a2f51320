use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use pmsync_core::PmSyncConfig;
use pmsync_core::schedule::available_slots;

use super::print_json;
use crate::render::Render;

pub fn run(config: &PmSyncConfig, from: NaiveDate, to: NaiveDate, json: bool) -> Result<()> {
    let slots = available_slots(from, to, &config.working_hours)?;

    if json {
        return print_json(&slots);
    }

    if slots.is_empty() {
        println!("{}", "No working days in range".dimmed());
    }
    for slot in &slots {
        println!("{}", slot.render());
    }
    Ok(())
}

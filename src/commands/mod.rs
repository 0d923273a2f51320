pub mod config;
pub mod events;
pub mod feed;
pub mod schedule;
pub mod slots;
pub mod status;
pub mod sync;
pub mod unsync;
pub mod validate;

use anyhow::Result;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};
use pmsync_core::{CollectionStore, SyncEngine};

pub async fn run<S: CollectionStore>(
    engine: &SyncEngine<S>,
    owner: &str,
    output: Option<&Path>,
) -> Result<()> {
    let path = engine.calendar_path(owner)?;
    let feed = engine.ics_feed(&path).await?;

    match output {
        Some(file) => std::fs::write(file, feed)
            .with_context(|| format!("Could not write feed to {}", file.display()))?,
        None => print!("{}", feed),
    }
    Ok(())
}

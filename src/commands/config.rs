use anyhow::Result;
use owo_colors::OwoColorize;
use pmsync_core::PmSyncConfig;

pub fn run(config: &PmSyncConfig) -> Result<()> {
    let config_path = PmSyncConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:       {}", config_path.display());
    println!("  Collections:  {}", config.storage_path().display());
    println!();
    println!("{}", "Settings".bold());
    for line in config.to_toml_string()?.lines() {
        println!("  {}", line);
    }

    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pmsync_core::PmSyncConfig;
use pmsync_core::schedule::{ProposedAssignment, validate};

use super::print_json;

pub fn run(config: &PmSyncConfig, assignments_path: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(assignments_path)
        .with_context(|| format!("Could not read {}", assignments_path.display()))?;
    let assignments: Vec<ProposedAssignment> = serde_json::from_str(&content)
        .with_context(|| format!("Could not parse assignments in {}", assignments_path.display()))?;

    let report = validate(&assignments, &config.working_hours);

    if json {
        print_json(&report)?;
    } else {
        for conflict in &report.conflicts {
            println!("{} {}", "✗".red(), conflict);
        }
        for warning in &report.warnings {
            println!("{} {}", "!".yellow(), warning);
        }
        if report.is_valid {
            println!("{} Schedule is valid", "✓".green());
        }
    }

    if !report.is_valid {
        anyhow::bail!("{} conflict(s) found", report.conflicts.len());
    }
    Ok(())
}

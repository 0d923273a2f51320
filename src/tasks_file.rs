//! The JSON task file the CLI works on.

use std::path::Path;

use anyhow::{Context, Result};
use pmsync_core::Task;
use tracing::debug;

pub fn load(path: &Path) -> Result<Vec<Task>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read task file {}", path.display()))?;
    let tasks = serde_json::from_str(&content)
        .with_context(|| format!("Could not parse task file {}", path.display()))?;
    Ok(tasks)
}

/// Rewrite the task file in place, through a sibling temp file.
pub fn save(path: &Path, tasks: &[Task]) -> Result<()> {
    let mut content = serde_json::to_string_pretty(tasks)?;
    content.push('\n');

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tasks.json".to_string());
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content)
        .with_context(|| format!("Could not write {}", temp.display()))?;
    std::fs::rename(&temp, path)
        .with_context(|| format!("Could not replace task file {}", path.display()))?;
    debug!(path = %path.display(), tasks = tasks.len(), "Saved task file");
    Ok(())
}

pub fn find_mut(tasks: &mut [Task], task_id: i64) -> Result<&mut Task> {
    tasks
        .iter_mut()
        .find(|task| task.id == task_id)
        .ok_or_else(|| anyhow::anyhow!("Task {} not found in task file", task_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load_keeps_mirrored_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tasks.json");
        std::fs::write(
            &path,
            r#"[{"id": 1, "project_id": 2, "title": "Write", "estimated_hours": 3}]"#,
        )
        .unwrap();

        let mut tasks = load(&path).unwrap();
        assert_eq!(tasks[0].mirrored_event_id, None);
        find_mut(&mut tasks, 1).unwrap().mirrored_event_id = Some("uid-1".to_string());
        save(&path, &tasks).unwrap();

        let reloaded = load(&path).unwrap();
        assert_eq!(reloaded, tasks);
        assert!(!tmp.path().join(".tasks.json.tmp").exists());
    }

    #[test]
    fn test_missing_task_is_an_error() {
        let mut tasks = vec![Task::new(1, 1, "Only", 1.0)];
        assert!(find_mut(&mut tasks, 2).is_err());
    }
}

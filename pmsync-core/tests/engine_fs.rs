use chrono::{TimeZone, Utc};
use pmsync_core::sync::SyncClass;
use pmsync_core::{
    CollectionPath, CollectionStore, DateRange, FsStore, PmSyncConfig, SyncEngine, SyncOptions,
    Task, TaskStatus,
};

fn engine(root: &std::path::Path) -> SyncEngine<FsStore> {
    SyncEngine::new(FsStore::new(root), PmSyncConfig::default()).unwrap()
}

fn morning() -> SyncOptions {
    SyncOptions {
        start: Some(Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()),
        ..Default::default()
    }
}

#[tokio::test]
async fn sync_writes_event_file_into_owner_calendar() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = engine(tmp.path());
    let path = engine.calendar_path("42").unwrap();

    let uid = engine
        .sync(&Task::new(1, 3, "Draft spec", 2.5), &path, &morning())
        .await
        .unwrap();

    let dir = tmp.path().join("42").join("PM Tool");
    assert!(dir.join(".properties").is_file());
    let ics = std::fs::read_to_string(dir.join(format!("{uid}.ics"))).unwrap();
    assert!(ics.contains("SUMMARY:Draft spec"));
    assert!(ics.contains("DTSTART:20250602T090000Z"));
    assert!(ics.contains("DTEND:20250602T113000Z"));
    assert!(ics.contains("X-PM-TOOL-ID:1"));
    assert!(ics.contains("X-PM-TOOL-ESTIMATED-HOURS:2.5"));
    assert!(ics.contains("CATEGORIES:PM Tool Task"));
}

#[tokio::test]
async fn resync_replaces_the_same_file() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = engine(tmp.path());
    let path = engine.calendar_path("42").unwrap();
    let mut task = Task::new(1, 3, "Draft spec", 2.5);

    let first = engine.sync_and_link(&mut task, &path, &morning()).await.unwrap();
    task.actual_hours = Some(3.0);
    task.advance_status(TaskStatus::InProgress).unwrap();
    let second = engine.sync_and_link(&mut task, &path, &morning()).await.unwrap();
    assert_eq!(first, second);

    let dir = tmp.path().join("42").join("PM Tool");
    let ics_files = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".ics"))
        .count();
    assert_eq!(ics_files, 1);

    let collection = engine.store().open(&path).await.unwrap();
    let event = engine.store().get(&collection, &first).await.unwrap();
    assert_eq!(event.status.as_ics_str(), "IN-PROCESS");
}

#[tokio::test]
async fn status_reads_back_through_the_wire_format() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = engine(tmp.path());
    let path = engine.calendar_path("7").unwrap();

    let mut detailed = Task::new(2, 1, "Estimate review", 3.5);
    detailed.duration_hours = Some(4.0);
    detailed.hourly_rate = Some(95.5);
    detailed.confidence_score = Some(0.8);
    detailed.confidence_rationale = Some("clear".to_string());
    let mut tasks = vec![Task::new(1, 1, "Kickoff", 1.0), detailed, Task::new(3, 1, "Never synced", 2.0)];

    for task in tasks.iter_mut().take(2) {
        engine.sync_and_link(task, &path, &morning()).await.unwrap();
    }
    tasks[0].title = "Kickoff meeting".to_string();

    let report = engine.sync_status("7", &tasks).await.unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.in_sync, 1);
    assert_eq!(report.drifted, 1);
    assert_eq!(report.missing, 1);
    assert_eq!(report.tasks[0].status, SyncClass::Drifted);
    assert_eq!(report.tasks[0].reason.as_deref(), Some("title"));
    assert_eq!(report.tasks[1].status, SyncClass::InSync);
    assert_eq!(report.tasks[2].status, SyncClass::Missing);
}

#[tokio::test]
async fn crlf_text_converges_after_sync() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = engine(tmp.path());
    let path = engine.calendar_path("7").unwrap();

    let mut task = Task::new(3, 1, "Review\r\nnotes", 1.0);
    task.confidence_rationale = Some("from form\r\nsecond".to_string());
    engine.sync_and_link(&mut task, &path, &morning()).await.unwrap();

    let report = engine.sync_status("7", std::slice::from_ref(&task)).await.unwrap();
    assert_eq!(report.in_sync, 1, "{:?}", report.tasks);

    // A second sync rewrites the same file and stays converged.
    let uid = engine.sync_and_link(&mut task, &path, &morning()).await.unwrap();
    assert_eq!(task.mirrored_event_id.as_deref(), Some(uid.as_str()));
    assert!(engine.sync_status("7", &[task]).await.unwrap().is_converged());
}

#[tokio::test]
async fn unsync_removes_the_file_and_tolerates_repeats() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = engine(tmp.path());
    let path = CollectionPath::parse("alice@example.com/PM Tool").unwrap();
    let mut task = Task::new(5, 1, "Temporary", 1.0);

    let uid = engine.sync_and_link(&mut task, &path, &morning()).await.unwrap();
    let file = tmp
        .path()
        .join("alice@example.com")
        .join("PM Tool")
        .join(format!("{uid}.ics"));
    assert!(file.exists());

    engine.unsync(&task, &path).await.unwrap();
    assert!(!file.exists());
    engine.unsync(&task, &path).await.unwrap();
    assert!(engine.find_task_event(&path, 5).await.unwrap().is_none());
}

#[tokio::test]
async fn feed_and_range_queries_cover_the_collection() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = engine(tmp.path());
    let path = engine.calendar_path("9").unwrap();
    let tasks = vec![Task::new(1, 1, "Design", 10.0), Task::new(2, 1, "Build", 6.0)];

    let monday = chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    let report = engine.sync_all_scheduled(&tasks, &path, monday).await;
    assert_eq!(report.synced_count, 2);

    let feed = engine.ics_feed(&path).await.unwrap();
    assert!(feed.contains("X-WR-CALNAME:PM Tool"));
    assert_eq!(feed.matches("BEGIN:VEVENT").count(), 2);

    // Build runs Tuesday 11:00-17:00, so only it touches Tuesday afternoon.
    let range = DateRange::new(
        Some(Utc.with_ymd_and_hms(2025, 6, 3, 16, 0, 0).unwrap()),
        None,
    );
    let events = engine.events_in_range(&path, &range).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary, "Build");
}

//! Filesystem-backed collection store.
//!
//! Layout: `<root>/<owner>/<name>/<uid>.ics` plus `<root>/<owner>/<name>/.properties`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{PmSyncError, PmSyncResult};
use crate::event::CalendarEvent;
use crate::ics::{generate_ics, parse_event};
use crate::path::{CollectionPath, validate_uid};
use crate::store::{Collection, CollectionProps, CollectionStore};

const PROPERTIES_FILE: &str = ".properties";
const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, path: &CollectionPath) -> PathBuf {
        self.root.join(path.owner()).join(path.name())
    }

    fn event_path(&self, collection: &Collection, uid: &str) -> PathBuf {
        self.collection_dir(&collection.path)
            .join(format!("{}.ics", uid))
    }
}

impl CollectionStore for FsStore {
    async fn open(&self, path: &CollectionPath) -> PmSyncResult<Collection> {
        let dir = self.collection_dir(path);

        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(PmSyncError::CollectionNotFound(path.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PmSyncError::CollectionNotFound(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        let props = match tokio::fs::read_to_string(dir.join(PROPERTIES_FILE)).await {
            Ok(content) => serde_json::from_str(&content)?,
            // A directory created by hand still works as a calendar
            Err(e) if e.kind() == ErrorKind::NotFound => CollectionProps::calendar(path.name()),
            Err(e) => return Err(e.into()),
        };

        Ok(Collection {
            path: path.clone(),
            props,
        })
    }

    async fn create(
        &self,
        path: &CollectionPath,
        props: &CollectionProps,
    ) -> PmSyncResult<Collection> {
        let owner_dir = self.root.join(path.owner());
        let dir = self.collection_dir(path);

        if tokio::fs::try_exists(&dir).await? {
            return Err(PmSyncError::AlreadyExists(path.to_string()));
        }

        create_dir(&owner_dir).await?;
        create_dir(&dir).await?;

        let content = serde_json::to_string_pretty(props)?;
        write_atomic(&dir, PROPERTIES_FILE, content.as_bytes()).await?;

        debug!(path = %path, "Created collection directory");

        Ok(Collection {
            path: path.clone(),
            props: props.clone(),
        })
    }

    async fn put(&self, collection: &Collection, event: &CalendarEvent) -> PmSyncResult<()> {
        validate_uid(&event.uid)?;

        let dir = self.collection_dir(&collection.path);
        if !tokio::fs::try_exists(&dir).await? {
            return Err(PmSyncError::CollectionNotFound(collection.path.to_string()));
        }

        let content = generate_ics(event)?;
        write_atomic(&dir, &format!("{}.ics", event.uid), content.as_bytes()).await?;

        debug!(path = %collection.path, uid = %event.uid, "Wrote event file");
        Ok(())
    }

    async fn get(&self, collection: &Collection, uid: &str) -> PmSyncResult<CalendarEvent> {
        validate_uid(uid)?;

        let path = self.event_path(collection, uid);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PmSyncError::EventNotFound(format!("{}/{}", collection.path, uid)));
            }
            Err(e) => return Err(e.into()),
        };

        parse_event(&content)
    }

    async fn delete(&self, collection: &Collection, uid: &str) -> PmSyncResult<()> {
        validate_uid(uid)?;

        match tokio::fs::remove_file(self.event_path(collection, uid)).await {
            Ok(()) => {
                debug!(path = %collection.path, uid, "Deleted event file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, collection: &Collection) -> PmSyncResult<Vec<CalendarEvent>> {
        let dir = self.collection_dir(&collection.path);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PmSyncError::CollectionNotFound(collection.path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut events = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_event_file(&path) {
                continue;
            }

            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                // Deleted between read_dir and read
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            match parse_event(&content) {
                Ok(event) => events.push(event),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable event file"),
            }
        }

        Ok(events)
    }
}

/// `<uid>.ics`, excluding hidden files such as in-flight temp files.
fn is_event_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_none_or(|n| n.starts_with('.'));
    !hidden && path.extension().is_some_and(|e| e == "ics")
}

async fn create_dir(dir: &Path) -> PmSyncResult<()> {
    match tokio::fs::create_dir(dir).await {
        Ok(()) => set_mode(dir, DIR_MODE).await,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            // Missing root: create the ancestors first
            tokio::fs::create_dir_all(dir).await?;
            set_mode(dir, DIR_MODE).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Write `name` inside `dir` via a temp file and rename, so readers see the
/// old content or the new content and nothing in between.
async fn write_atomic(dir: &Path, name: &str, content: &[u8]) -> PmSyncResult<()> {
    let target = dir.join(name);
    let temp = dir.join(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()));

    let result = async {
        let mut file = tokio::fs::File::create(&temp).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        drop(file);
        set_mode(&temp, FILE_MODE).await?;
        tokio::fs::rename(&temp, &target).await?;
        Ok::<(), PmSyncError>(())
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&temp).await;
    }
    result
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> PmSyncResult<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> PmSyncResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use crate::task::Task;
    use chrono::{TimeZone, Utc};

    fn make_event(uid: &str, title: &str) -> CalendarEvent {
        let task = Task::new(1, 1, title, 2.0);
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        encode(&task, uid, start, None).unwrap()
    }

    async fn store_with_collection() -> (tempfile::TempDir, FsStore, Collection) {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStore::new(tmp.path().join("collections"));
        let path = CollectionPath::parse("7/PM Tool").unwrap();
        let collection = store
            .create(&path, &CollectionProps::calendar("PM Tool"))
            .await
            .unwrap();
        (tmp, store, collection)
    }

    #[tokio::test]
    async fn test_create_writes_properties() {
        let (_tmp, store, collection) = store_with_collection().await;
        let dir = store.root().join("7").join("PM Tool");

        let props = std::fs::read_to_string(dir.join(".properties")).unwrap();
        let props: CollectionProps = serde_json::from_str(&props).unwrap();
        assert_eq!(props.components, vec!["VEVENT".to_string()]);
        assert_eq!(props.resourcetype, vec!["collection".to_string(), "calendar".to_string()]);

        let reopened = store.open(&collection.path).await.unwrap();
        assert_eq!(reopened, collection);
    }

    #[tokio::test]
    async fn test_create_twice_is_already_exists() {
        let (_tmp, store, collection) = store_with_collection().await;
        let err = store
            .create(&collection.path, &CollectionProps::calendar("PM Tool"))
            .await
            .unwrap_err();
        assert!(matches!(err, PmSyncError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_open_missing_collection() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStore::new(tmp.path());
        let path = CollectionPath::parse("7/Nope").unwrap();
        assert!(matches!(
            store.open(&path).await,
            Err(PmSyncError::CollectionNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let (_tmp, store, collection) = store_with_collection().await;
        store.put(&collection, &make_event("a", "A")).await.unwrap();

        let dir = store.root().join("7").join("PM Tool");
        let dir_mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        let file_mode = std::fs::metadata(dir.join("a.ics")).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o755);
        assert_eq!(file_mode, 0o644);
    }

    #[tokio::test]
    async fn test_put_replaces_event_with_same_uid() {
        let (_tmp, store, collection) = store_with_collection().await;
        store.put(&collection, &make_event("same", "First")).await.unwrap();
        let second = make_event("same", "Second");
        store.put(&collection, &second).await.unwrap();

        assert_eq!(store.get(&collection, "same").await.unwrap(), second);
        assert_eq!(store.list(&collection).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_event() {
        let (_tmp, store, collection) = store_with_collection().await;
        assert!(matches!(
            store.get(&collection, "missing").await,
            Err(PmSyncError::EventNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_tmp, store, collection) = store_with_collection().await;
        store.put(&collection, &make_event("gone", "Gone")).await.unwrap();

        store.delete(&collection, "gone").await.unwrap();
        store.delete(&collection, "gone").await.unwrap();

        assert!(store.list(&collection).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_and_temp_files() {
        let (_tmp, store, collection) = store_with_collection().await;
        store.put(&collection, &make_event("good", "Good")).await.unwrap();

        let dir = store.root().join("7").join("PM Tool");
        std::fs::write(dir.join("broken.ics"), "not a calendar").unwrap();
        std::fs::write(dir.join(".good.ics.1234.tmp"), "BEGIN:VCALENDAR").unwrap();
        std::fs::write(dir.join("notes.txt"), "hello").unwrap();

        let events = store.list(&collection).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid, "good");
    }

    #[tokio::test]
    async fn test_put_leaves_no_temp_files() {
        let (_tmp, store, collection) = store_with_collection().await;
        store.put(&collection, &make_event("x", "X")).await.unwrap();

        let dir = store.root().join("7").join("PM Tool");
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_put_rejects_path_like_uid() {
        let (_tmp, store, collection) = store_with_collection().await;
        let err = store
            .put(&collection, &make_event("../escape", "Bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, PmSyncError::Validation(_)));
    }

    #[tokio::test]
    async fn test_concurrent_puts_to_distinct_uids() {
        let (_tmp, store, collection) = store_with_collection().await;

        let writes = (0..16).map(|i| {
            let store = store.clone();
            let collection = collection.clone();
            tokio::spawn(async move {
                let event = make_event(&format!("uid-{i}"), &format!("Task {i}"));
                store.put(&collection, &event).await
            })
        });
        for handle in writes.collect::<Vec<_>>() {
            handle.await.unwrap().unwrap();
        }

        let mut events = store.list(&collection).await.unwrap();
        events.sort_by(|a, b| a.uid.cmp(&b.uid));
        assert_eq!(events.len(), 16);
        assert!(events.iter().all(|e| e.summary.starts_with("Task ")));
    }
}

//! In-memory collection store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{PmSyncError, PmSyncResult};
use crate::event::CalendarEvent;
use crate::path::{CollectionPath, validate_uid};
use crate::store::{Collection, CollectionProps, CollectionStore};

#[derive(Debug)]
struct MemoryCollection {
    props: CollectionProps,
    events: HashMap<String, CalendarEvent>,
}

/// A store that keeps everything in a shared map. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<CollectionPath, MemoryCollection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events across all collections.
    pub fn event_count(&self) -> usize {
        self.collections
            .read()
            .values()
            .map(|c| c.events.len())
            .sum()
    }
}

impl CollectionStore for MemoryStore {
    async fn open(&self, path: &CollectionPath) -> PmSyncResult<Collection> {
        let collections = self.collections.read();
        let collection = collections
            .get(path)
            .ok_or_else(|| PmSyncError::CollectionNotFound(path.to_string()))?;

        Ok(Collection {
            path: path.clone(),
            props: collection.props.clone(),
        })
    }

    async fn create(
        &self,
        path: &CollectionPath,
        props: &CollectionProps,
    ) -> PmSyncResult<Collection> {
        let mut collections = self.collections.write();
        if collections.contains_key(path) {
            return Err(PmSyncError::AlreadyExists(path.to_string()));
        }
        collections.insert(
            path.clone(),
            MemoryCollection {
                props: props.clone(),
                events: HashMap::new(),
            },
        );

        Ok(Collection {
            path: path.clone(),
            props: props.clone(),
        })
    }

    async fn put(&self, collection: &Collection, event: &CalendarEvent) -> PmSyncResult<()> {
        validate_uid(&event.uid)?;

        let mut collections = self.collections.write();
        let stored = collections
            .get_mut(&collection.path)
            .ok_or_else(|| PmSyncError::CollectionNotFound(collection.path.to_string()))?;
        stored.events.insert(event.uid.clone(), event.clone());
        Ok(())
    }

    async fn get(&self, collection: &Collection, uid: &str) -> PmSyncResult<CalendarEvent> {
        let collections = self.collections.read();
        collections
            .get(&collection.path)
            .and_then(|c| c.events.get(uid))
            .cloned()
            .ok_or_else(|| PmSyncError::EventNotFound(format!("{}/{}", collection.path, uid)))
    }

    async fn delete(&self, collection: &Collection, uid: &str) -> PmSyncResult<()> {
        let mut collections = self.collections.write();
        if let Some(stored) = collections.get_mut(&collection.path) {
            stored.events.remove(uid);
        }
        Ok(())
    }

    async fn list(&self, collection: &Collection) -> PmSyncResult<Vec<CalendarEvent>> {
        let collections = self.collections.read();
        let stored = collections
            .get(&collection.path)
            .ok_or_else(|| PmSyncError::CollectionNotFound(collection.path.to_string()))?;
        Ok(stored.events.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use crate::task::Task;
    use chrono::{TimeZone, Utc};

    fn make_event(uid: &str, title: &str) -> CalendarEvent {
        let task = Task::new(1, 1, title, 1.0);
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        encode(&task, uid, start, None).unwrap()
    }

    async fn store_with_collection() -> (MemoryStore, Collection) {
        let store = MemoryStore::new();
        let path = CollectionPath::parse("1/PM Tool").unwrap();
        let collection = store
            .create(&path, &CollectionProps::calendar("PM Tool"))
            .await
            .unwrap();
        (store, collection)
    }

    #[tokio::test]
    async fn test_put_then_get_returns_latest() {
        let (store, collection) = store_with_collection().await;
        store.put(&collection, &make_event("u", "One")).await.unwrap();
        let two = make_event("u", "Two");
        store.put(&collection, &two).await.unwrap();

        assert_eq!(store.get(&collection, "u").await.unwrap(), two);
        assert_eq!(store.event_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_twice_matches_delete_once() {
        let (store, collection) = store_with_collection().await;
        store.put(&collection, &make_event("keep", "Keep")).await.unwrap();
        store.put(&collection, &make_event("drop", "Drop")).await.unwrap();

        store.delete(&collection, "drop").await.unwrap();
        let after_once = store.list(&collection).await.unwrap();
        store.delete(&collection, "drop").await.unwrap();
        let after_twice = store.list(&collection).await.unwrap();

        assert_eq!(after_once, after_twice);
        assert_eq!(after_twice.len(), 1);
    }

    #[tokio::test]
    async fn test_create_existing_collection_fails() {
        let (store, collection) = store_with_collection().await;
        assert!(matches!(
            store.create(&collection.path, &collection.props).await,
            Err(PmSyncError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let (store, collection) = store_with_collection().await;
        let other = store.clone();
        other.put(&collection, &make_event("shared", "Shared")).await.unwrap();
        assert!(store.get(&collection, "shared").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_is_a_snapshot() {
        let (store, collection) = store_with_collection().await;
        store.put(&collection, &make_event("first", "First")).await.unwrap();

        let snapshot = store.list(&collection).await.unwrap();
        store.put(&collection, &make_event("second", "Second")).await.unwrap();
        store.delete(&collection, "first").await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].uid, "first");
        assert_eq!(store.list(&collection).await.unwrap()[0].uid, "second");
    }
}

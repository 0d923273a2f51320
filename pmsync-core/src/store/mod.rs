//! Path-addressed event storage.
//!
//! Events live in collections addressed by `<owner>/<calendar>`. A store
//! offers atomic per-event replace, idempotent delete, and enumeration.
//! Two backends are provided: [`FsStore`] (one `.ics` file per event) and
//! [`MemoryStore`].

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::PmSyncResult;
use crate::event::CalendarEvent;
use crate::path::CollectionPath;

/// Properties written when a collection is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionProps {
    pub displayname: String,
    /// Supported component set.
    pub components: Vec<String>,
    pub resourcetype: Vec<String>,
}

impl CollectionProps {
    /// Properties of a VEVENT calendar collection.
    pub fn calendar(display_name: &str) -> Self {
        CollectionProps {
            displayname: display_name.to_string(),
            components: vec!["VEVENT".to_string()],
            resourcetype: vec!["collection".to_string(), "calendar".to_string()],
        }
    }
}

/// Handle to an existing collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub path: CollectionPath,
    pub props: CollectionProps,
}

/// Storage capability used by the sync engine.
///
/// Every operation may block on I/O, so all of them are async. `put` is a
/// full replace: a reader sees the previous event or the new one, never a
/// partial write. Enumeration order is unspecified.
pub trait CollectionStore: Send + Sync {
    /// Open an existing collection; `CollectionNotFound` if absent.
    fn open(
        &self,
        path: &CollectionPath,
    ) -> impl Future<Output = PmSyncResult<Collection>> + Send;

    /// Create a collection; `AlreadyExists` if present.
    fn create(
        &self,
        path: &CollectionPath,
        props: &CollectionProps,
    ) -> impl Future<Output = PmSyncResult<Collection>> + Send;

    /// Store `event`, replacing any event with the same uid.
    fn put(
        &self,
        collection: &Collection,
        event: &CalendarEvent,
    ) -> impl Future<Output = PmSyncResult<()>> + Send;

    /// Fetch an event; `EventNotFound` if absent.
    fn get(
        &self,
        collection: &Collection,
        uid: &str,
    ) -> impl Future<Output = PmSyncResult<CalendarEvent>> + Send;

    /// Remove an event. Removing a missing event succeeds.
    fn delete(
        &self,
        collection: &Collection,
        uid: &str,
    ) -> impl Future<Output = PmSyncResult<()>> + Send;

    /// A snapshot of every readable event in the collection, collected
    /// eagerly. Later writes are not reflected. Unparseable entries are
    /// skipped.
    fn list(
        &self,
        collection: &Collection,
    ) -> impl Future<Output = PmSyncResult<Vec<CalendarEvent>>> + Send;
}

//! Sync core: mirrors project tasks into calendar collections and plans
//! them into working hours.

pub mod codec;
pub mod config;
pub mod constants;
pub mod date_range;
pub mod error;
pub mod event;
pub mod ics;
pub mod path;
pub mod schedule;
pub mod store;
pub mod sync;
pub mod task;

pub use config::{PmSyncConfig, WorkingHours};
pub use date_range::DateRange;
pub use error::{PmSyncError, PmSyncResult};
pub use event::{CalendarEvent, EventStatus};
pub use path::CollectionPath;
pub use store::{Collection, CollectionProps, CollectionStore, FsStore, MemoryStore};
pub use sync::{SyncAllReport, SyncEngine, SyncOptions, SyncStatusReport};
pub use task::{Task, TaskFields, TaskPriority, TaskStatus};

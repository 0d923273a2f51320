//! Task to event synchronization.
//!
//! [`SyncEngine`] is the only component that writes task events. It owns
//! the retry policy; reconciliation and batch verdicts are built on top.

mod engine;
pub mod state;
pub mod status;
pub mod verdict;

pub use engine::{SyncEngine, SyncOptions};
pub use state::{SyncState, SyncTransition};
pub use status::{SyncClass, SyncStatusReport, TaskSyncStatus, reconcile};
pub use verdict::{FailedTask, SyncAllReport, SyncedTask, TaskVerdict, Verdict};

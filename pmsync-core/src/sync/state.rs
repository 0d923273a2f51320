//! Per-task sync lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sync::status::SyncClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Unsynced,
    Synced,
    Dirty,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTransition {
    SyncSucceeded,
    SyncFailed,
    TaskChanged,
    TaskDeleted,
}

impl SyncState {
    /// State after `transition`, or None once removed.
    pub fn next(self, transition: SyncTransition) -> Option<SyncState> {
        use SyncState::*;
        use SyncTransition::*;

        match (self, transition) {
            (Removed, _) => None,
            (_, TaskDeleted) => Some(Removed),
            (_, SyncSucceeded) => Some(Synced),
            (state, SyncFailed) => Some(state),
            (Synced, TaskChanged) => Some(Dirty),
            (state, TaskChanged) => Some(state),
        }
    }

    /// Unsynced and dirty tasks are handled the same way by the engine.
    pub fn needs_sync(self) -> bool {
        matches!(self, SyncState::Unsynced | SyncState::Dirty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Unsynced => "unsynced",
            SyncState::Synced => "synced",
            SyncState::Dirty => "dirty",
            SyncState::Removed => "removed",
        }
    }
}

impl From<SyncClass> for SyncState {
    fn from(class: SyncClass) -> Self {
        match class {
            SyncClass::InSync => SyncState::Synced,
            SyncClass::Drifted => SyncState::Dirty,
            SyncClass::Missing => SyncState::Unsynced,
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SyncTransition::*;

    #[test]
    fn test_lifecycle() {
        let state = SyncState::Unsynced;
        let state = state.next(SyncSucceeded).unwrap();
        assert_eq!(state, SyncState::Synced);
        let state = state.next(TaskChanged).unwrap();
        assert_eq!(state, SyncState::Dirty);
        assert!(state.needs_sync());
        let state = state.next(SyncSucceeded).unwrap();
        assert_eq!(state, SyncState::Synced);
        let state = state.next(TaskDeleted).unwrap();
        assert_eq!(state, SyncState::Removed);
    }

    #[test]
    fn test_removed_is_terminal() {
        for t in [SyncSucceeded, SyncFailed, TaskChanged, TaskDeleted] {
            assert_eq!(SyncState::Removed.next(t), None);
        }
    }

    #[test]
    fn test_failed_sync_keeps_state() {
        assert_eq!(SyncState::Dirty.next(SyncFailed), Some(SyncState::Dirty));
        assert_eq!(SyncState::Unsynced.next(TaskChanged), Some(SyncState::Unsynced));
    }

    #[test]
    fn test_from_reconciliation_class() {
        assert_eq!(SyncState::from(SyncClass::Drifted), SyncState::Dirty);
        assert!(!SyncState::from(SyncClass::InSync).needs_sync());
        assert!(SyncState::from(SyncClass::Missing).needs_sync());
    }
}

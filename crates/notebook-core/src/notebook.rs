//! The process-wide notebook shared by every session.
//!
//! All registry and note-list access goes through one `RwLock`. Each public
//! method is a single critical section, so lookup-or-create, insert, unlink
//! and group removal are atomic with respect to every other session. Reads
//! of `show` share the lock; everything else takes it exclusively.
//!
//! Callers must finish all network I/O before calling in: nothing here blocks
//! on a client while holding the lock.

use crate::error::{NotebookError, Result};
use crate::key::GroupKey;
use crate::registry::Registry;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Result of a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Notes left in the group after the delete.
    pub remaining: usize,
    /// The group became empty and was removed from the registry.
    pub group_removed: bool,
}

/// Point-in-time counts, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotebookStats {
    pub groups: usize,
    pub notes: usize,
}

/// Thread-safe note registry. Wrap in `Arc` for shared ownership.
#[derive(Debug, Default)]
pub struct Notebook {
    registry: RwLock<Registry>,
}

impl Notebook {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a note to the group for `key`, creating the group if needed.
    ///
    /// Returns the number of notes in the group afterwards.
    pub fn add_note(&self, key: GroupKey, content: Vec<u8>) -> Result<usize> {
        let mut registry = self.write();
        let created = registry.find(key).is_none();
        let result = registry.find_or_create(key)?.add(content);
        match &result {
            Ok(_) if created => debug!("Created note group {}", key),
            Ok(_) => {}
            Err(_) => {
                // Never leave a freshly created group empty
                registry.remove_if_empty(key);
            }
        }
        result
    }

    /// Delete the note at `index`, dropping the group if it becomes empty.
    pub fn delete_note(&self, key: GroupKey, index: usize) -> Result<DeleteOutcome> {
        let mut registry = self.write();
        let group = registry
            .find_mut(key)
            .ok_or(NotebookError::GroupNotFound(key))?;
        group.delete(index)?;
        let remaining = group.len();

        let group_removed = registry.remove_if_empty(key);
        if group_removed {
            debug!("Removed empty note group {}", key);
        }
        Ok(DeleteOutcome {
            remaining,
            group_removed,
        })
    }

    /// Copy out the note at `index`.
    pub fn show_note(&self, key: GroupKey, index: usize) -> Result<Vec<u8>> {
        self.read()
            .find(key)
            .ok_or(NotebookError::GroupNotFound(key))?
            .show(index)
    }

    /// Overwrite the note at `index` with `content` (exactly the group size).
    pub fn edit_note(&self, key: GroupKey, index: usize, content: &[u8]) -> Result<()> {
        self.write()
            .find_mut(key)
            .ok_or(NotebookError::GroupNotFound(key))?
            .edit(index, content)
    }

    pub fn contains_group(&self, key: GroupKey) -> bool {
        self.read().find(key).is_some()
    }

    pub fn contains_note(&self, key: GroupKey, index: usize) -> bool {
        self.read()
            .find(key)
            .is_some_and(|group| group.get(index).is_some())
    }

    /// Number of notes in the group, or `None` if the group does not exist.
    pub fn group_len(&self, key: GroupKey) -> Option<usize> {
        self.read().find(key).map(|group| group.len())
    }

    pub fn keys(&self) -> Vec<GroupKey> {
        self.read().keys()
    }

    pub fn stats(&self) -> NotebookStats {
        let registry = self.read();
        NotebookStats {
            groups: registry.len(),
            notes: registry.note_count(),
        }
    }
}

//! Registry of live note groups.
//!
//! `Registry` is plain data with no locking of its own; the shared
//! `Notebook` wraps it. Invariants after every public call:
//! - at most one group per `GroupKey`
//! - no group is empty (emptied groups are removed by `remove_if_empty`)

use crate::error::{NotebookError, Result};
use crate::key::GroupKey;
use crate::note::NoteGroup;

#[derive(Debug, Default)]
pub struct Registry {
    /// Newest group first. At most 112 keys exist, so lookups scan.
    groups: Vec<NoteGroup>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: GroupKey) -> Option<usize> {
        self.groups.iter().position(|g| g.key() == key)
    }

    pub fn find(&self, key: GroupKey) -> Option<&NoteGroup> {
        self.groups.iter().find(|g| g.key() == key)
    }

    pub fn find_mut(&mut self, key: GroupKey) -> Option<&mut NoteGroup> {
        self.groups.iter_mut().find(|g| g.key() == key)
    }

    /// Return the group for `key`, creating an empty one if absent.
    ///
    /// Callers must add a note before releasing exclusive access, otherwise
    /// the empty group would outlive the call.
    pub fn find_or_create(&mut self, key: GroupKey) -> Result<&mut NoteGroup> {
        let idx = match self.position(key) {
            Some(idx) => idx,
            None => {
                self.groups
                    .try_reserve(1)
                    .map_err(|_| NotebookError::Allocation(std::mem::size_of::<NoteGroup>()))?;
                self.groups.insert(0, NoteGroup::new(key));
                0
            }
        };
        Ok(&mut self.groups[idx])
    }

    /// Drop the group for `key` if it holds no notes. Returns true if removed.
    pub fn remove_if_empty(&mut self, key: GroupKey) -> bool {
        match self.position(key) {
            Some(idx) if self.groups[idx].is_empty() => {
                self.groups.remove(idx);
                true
            }
            _ => false,
        }
    }

    /// Number of live groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total notes across all groups.
    pub fn note_count(&self) -> usize {
        self.groups.iter().map(NoteGroup::len).sum()
    }

    pub fn keys(&self) -> Vec<GroupKey> {
        self.groups.iter().map(NoteGroup::key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(size: i64, level: i64) -> GroupKey {
        GroupKey::parse(size, level).unwrap()
    }

    #[test]
    fn test_find_or_create_is_idempotent() {
        let mut registry = Registry::new();
        registry.find_or_create(key(256, 1)).unwrap().add(vec![0; 256]).unwrap();
        registry.find_or_create(key(256, 1)).unwrap().add(vec![1; 256]).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find(key(256, 1)).unwrap().len(), 2);
    }

    #[test]
    fn test_same_size_different_level_are_distinct() {
        let mut registry = Registry::new();
        registry.find_or_create(key(256, 0)).unwrap().add(vec![0; 256]).unwrap();
        registry.find_or_create(key(256, 6)).unwrap().add(vec![0; 256]).unwrap();
        registry.find_or_create(key(512, 0)).unwrap().add(vec![0; 512]).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.note_count(), 3);
        // Newest group is linked first
        assert_eq!(registry.keys()[0], key(512, 0));
    }

    #[test]
    fn test_find_missing() {
        let registry = Registry::new();
        assert!(registry.find(key(256, 0)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_if_empty() {
        let mut registry = Registry::new();
        let k = key(1024, 2);
        registry.find_or_create(k).unwrap().add(vec![0; 1024]).unwrap();

        // Still has a note
        assert!(!registry.remove_if_empty(k));
        assert_eq!(registry.len(), 1);

        registry.find_mut(k).unwrap().delete(0).unwrap();
        assert!(registry.remove_if_empty(k));
        assert!(registry.find(k).is_none());

        // Already gone
        assert!(!registry.remove_if_empty(k));
    }
}

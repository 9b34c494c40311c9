//! Notes and the per-group note list.
//!
//! A group keeps its notes newest-first: index 0 is always the most recently
//! added note still present, so indices shift as notes are added.

use crate::error::{NotebookError, Result};
use crate::key::GroupKey;
use std::collections::VecDeque;

/// A fixed-capacity content record. Its length never changes after creation.
#[derive(Debug)]
pub struct Note {
    content: Box<[u8]>,
}

impl Note {
    fn new(content: Vec<u8>) -> Self {
        Self {
            content: content.into_boxed_slice(),
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Allocate a zero-filled content buffer, reporting exhaustion instead of aborting.
pub fn zeroed_content(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| NotebookError::Allocation(len))?;
    buf.resize(len, 0);
    Ok(buf)
}

/// All notes filed under one (size, level) key.
#[derive(Debug)]
pub struct NoteGroup {
    key: GroupKey,
    notes: VecDeque<Note>,
}

impl NoteGroup {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            notes: VecDeque::new(),
        }
    }

    pub fn key(&self) -> GroupKey {
        self.key
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn check_len(&self, content: &[u8]) -> Result<()> {
        let expected = self.key.content_len();
        if content.len() != expected {
            return Err(NotebookError::ContentLength {
                expected,
                actual: content.len(),
            });
        }
        Ok(())
    }

    fn not_found(&self, index: usize) -> NotebookError {
        NotebookError::PageNotFound {
            key: self.key,
            index,
        }
    }

    /// Insert a new note at the front. Returns the group's new length.
    pub fn add(&mut self, content: Vec<u8>) -> Result<usize> {
        self.check_len(&content)?;
        self.notes
            .try_reserve(1)
            .map_err(|_| NotebookError::Allocation(std::mem::size_of::<Note>()))?;
        self.notes.push_front(Note::new(content));
        Ok(self.notes.len())
    }

    /// Unlink and drop the note at `index`.
    pub fn delete(&mut self, index: usize) -> Result<()> {
        self.notes
            .remove(index)
            .map(drop)
            .ok_or_else(|| self.not_found(index))
    }

    /// Copy out the content of the note at `index`.
    pub fn show(&self, index: usize) -> Result<Vec<u8>> {
        self.get(index)
            .map(|note| note.content().to_vec())
            .ok_or_else(|| self.not_found(index))
    }

    /// Replace the content of the note at `index` wholesale.
    pub fn edit(&mut self, index: usize, content: &[u8]) -> Result<()> {
        self.check_len(content)?;
        let key = self.key;
        let note = self
            .notes
            .get_mut(index)
            .ok_or(NotebookError::PageNotFound { key, index })?;
        note.content.copy_from_slice(content);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }
}

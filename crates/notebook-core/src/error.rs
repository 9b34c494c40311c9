//! Per-command errors reported back to the client.
//!
//! None of these tear down a session: the dispatcher writes the matching
//! status line and returns to the command loop.

use crate::key::GroupKey;
use thiserror::Error;

/// Status line for rejected sizes and security levels.
pub const STATUS_INVALID: &str = "[X] INVALID\n";
/// Status line for a missing (size, level) group.
pub const STATUS_NO_GROUP: &str = "[-] No note list found for such specs.\n";
/// Status line for a missing page index inside an existing group.
pub const STATUS_NO_PAGE: &str = "[-] No such page.\n";
/// Status line for failed allocations.
pub const STATUS_NO_SPACE: &str = "[X] No more space\n";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotebookError {
    #[error("Invalid note size: {0}")]
    InvalidSize(i64),

    #[error("Invalid security level: {0}")]
    InvalidLevel(i64),

    #[error("No note group for {0}")]
    GroupNotFound(GroupKey),

    #[error("No page {index} in group {key}")]
    PageNotFound { key: GroupKey, index: usize },

    #[error("Content length mismatch: expected {expected} bytes, got {actual}")]
    ContentLength { expected: usize, actual: usize },

    #[error("Out of memory allocating {0} bytes")]
    Allocation(usize),
}

pub type Result<T> = std::result::Result<T, NotebookError>;

impl NotebookError {
    /// The line written back on the connection for this error.
    pub fn status_line(&self) -> &'static str {
        match self {
            NotebookError::InvalidSize(_)
            | NotebookError::InvalidLevel(_)
            | NotebookError::ContentLength { .. } => STATUS_INVALID,
            NotebookError::GroupNotFound(_) => STATUS_NO_GROUP,
            NotebookError::PageNotFound { .. } => STATUS_NO_PAGE,
            NotebookError::Allocation(_) => STATUS_NO_SPACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{NoteSize, SecurityLevel};

    #[test]
    fn test_status_lines() {
        let key = GroupKey::new(NoteSize::try_from(256).unwrap(), SecurityLevel::try_from(0).unwrap());

        assert_eq!(NotebookError::InvalidSize(0).status_line(), "[X] INVALID\n");
        assert_eq!(NotebookError::InvalidLevel(7).status_line(), "[X] INVALID\n");
        assert_eq!(
            NotebookError::GroupNotFound(key).status_line(),
            "[-] No note list found for such specs.\n"
        );
        assert_eq!(
            NotebookError::PageNotFound { key, index: 3 }.status_line(),
            "[-] No such page.\n"
        );
        assert_eq!(NotebookError::Allocation(256).status_line(), "[X] No more space\n");
    }
}

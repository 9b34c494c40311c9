//! notebook-core: shared state and wire-independent logic for the notebook daemon.
//!
//! This crate provides:
//! - Validated group keys (`NoteSize`, `SecurityLevel`, `GroupKey`)
//! - Per-group note lists and the group registry
//! - `Notebook`, the lock-guarded registry shared by every session
//! - The credential gate and bounded decimal field parsing

pub mod credential;
pub mod error;
pub mod field;
pub mod key;
pub mod note;
pub mod notebook;
pub mod registry;

pub use credential::{CredentialError, CredentialStore};
pub use error::{NotebookError, Result};
pub use field::{parse_decimal, parse_decimal_lenient, FieldError, MAX_FIELD_LEN};
pub use key::{GroupKey, NoteSize, SecurityLevel};
pub use note::{zeroed_content, Note, NoteGroup};
pub use notebook::{DeleteOutcome, Notebook, NotebookStats};
pub use registry::Registry;

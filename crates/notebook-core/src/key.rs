//! Group keys: the (size, security level) pair every note group is filed under.
//!
//! Both halves are validated on construction, so a `GroupKey` in hand is
//! always a legal registry key.

use crate::error::{NotebookError, Result};
use std::fmt::{self, Display, Formatter};

/// Sizes are allocated in steps of this many bytes.
pub const NOTE_SIZE_STEP: usize = 256;
/// Largest note a group may hold.
pub const MAX_NOTE_SIZE: usize = 4096;
/// Highest security level.
pub const MAX_SECURITY_LEVEL: u8 = 6;

/// Content capacity of every note in a group.
///
/// # Examples
/// ```
/// use notebook_core::NoteSize;
///
/// assert_eq!(NoteSize::try_from(512).unwrap().get(), 512);
/// assert!(NoteSize::try_from(0).is_err());
/// assert!(NoteSize::try_from(300).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteSize(usize);

impl NoteSize {
    pub fn get(&self) -> usize {
        self.0
    }

    /// Every valid size, smallest first.
    pub fn all() -> impl Iterator<Item = NoteSize> {
        (1..=MAX_NOTE_SIZE / NOTE_SIZE_STEP).map(|step| NoteSize(step * NOTE_SIZE_STEP))
    }
}

impl TryFrom<i64> for NoteSize {
    type Error = NotebookError;

    fn try_from(raw: i64) -> Result<Self> {
        match usize::try_from(raw) {
            Ok(size) if size > 0 && size <= MAX_NOTE_SIZE && size % NOTE_SIZE_STEP == 0 => {
                Ok(Self(size))
            }
            _ => Err(NotebookError::InvalidSize(raw)),
        }
    }
}

impl Display for NoteSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecurityLevel(u8);

impl SecurityLevel {
    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = SecurityLevel> {
        (0..=MAX_SECURITY_LEVEL).map(SecurityLevel)
    }
}

impl TryFrom<i64> for SecurityLevel {
    type Error = NotebookError;

    fn try_from(raw: i64) -> Result<Self> {
        match u8::try_from(raw) {
            Ok(level) if level <= MAX_SECURITY_LEVEL => Ok(Self(level)),
            _ => Err(NotebookError::InvalidLevel(raw)),
        }
    }
}

impl Display for SecurityLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry key of a note group. Also serves as the handle to a live group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub size: NoteSize,
    pub level: SecurityLevel,
}

impl GroupKey {
    pub fn new(size: NoteSize, level: SecurityLevel) -> Self {
        Self { size, level }
    }

    /// Validate raw protocol values, size first.
    pub fn parse(size: i64, level: i64) -> Result<Self> {
        Ok(Self::new(NoteSize::try_from(size)?, SecurityLevel::try_from(level)?))
    }

    /// Bytes of content per note in this group.
    pub fn content_len(&self) -> usize {
        self.size.get()
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.size, self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sizes() {
        for raw in [256, 512, 1024, 3840, 4096] {
            assert_eq!(NoteSize::try_from(raw).unwrap().get(), raw as usize);
        }
    }

    #[test]
    fn test_rejected_sizes() {
        for raw in [0, -256, 1, 255, 257, 300, 4097, 4352, i64::MAX, i64::MIN] {
            assert_eq!(
                NoteSize::try_from(raw),
                Err(NotebookError::InvalidSize(raw)),
                "size {} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_levels() {
        for raw in 0..=6 {
            assert_eq!(SecurityLevel::try_from(raw).unwrap().get(), raw as u8);
        }
        assert_eq!(SecurityLevel::try_from(7), Err(NotebookError::InvalidLevel(7)));
        assert_eq!(SecurityLevel::try_from(-1), Err(NotebookError::InvalidLevel(-1)));
        assert_eq!(SecurityLevel::try_from(256), Err(NotebookError::InvalidLevel(256)));
    }

    #[test]
    fn test_parse_reports_size_before_level() {
        assert_eq!(GroupKey::parse(100, 9), Err(NotebookError::InvalidSize(100)));
        assert_eq!(GroupKey::parse(256, 9), Err(NotebookError::InvalidLevel(9)));

        let key = GroupKey::parse(768, 3).unwrap();
        assert_eq!(key.content_len(), 768);
        assert_eq!(key.to_string(), "768/3");
    }

    #[test]
    fn test_key_space() {
        assert_eq!(NoteSize::all().count(), 16);
        assert_eq!(SecurityLevel::all().count(), 7);
        assert_eq!(NoteSize::all().last().unwrap().get(), MAX_NOTE_SIZE);
    }
}

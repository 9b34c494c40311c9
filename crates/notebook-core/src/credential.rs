//! The single shared credential that gates every session.
//!
//! Loaded once at startup and read-only afterwards. Comparison is over the
//! full secret: a candidate must match in both length and content, so an
//! empty candidate or a prefix of the secret never authenticates.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longest secret accepted from the credential file.
pub const MAX_SECRET_LEN: usize = 1023;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to read credential file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential file is empty")]
    Empty,

    #[error("Credential is {len} bytes, longer than the {max} byte limit")]
    TooLong { len: usize, max: usize },
}

pub struct CredentialStore {
    secret: Box<[u8]>,
}

impl CredentialStore {
    /// Read the secret from `path`. Any failure here is fatal to the process.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| CredentialError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_secret(strip_line_ending(&raw))
    }

    pub fn from_secret(secret: &[u8]) -> Result<Self, CredentialError> {
        if secret.is_empty() {
            return Err(CredentialError::Empty);
        }
        if secret.len() > MAX_SECRET_LEN {
            return Err(CredentialError::TooLong {
                len: secret.len(),
                max: MAX_SECRET_LEN,
            });
        }
        Ok(Self {
            secret: secret.into(),
        })
    }

    /// Check a candidate (already stripped of its trailing newline).
    pub fn authenticate(&self, candidate: &[u8]) -> bool {
        constant_time_eq(candidate, &self.secret)
    }

    pub fn secret_len(&self) -> usize {
        self.secret.len()
    }
}

// Never print the secret itself
impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("secret_len", &self.secret.len())
            .finish()
    }
}

/// Drop one trailing `\n` or `\r\n` from the secret file.
fn strip_line_ending(bytes: &[u8]) -> &[u8] {
    match bytes.strip_suffix(b"\n") {
        Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
        None => bytes,
    }
}

/// Equal in length and content; time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

//! Per-connection session: credential gate, then the command loop.
//!
//! A session reads every argument of a command (including note content)
//! before touching the shared notebook, then makes one atomic notebook call.
//! Data errors are reported to the client and the loop continues; only an
//! unknown selector, a failed credential or a dead connection ends it.

use crate::protocol::{
    Command, GREETING, MAX_CREDENTIAL_LEN, MENU, PROMPT_LEVEL, PROMPT_SIZE,
};
use anyhow::anyhow;
use notebook_core::{
    parse_decimal_lenient, zeroed_content, CredentialStore, GroupKey, NoteSize, Notebook,
    NotebookError, SecurityLevel, MAX_FIELD_LEN,
};
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf,
    WriteHalf,
};
use tracing::{debug, info};

/// Per-session knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSettings {
    /// Longest a single field or content read may wait. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Credential did not match
    Rejected,
    /// Client picked something other than a menu command
    Terminated,
    /// Client closed the connection or a read failed
    Closed,
    /// A read exceeded the idle timeout
    TimedOut,
}

/// Reads protocol fields without consuming bytes that belong to the next one.
pub struct FieldReader<R> {
    inner: BufReader<R>,
}

impl<R: AsyncRead + Unpin> FieldReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
        }
    }

    /// Read one field: up to and including the next `\n`, at most `max` bytes,
    /// and no more than what one read from the peer delivered.
    ///
    /// A field that is neither newline-terminated nor full is returned as soon
    /// as the bytes already received run out. Bytes past the field stay
    /// buffered for the next call. Returns `None` if the stream ended before
    /// any byte arrived.
    pub async fn read_field(&mut self, max: usize) -> io::Result<Option<Vec<u8>>> {
        let available = self.inner.fill_buf().await?;
        if available.is_empty() || max == 0 {
            return Ok(None);
        }
        let window = &available[..available.len().min(max)];
        let used = window
            .iter()
            .position(|b| *b == b'\n')
            .map_or(window.len(), |pos| pos + 1);
        let field = window[..used].to_vec();
        self.inner.consume(used);
        Ok(Some(field))
    }

    /// Fill `buf` completely.
    pub async fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf).await.map(|_| ())
    }
}

/// Why a command or the whole session stopped early.
enum Interrupt {
    /// Report to the client and go back to the menu
    Command(NotebookError),
    /// End the session normally
    Session(SessionEnd),
    /// Writing to the client failed
    Io(anyhow::Error),
}

impl From<NotebookError> for Interrupt {
    fn from(err: NotebookError) -> Self {
        Interrupt::Command(err)
    }
}

impl From<io::Error> for Interrupt {
    fn from(err: io::Error) -> Self {
        Interrupt::Io(err.into())
    }
}

async fn timed<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = io::Result<T>>,
) -> io::Result<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "client idle"))?,
        None => fut.await,
    }
}

/// One client's session against the shared notebook.
pub struct Session<S> {
    conn_id: String,
    reader: FieldReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    notebook: Arc<Notebook>,
    credentials: Arc<CredentialStore>,
    settings: SessionSettings,
}

impl<S: AsyncRead + AsyncWrite> Session<S> {
    pub fn new(
        conn_id: String,
        stream: S,
        notebook: Arc<Notebook>,
        credentials: Arc<CredentialStore>,
        settings: SessionSettings,
    ) -> Self {
        let (read, writer) = tokio::io::split(stream);
        Self {
            conn_id,
            reader: FieldReader::new(read),
            writer,
            notebook,
            credentials,
            settings,
        }
    }

    /// Drive the session to completion.
    ///
    /// Returns how the session ended; only failures writing to the client
    /// are errors.
    pub async fn run(mut self) -> anyhow::Result<SessionEnd> {
        let result = self.drive().await;
        // Best effort: the peer may already be gone
        let _ = self.writer.shutdown().await;
        match result {
            Ok(end) | Err(Interrupt::Session(end)) => Ok(end),
            Err(Interrupt::Io(err)) => Err(err),
            Err(Interrupt::Command(err)) => Err(anyhow!("unreported command error: {}", err)),
        }
    }

    async fn drive(&mut self) -> Result<SessionEnd, Interrupt> {
        self.send(GREETING.as_bytes()).await?;
        let candidate = match self.read_field(MAX_CREDENTIAL_LEN).await {
            Ok(candidate) => candidate,
            Err(Interrupt::Session(SessionEnd::Closed)) => return Ok(SessionEnd::Rejected),
            Err(other) => return Err(other),
        };
        // Only a trailing newline is framing; a carriage return is part of the guess
        let candidate = candidate.strip_suffix(b"\n").unwrap_or(&candidate[..]);
        if !self.credentials.authenticate(candidate) {
            info!("{}: credential rejected", self.conn_id);
            return Ok(SessionEnd::Rejected);
        }
        info!("{}: authenticated", self.conn_id);

        loop {
            self.send(MENU.as_bytes()).await?;
            let selector = self.read_number().await?;
            let Some(command) = Command::from_selector(selector) else {
                debug!("{}: selector {} ends session", self.conn_id, selector);
                return Ok(SessionEnd::Terminated);
            };

            match self.execute(command).await {
                Ok(()) => {}
                Err(Interrupt::Command(err)) => {
                    debug!("{}: {} failed: {}", self.conn_id, command.name(), err);
                    self.send(err.status_line().as_bytes()).await?;
                }
                Err(other) => return Err(other),
            }
        }
    }

    async fn execute(&mut self, command: Command) -> Result<(), Interrupt> {
        let key = self.read_key().await?;
        match command {
            Command::Add => self.add(key).await,
            Command::Delete => self.delete(key).await,
            Command::Show => self.show(key).await,
            Command::Edit => self.edit(key).await,
        }
    }

    /// Size is validated before the level is asked for.
    async fn read_key(&mut self) -> Result<GroupKey, Interrupt> {
        self.send(PROMPT_SIZE.as_bytes()).await?;
        let size = NoteSize::try_from(self.read_number().await?)?;
        self.send(PROMPT_LEVEL.as_bytes()).await?;
        let level = SecurityLevel::try_from(self.read_number().await?)?;
        Ok(GroupKey::new(size, level))
    }

    async fn add(&mut self, key: GroupKey) -> Result<(), Interrupt> {
        let content = self.read_content(key.content_len()).await?;
        let notes = self.notebook.add_note(key, content)?;
        debug!("{}: added note to {} ({} notes)", self.conn_id, key, notes);
        Ok(())
    }

    async fn delete(&mut self, key: GroupKey) -> Result<(), Interrupt> {
        let index = self.read_page(key, Command::Delete).await?;
        let outcome = self.notebook.delete_note(key, index)?;
        debug!(
            "{}: deleted page {} of {} ({} notes left, removed group: {})",
            self.conn_id, index, key, outcome.remaining, outcome.group_removed
        );
        Ok(())
    }

    async fn show(&mut self, key: GroupKey) -> Result<(), Interrupt> {
        let index = self.read_page(key, Command::Show).await?;
        let content = self.notebook.show_note(key, index)?;
        self.send(&content).await?;
        Ok(())
    }

    async fn edit(&mut self, key: GroupKey) -> Result<(), Interrupt> {
        let index = self.read_page(key, Command::Edit).await?;
        // An unknown page is reported before any content is read
        if !self.notebook.contains_note(key, index) {
            return Err(NotebookError::PageNotFound { key, index }.into());
        }
        let content = self.read_content(key.content_len()).await?;
        self.notebook.edit_note(key, index, &content)?;
        debug!("{}: edited page {} of {}", self.conn_id, index, key);
        Ok(())
    }

    /// Check the group exists, then prompt for and read a page index.
    async fn read_page(&mut self, key: GroupKey, command: Command) -> Result<usize, Interrupt> {
        if !self.notebook.contains_group(key) {
            return Err(NotebookError::GroupNotFound(key).into());
        }
        if let Some(prompt) = command.page_prompt() {
            self.send(prompt.as_bytes()).await?;
        }
        // Negative indices never match a page
        Ok(usize::try_from(self.read_number().await?).unwrap_or(usize::MAX))
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), Interrupt> {
        self.writer.write_all(bytes).await?;
        Ok(())
    }

    async fn read_number(&mut self) -> Result<i64, Interrupt> {
        let field = self.read_field(MAX_FIELD_LEN).await?;
        Ok(parse_decimal_lenient(&field))
    }

    async fn read_field(&mut self, max: usize) -> Result<Vec<u8>, Interrupt> {
        match timed(self.settings.idle_timeout, self.reader.read_field(max)).await {
            Ok(Some(field)) => Ok(field),
            Ok(None) => Err(Interrupt::Session(SessionEnd::Closed)),
            Err(err) => Err(self.read_failed(err)),
        }
    }

    async fn read_content(&mut self, len: usize) -> Result<Vec<u8>, Interrupt> {
        let mut content = zeroed_content(len)?;
        match timed(self.settings.idle_timeout, self.reader.read_exact(&mut content)).await {
            Ok(()) => Ok(content),
            Err(err) => Err(self.read_failed(err)),
        }
    }

    fn read_failed(&self, err: io::Error) -> Interrupt {
        if err.kind() == io::ErrorKind::TimedOut {
            info!("{}: idle timeout", self.conn_id);
            Interrupt::Session(SessionEnd::TimedOut)
        } else {
            debug!("{}: read ended: {}", self.conn_id, err);
            Interrupt::Session(SessionEnd::Closed)
        }
    }
}

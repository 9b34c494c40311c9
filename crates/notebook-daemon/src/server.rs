//! TCP acceptor for notebook sessions.
//!
//! Binds the first free port in a range and spawns one task per accepted
//! connection. The accept loop never waits on a session; an optional
//! admission limit holds surplus connections until a slot frees up.

use crate::connection::{Session, SessionSettings};
use anyhow::{bail, Result};
use notebook_core::{CredentialStore, Notebook};
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Acceptor configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerSettings {
    pub session: SessionSettings,
    /// Cap on concurrently served sessions. `None` accepts without limit.
    pub max_connections: Option<usize>,
}

/// Bind the first port in `ports` that is free on `host`.
///
/// Returns the listener and the port actually bound (useful with port 0).
pub async fn bind_in_range(host: &str, ports: RangeInclusive<u16>) -> Result<(TcpListener, u16)> {
    for port in ports.clone() {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => {
                let bound = listener.local_addr()?.port();
                info!("Listening on {}:{}", host, bound);
                return Ok((listener, bound));
            }
            Err(e) => {
                debug!("Port {} unavailable: {}", port, e);
            }
        }
    }
    bail!(
        "No usable port found in range {}-{}",
        ports.start(),
        ports.end()
    )
}

/// Decrements the live-session counter when a session task finishes.
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accepts connections and runs a session for each against one shared notebook.
pub struct NotebookServer {
    notebook: Arc<Notebook>,
    credentials: Arc<CredentialStore>,
    settings: ServerSettings,
    /// Permits for the admission limit, if any
    admission: Option<Arc<Semaphore>>,
    /// Session tasks spawned and not yet finished
    live: Arc<AtomicUsize>,
    /// Counter for generating connection IDs
    next_conn_id: u64,
}

impl NotebookServer {
    pub fn new(
        notebook: Arc<Notebook>,
        credentials: Arc<CredentialStore>,
        settings: ServerSettings,
    ) -> Self {
        Self {
            notebook,
            credentials,
            settings,
            admission: settings
                .max_connections
                .map(|limit| Arc::new(Semaphore::new(limit))),
            live: Arc::new(AtomicUsize::new(0)),
            next_conn_id: 1,
        }
    }

    pub fn notebook(&self) -> &Arc<Notebook> {
        &self.notebook
    }

    /// Number of session tasks currently alive (including ones waiting for admission).
    pub fn active_sessions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Spawn a session task for a freshly accepted connection.
    pub fn accept_connection(&mut self, stream: TcpStream, addr: SocketAddr) {
        let conn_id = format!("conn-{}", self.next_conn_id);
        self.next_conn_id += 1;

        let session = Session::new(
            conn_id.clone(),
            stream,
            Arc::clone(&self.notebook),
            Arc::clone(&self.credentials),
            self.settings.session,
        );
        let admission = self.admission.clone();
        let live = Arc::clone(&self.live);
        let active = live.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "New connection from {} (conn_id: {}, active sessions: {})",
            addr, conn_id, active
        );
        let guard = LiveGuard(Arc::clone(&live));

        tokio::spawn(async move {
            let _guard = guard;
            let _permit = match admission {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                },
                None => None,
            };

            let result = session.run().await;
            // This session still holds its slot until the guard drops
            let others = live.load(Ordering::SeqCst).saturating_sub(1);
            match result {
                Ok(end) => info!(
                    "{}: session ended ({:?}, {} sessions remain)",
                    conn_id, end, others
                ),
                Err(e) => warn!(
                    "{}: session failed: {} ({} sessions remain)",
                    conn_id, e, others
                ),
            }
        });
    }

    /// Accept connections forever.
    pub async fn run(mut self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => self.accept_connection(stream, addr),
                Err(e) => error!("Failed to accept connection: {}", e),
            }
        }
    }
}

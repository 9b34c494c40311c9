//! notebook-daemon: serves the shared notebook over plain TCP.
//!
//! Loads the credential, binds the first free port in the configured range,
//! then runs one session task per client until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use notebook_core::{CredentialStore, Notebook};
use notebook_daemon::config::DaemonConfig;
use notebook_daemon::server::{bind_in_range, NotebookServer};

#[tokio::main]
async fn main() -> Result<()> {
    let config = DaemonConfig::parse();

    // Set up logging - respects RUST_LOG env var, defaults to info (or debug with --verbose)
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting notebook-daemon");

    let ports = config.port_range()?;
    let settings = config.server_settings()?;

    // Without a credential nothing can be served
    let credentials = CredentialStore::load(&config.cred_file)
        .with_context(|| format!("Failed to load credential from {:?}", config.cred_file))?;
    info!("Credential loaded from {:?}", config.cred_file);

    let (listener, port) = bind_in_range(&config.host, ports).await?;
    // Harness scripts parse this exact line
    println!("Current Notebook is running on port {}", port);

    if let Some(limit) = settings.max_connections {
        info!("Admission limit: {} concurrent sessions", limit);
    }
    if let Some(timeout) = settings.session.idle_timeout {
        info!("Idle timeout: {:?}", timeout);
    }

    let server = NotebookServer::new(Arc::new(Notebook::new()), Arc::new(credentials), settings);

    info!("Daemon running. Press Ctrl+C to stop.");

    tokio::select! {
        _ = server.run(listener) => {}

        // Handle graceful shutdown
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
        }
    }

    info!("Shutting down");
    Ok(())
}

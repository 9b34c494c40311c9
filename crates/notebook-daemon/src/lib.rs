//! notebook-daemon library: Exposes internal modules for testing.
//!
//! This is a thin library layer over the daemon components,
//! allowing integration tests to drive a real server.

pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;

// Re-export key types for convenience
pub use config::DaemonConfig;
pub use connection::{FieldReader, Session, SessionEnd, SessionSettings};
pub use protocol::Command;
pub use server::{bind_in_range, NotebookServer, ServerSettings};

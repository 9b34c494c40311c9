//! Command-line and environment configuration.

use crate::connection::SessionSettings;
use crate::server::ServerSettings;
use anyhow::{bail, Result};
use clap::Parser;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "notebook-daemon")]
#[command(about = "Shared notebook service over TCP")]
pub struct DaemonConfig {
    /// File holding the shared credential, read once at startup
    #[arg(long, env = "NOTEBOOK_CRED_FILE", default_value = "./flag")]
    pub cred_file: PathBuf,

    /// Address to listen on
    #[arg(long, env = "NOTEBOOK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// First port to try
    #[arg(long, default_value_t = 29000)]
    pub port_start: u16,

    /// Last port to try
    #[arg(long, default_value_t = 29999)]
    pub port_end: u16,

    /// Serve at most this many sessions at once (unbounded if unset)
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Drop a client that sends nothing for this many seconds (never if unset)
    #[arg(long)]
    pub idle_timeout_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,
}

impl DaemonConfig {
    pub fn port_range(&self) -> Result<RangeInclusive<u16>> {
        if self.port_start > self.port_end {
            bail!(
                "Invalid port range: {} is greater than {}",
                self.port_start,
                self.port_end
            );
        }
        Ok(self.port_start..=self.port_end)
    }

    pub fn session_settings(&self) -> Result<SessionSettings> {
        if self.idle_timeout_secs == Some(0) {
            bail!("--idle-timeout-secs must be at least 1");
        }
        Ok(SessionSettings {
            idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
        })
    }

    pub fn server_settings(&self) -> Result<ServerSettings> {
        if self.max_connections == Some(0) {
            bail!("--max-connections must be at least 1");
        }
        Ok(ServerSettings {
            session: self.session_settings()?,
            max_connections: self.max_connections,
        })
    }

    /// Default tracing filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug,notebook_daemon=debug,notebook_core=debug"
        } else {
            "info,notebook_daemon=info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> DaemonConfig {
        let mut argv = vec!["notebook-daemon"];
        argv.extend_from_slice(args);
        DaemonConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--cred-file", "./flag", "--host", "0.0.0.0"]);
        assert_eq!(config.port_range().unwrap(), 29000..=29999);
        assert!(!config.verbose);

        let settings = config.server_settings().unwrap();
        assert_eq!(settings.max_connections, None);
        assert_eq!(settings.session.idle_timeout, None);
    }

    #[test]
    fn test_hardening_options() {
        let config = parse(&["--max-connections", "8", "--idle-timeout-secs", "30"]);
        let settings = config.server_settings().unwrap();
        assert_eq!(settings.max_connections, Some(8));
        assert_eq!(settings.session.idle_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse(&["--port-start", "30000", "--port-end", "29000"])
            .port_range()
            .is_err());
        assert!(parse(&["--max-connections", "0"]).server_settings().is_err());
        assert!(parse(&["--idle-timeout-secs", "0"]).server_settings().is_err());
        assert!(DaemonConfig::try_parse_from(["notebook-daemon", "--port-start", "70000"]).is_err());
    }

    #[test]
    fn test_verbose_filter() {
        assert!(parse(&["--verbose"]).log_filter().starts_with("debug"));
        assert!(parse(&[]).log_filter().starts_with("info"));
    }
}

//! Development toolchain configuration.
//!
//! Flattens the `dev` section of [`ShellConfig`] into the values the dev
//! command needs at runtime.

use crate::error::{CliError, Result};
use hull_config::ShellConfig;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Where the dev server binds
    pub addr: SocketAddr,

    /// Host program followed by its arguments
    pub command: Vec<String>,

    /// Working directory for the host process
    pub cwd: Option<PathBuf>,

    /// Variable carrying the dev server URL to the host
    pub server_url_env: String,

    pub poll_interval: Duration,

    /// Directory served and watched for live reload
    pub asset_root: PathBuf,

    /// Paths whose changes restart the host
    pub restart_paths: Vec<PathBuf>,

    /// `*.ext` suffixes and directory names the watcher skips
    pub watch_ignore: Vec<String>,

    /// Repeat events for one path inside this window are dropped
    pub debounce_ms: u64,

    pub watch: bool,

    pub reload: bool,
}

impl DevConfig {
    /// Derive the dev configuration from a loaded shell config.
    ///
    /// # Errors
    ///
    /// - `dev.host` is not an IP address
    /// - no host command is configured
    pub fn from_shell(config: &ShellConfig, watch: bool) -> Result<Self> {
        let ip: IpAddr = config.dev.host.parse().map_err(|_| {
            CliError::InvalidArgument(format!(
                "dev.host must be an IP address, got '{}'",
                config.dev.host
            ))
        })?;

        if config.dev.command.is_empty() {
            return Err(CliError::InvalidArgument(
                "No host command specified. Set dev.command in hull.config.toml or pass it after `--`"
                    .to_string(),
            ));
        }

        Ok(Self {
            addr: Self::find_available_port(ip, config.dev.port)?,
            command: config.dev.command.clone(),
            cwd: config.dev.cwd.clone(),
            server_url_env: config.dev.server_url_env.clone(),
            poll_interval: Duration::from_millis(config.dev.poll_interval_ms),
            asset_root: config.asset_root.clone(),
            restart_paths: config.dev.watch.clone(),
            watch_ignore: config.dev.watch_ignore.clone(),
            debounce_ms: config.dev.debounce_ms,
            watch,
            reload: config.dev.reload,
        })
    }

    /// First bindable address among `port..=port + 10`. Port `0` is passed
    /// through for the OS to choose.
    fn find_available_port(ip: IpAddr, port: u16) -> Result<SocketAddr> {
        if port == 0 {
            return Ok(SocketAddr::new(ip, 0));
        }
        if port < 1024 {
            crate::ui::warning(&format!("dev.port {} needs elevated privileges on most systems", port));
        }

        let last = port.saturating_add(10);
        let free = (port..=last)
            .map(|candidate| SocketAddr::new(ip, candidate))
            .find(|addr| std::net::TcpListener::bind(addr).is_ok());

        match free {
            Some(addr) if addr.port() != port => {
                crate::ui::warning(&format!("dev.port {} is taken, serving on {}", port, addr.port()));
                Ok(addr)
            }
            Some(addr) => Ok(addr),
            None => Err(hull_config::ConfigError::InvalidValue {
                field: "dev.port".to_string(),
                value: format!("{} (every port up to {} is in use)", port, last),
            }
            .into()),
        }
    }

    /// Every path the watcher observes.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots = Vec::with_capacity(self.restart_paths.len() + 1);
        if self.reload {
            roots.push(self.asset_root.clone());
        }
        roots.extend(self.restart_paths.iter().cloned());
        roots
    }
}

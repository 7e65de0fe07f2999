//! Development command implementation.
//!
//! Orchestrates the dev loop:
//! - HTTP server answering through the scheme resolver, with live reload
//! - Host process started once the server listens, restarted on demand
//! - File watching: asset changes reload pages, host changes restart the host
//! - Ctrl+C interrupts the host, a second Ctrl+C kills it
//!
//! Whichever side stops first takes the other one down with it.

use crate::cli::DevArgs;
use crate::commands::{build_resolver, load_config};
use crate::dev::{
    CommandLauncher, DevConfig, DevEvent, DevServer, DevServerState, FileChange, FileWatcher,
    SharedState, Supervisor, SupervisorHandle, SupervisorOutcome,
};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Execute the dev command.
///
/// # Process Flow
///
/// 1. Load configuration, applying command-line overrides
/// 2. Start the dev server; its `ServerListening` event starts the host
/// 3. Start the file watcher and the Ctrl+C forwarder
/// 4. Supervise until the host exits or the server closes
///
/// # Errors
///
/// Returns errors for:
/// - Invalid configuration or no host command
/// - Server bind failures
/// - File watcher errors
/// - The host failing to launch
pub async fn execute(args: DevArgs, config_path: Option<&Path>) -> Result<()> {
    ui::info("Starting development server...");

    let config = load_config(config_path, overrides(&args))?;
    let dev = DevConfig::from_shell(&config, !args.no_watch)?;
    let resolver = build_resolver(&config)?;

    ui::info(&format!("Asset root: {}", resolver.asset_root().display()));
    ui::info(&format!("Host command: {}", dev.command.join(" ")));

    let state: SharedState = Arc::new(DevServerState::new(resolver, dev.reload));
    let launcher = CommandLauncher::from_command(&dev.command, dev.cwd.clone(), dev.server_url_env.clone())?;

    let (events, events_rx) = SupervisorHandle::channel();
    let server = DevServer::new(dev.addr, state.clone())
        .spawn(events.clone())
        .await
        .hint("Pass --port 0 to let the OS pick a free port")?;
    ui::success(&format!("Dev server running at {}", server.url()));

    let watch_task = if dev.watch {
        spawn_watcher(&dev, state.clone(), events.clone())?
    } else {
        None
    };
    let signal_task = spawn_ctrl_c(events.clone());
    drop(events);

    ui::info("Press Ctrl+C to stop");
    let outcome = Supervisor::new(launcher, server, dev.poll_interval)
        .run(events_rx)
        .await;

    signal_task.abort();
    if let Some(task) = watch_task {
        task.abort();
    }

    report(&outcome)?;
    ui::success("Development server stopped");
    Ok(())
}

/// Command-line flags as dotted config overrides.
fn overrides(args: &DevArgs) -> Vec<(String, serde_json::Value)> {
    let mut overrides = Vec::new();
    if let Some(host) = &args.host {
        overrides.push(("dev.host".to_string(), host.clone().into()));
    }
    if let Some(port) = args.port {
        overrides.push(("dev.port".to_string(), port.into()));
    }
    if let Some(interval) = args.poll_interval_ms {
        overrides.push(("dev.poll_interval_ms".to_string(), interval.into()));
    }
    if !args.command.is_empty() {
        overrides.push(("dev.command".to_string(), args.command.clone().into()));
    }
    overrides
}

fn report(outcome: &SupervisorOutcome) -> Result<()> {
    if let Some(error) = &outcome.error {
        ui::error(error);
        return Err(CliError::Supervisor(error.clone()));
    }

    match outcome.host_exit {
        Some(exit) if exit.code == 0 => ui::info("Host exited"),
        Some(exit) => ui::warning(&format!("Host exited with code {}", exit.code)),
        None => ui::info("Dev server closed"),
    }
    if outcome.restarts > 0 {
        ui::info(&format!("Host restarted {} time(s)", outcome.restarts));
    }
    Ok(())
}

/// Forward Ctrl+C to the supervisor until it stops listening.
fn spawn_ctrl_c(events: SupervisorHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        while signal::ctrl_c().await.is_ok() {
            ui::info("Shutting down...");
            if !events.shutdown().await {
                break;
            }
        }
    })
}

/// Watch the asset root and restart paths.
///
/// Missing roots are skipped with a warning; returns `None` when nothing is
/// left to watch.
fn spawn_watcher(
    dev: &DevConfig,
    state: SharedState,
    events: SupervisorHandle,
) -> Result<Option<JoinHandle<()>>> {
    let (roots, missing): (Vec<PathBuf>, Vec<PathBuf>) =
        dev.watch_roots().into_iter().partition(|root| root.exists());
    for root in &missing {
        ui::warning(&format!("Not watching {}: path does not exist", root.display()));
    }
    if roots.is_empty() {
        return Ok(None);
    }

    let (watcher, changes) = FileWatcher::new(roots, dev.watch_ignore.clone(), dev.debounce_ms)?;
    for root in watcher.roots() {
        ui::info(&format!("Watching for changes in: {}", root.display()));
    }

    let router = ChangeRouter {
        asset_root: dev.reload.then(|| dev.asset_root.clone()),
        restart_paths: dev.restart_paths.clone(),
    };

    Ok(Some(tokio::spawn(async move {
        // Keep the watcher alive for as long as the task runs.
        let _watcher = watcher;
        router.run(changes, state, events).await;
    })))
}

/// Decides what a file change triggers.
#[derive(Debug, Clone)]
struct ChangeRouter {
    asset_root: Option<PathBuf>,
    restart_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ChangeAction {
    reload: bool,
    restart: bool,
}

impl ChangeRouter {
    fn classify(&self, path: &Path) -> ChangeAction {
        ChangeAction {
            reload: self
                .asset_root
                .as_ref()
                .is_some_and(|root| path.starts_with(root)),
            restart: self.restart_paths.iter().any(|root| path.starts_with(root)),
        }
    }

    async fn run(
        &self,
        mut changes: mpsc::Receiver<FileChange>,
        state: SharedState,
        events: SupervisorHandle,
    ) {
        while let Some(change) = changes.recv().await {
            let path = change.path();
            let action = self.classify(path);

            if action.restart {
                ui::info(&format!("Host file changed: {}", path.display()));
                if !events.restart().await {
                    break;
                }
                state.broadcast(&DevEvent::HostRestarted);
            } else if action.reload {
                ui::info(&format!("File changed: {}", path.display()));
                let clients = state.broadcast(&DevEvent::Reload {
                    paths: vec![path.display().to_string()],
                });
                tracing::debug!(clients, "reload broadcast");
            }
        }
    }
}

//! Host process supervision against the development server.
//!
//! The supervisor owns the single "current host process" slot. It starts the
//! host once the dev server is listening, replaces it on restart requests,
//! polls its exit code on a fixed interval and, on the first terminal exit,
//! closes the dev server and stops.
//!
//! The server and the host are coupled both ways: the server closing kills
//! the host, and the host exiting closes the server.

use crate::dev::process::{HostLauncher, HostProcess, TerminateSignal};
use crate::error::{CliError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Exit status of the toolchain once cleanup was attempted, whatever the host did.
pub const TOOLCHAIN_SUCCESS: i32 = 0;

/// The dev server as seen by the supervisor.
#[async_trait]
pub trait DevServerControl: Send {
    async fn close(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Exit code `0`.
    Clean,
    /// Exit code `1`.
    Ordinary,
    /// Anything else, including signal deaths.
    Abnormal,
}

impl ExitKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ExitKind::Clean,
            1 => ExitKind::Ordinary,
            _ => ExitKind::Abnormal,
        }
    }
}

/// Terminal exit of a host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostExit {
    pub code: i32,
    pub kind: ExitKind,
}

impl HostExit {
    pub fn new(code: i32) -> Self {
        Self {
            code,
            kind: ExitKind::from_code(code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Waiting for the dev server to listen.
    Idle,
    Starting,
    Running,
    Exited(HostExit),
}

/// Inputs to [`Supervisor::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    ServerListening { url: String },
    ServerClosed,
    RestartRequested,
    ShutdownRequested,
}

/// Cloneable sender for [`SupervisorEvent`]s.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    tx: mpsc::Sender<SupervisorEvent>,
}

impl SupervisorHandle {
    /// Create a handle and the receiver to pass to [`Supervisor::run`].
    pub fn channel() -> (Self, mpsc::Receiver<SupervisorEvent>) {
        let (tx, rx) = mpsc::channel(32);
        (Self { tx }, rx)
    }

    /// Deliver an event. Returns `false` once the supervisor has stopped.
    pub async fn send(&self, event: SupervisorEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    /// Non-async variant for use from watcher callbacks.
    pub fn try_send(&self, event: SupervisorEvent) -> bool {
        self.tx.try_send(event).is_ok()
    }

    pub async fn restart(&self) -> bool {
        self.send(SupervisorEvent::RestartRequested).await
    }

    pub async fn shutdown(&self) -> bool {
        self.send(SupervisorEvent::ShutdownRequested).await
    }
}

/// What [`Supervisor::run`] observed before stopping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorOutcome {
    /// The terminal exit that triggered shutdown, if any.
    pub host_exit: Option<HostExit>,
    /// Whether the dev server was closed (by us or on its own).
    pub server_closed: bool,
    pub restarts: u32,
    /// Launch failure that ended supervision early.
    pub error: Option<String>,
}

impl SupervisorOutcome {
    /// Status the toolchain itself should exit with.
    pub fn exit_status(&self) -> i32 {
        TOOLCHAIN_SUCCESS
    }
}

pub struct Supervisor<L: HostLauncher, S: DevServerControl> {
    launcher: L,
    server: S,
    server_url: Option<String>,
    current: Option<Box<dyn HostProcess>>,
    state: SupervisorState,
    poll_interval: Duration,
    restarts: u32,
    server_closed: bool,
    shutdown_requests: u32,
}

impl<L: HostLauncher, S: DevServerControl> Supervisor<L, S> {
    pub fn new(launcher: L, server: S, poll_interval: Duration) -> Self {
        Self {
            launcher,
            server,
            server_url: None,
            current: None,
            state: SupervisorState::Idle,
            poll_interval,
            restarts: 0,
            server_closed: false,
            shutdown_requests: 0,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    /// Id of the process currently held by the supervisor.
    pub fn live_process_id(&self) -> Option<u32> {
        self.current.as_ref().and_then(|process| process.id())
    }

    pub fn has_process(&self) -> bool {
        self.current.is_some()
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn server_closed(&self) -> bool {
        self.server_closed
    }

    /// The dev server is listening at `url`.
    ///
    /// The first call starts the host. Later calls (the server re-listening)
    /// replace a running host; after a terminal exit they are ignored.
    pub fn on_listening(&mut self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        info!(target: "supervisor", url = %url, "dev server listening");
        self.server_url = Some(url);

        match self.state {
            SupervisorState::Idle => self.spawn_host(),
            SupervisorState::Starting | SupervisorState::Running => self.restart(),
            SupervisorState::Exited(_) => Ok(()),
        }
    }

    /// Replace the current host with a fresh one.
    ///
    /// The outgoing process is detached and killed before the new one is
    /// spawned. A host that traps SIGINT cannot survive a restart.
    pub fn restart(&mut self) -> Result<()> {
        if self.server_url.is_none() {
            debug!(target: "supervisor", "restart ignored, dev server not listening yet");
            return Ok(());
        }

        if let Some(mut previous) = self.current.take() {
            if previous.try_exit_code().is_none() {
                info!(target: "supervisor", pid = previous.id(), "killing previous host");
                previous.terminate(TerminateSignal::Kill);
            }
        }
        self.shutdown_requests = 0;

        self.restarts += 1;
        self.spawn_host()
    }

    /// The dev server stopped on its own; a live host is killed.
    pub fn on_server_closed(&mut self) {
        self.server_closed = true;

        if let Some(process) = self.current.as_mut() {
            if process.try_exit_code().is_none() {
                warn!(target: "supervisor", pid = process.id(), "dev server closed, killing host");
                process.terminate(TerminateSignal::Kill);
            }
        }
    }

    /// Check the running host once. Returns its exit on the first terminal code.
    pub fn poll_exit(&mut self) -> Option<HostExit> {
        if self.state != SupervisorState::Running {
            return None;
        }

        let code = self.current.as_mut()?.try_exit_code()?;
        let exit = HostExit::new(code);
        match exit.kind {
            ExitKind::Clean => info!(target: "supervisor", code, "host exited successfully"),
            ExitKind::Ordinary => info!(target: "supervisor", code, "host exited"),
            ExitKind::Abnormal => error!(target: "supervisor", code, "host exited abnormally"),
        }

        self.current = None;
        self.state = SupervisorState::Exited(exit);
        Some(exit)
    }

    /// Operator asked to stop.
    ///
    /// The first request that reaches a live host interrupts it, later ones
    /// kill it. Returns `true` while a host is still held and its exit should
    /// be awaited.
    pub fn request_shutdown(&mut self) -> bool {
        let Some(process) = self.current.as_mut() else {
            return false;
        };
        if process.try_exit_code().is_some() {
            return true;
        }

        self.shutdown_requests += 1;
        let signal = if self.shutdown_requests == 1 {
            TerminateSignal::Interrupt
        } else {
            TerminateSignal::Kill
        };
        info!(target: "supervisor", pid = process.id(), ?signal, "stopping host");
        process.terminate(signal);
        true
    }

    /// Kill any remaining host and close the dev server exactly once.
    ///
    /// The close is awaited until the server confirms it. A failed close is
    /// logged and does not stop the caller from exiting.
    pub async fn shutdown(&mut self) {
        if let Some(mut process) = self.current.take() {
            if process.try_exit_code().is_none() {
                process.terminate(TerminateSignal::Kill);
            }
        }

        if self.server_closed {
            return;
        }
        self.server_closed = true;

        match self.server.close().await {
            Ok(()) => info!(target: "supervisor", "dev server closed"),
            Err(err) => error!(target: "supervisor", error = %err, "failed to close dev server"),
        }
    }

    /// Drive the state machine until the host reaches a terminal exit, the
    /// dev server goes away, or the event channel closes. Always ends with
    /// [`shutdown`](Self::shutdown).
    pub async fn run(mut self, mut events: mpsc::Receiver<SupervisorEvent>) -> SupervisorOutcome {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failure: Option<CliError> = None;

        let host_exit = loop {
            tokio::select! {
                event = events.recv() => {
                    let result = match event {
                        Some(SupervisorEvent::ServerListening { url }) => self.on_listening(url),
                        Some(SupervisorEvent::RestartRequested) => self.restart(),
                        Some(SupervisorEvent::ServerClosed) => {
                            self.on_server_closed();
                            if !self.has_process() {
                                break None;
                            }
                            Ok(())
                        }
                        Some(SupervisorEvent::ShutdownRequested) => {
                            if !self.request_shutdown() {
                                break None;
                            }
                            Ok(())
                        }
                        None => {
                            debug!(target: "supervisor", "event channel closed");
                            break None;
                        }
                    };

                    if let Err(err) = result {
                        error!(target: "supervisor", error = %err, "failed to start host");
                        failure = Some(err);
                        break None;
                    }
                }
                _ = ticker.tick() => {
                    if let Some(exit) = self.poll_exit() {
                        break Some(exit);
                    }
                }
            }
        };

        self.shutdown().await;

        SupervisorOutcome {
            host_exit,
            server_closed: self.server_closed,
            restarts: self.restarts,
            error: failure.map(|err| err.to_string()),
        }
    }

    fn spawn_host(&mut self) -> Result<()> {
        let url = self
            .server_url
            .clone()
            .ok_or_else(|| CliError::Supervisor("dev server is not listening".to_string()))?;

        let previous = self.state;
        self.state = SupervisorState::Starting;
        match self.launcher.launch(&url) {
            Ok(process) => {
                info!(target: "supervisor", pid = process.id(), url = %url, "host started");
                self.current = Some(process);
                self.state = SupervisorState::Running;
                Ok(())
            }
            Err(err) => {
                self.state = match previous {
                    SupervisorState::Starting | SupervisorState::Running => SupervisorState::Idle,
                    other => other,
                };
                Err(err)
            }
        }
    }
}

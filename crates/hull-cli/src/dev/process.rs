//! Host process spawning and termination.
//!
//! The supervisor only sees the [`HostLauncher`] and [`HostProcess`] traits;
//! [`CommandLauncher`] is the OS-backed implementation used by `hull dev`.

use crate::error::{CliError, Result};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tracing::{debug, warn};

/// How an outgoing host process is asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateSignal {
    /// SIGINT on Unix, a hard kill elsewhere.
    Interrupt,
    /// Unconditional kill.
    Kill,
}

/// A spawned host process as seen by the supervisor.
pub trait HostProcess: Send {
    fn id(&self) -> Option<u32>;

    /// Non-blocking exit check. `None` while the process is still running.
    fn try_exit_code(&mut self) -> Option<i32>;

    fn terminate(&mut self, signal: TerminateSignal);
}

/// Spawns host processes pointed at a dev server URL.
pub trait HostLauncher: Send {
    fn launch(&mut self, server_url: &str) -> Result<Box<dyn HostProcess>>;
}

/// Launches `program args...` with the dev server URL in `env_var`.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env_var: String,
}

impl CommandLauncher {
    /// Build a launcher from a `[program, args...]` command line.
    pub fn from_command(command: &[String], cwd: Option<PathBuf>, env_var: impl Into<String>) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| CliError::InvalidArgument("host command is empty".to_string()))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd,
            env_var: env_var.into(),
        })
    }
}

impl HostLauncher for CommandLauncher {
    fn launch(&mut self, server_url: &str) -> Result<Box<dyn HostProcess>> {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .env(&self.env_var, server_url)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let child = command.spawn().map_err(|source| CliError::Launch {
            program: self.program.clone(),
            source,
        })?;

        debug!(
            target: "supervisor",
            program = %self.program,
            pid = child.id(),
            env = %self.env_var,
            "spawned host process"
        );
        Ok(Box::new(ChildProcess { child }))
    }
}

/// A host process backed by a real OS child.
#[derive(Debug)]
pub struct ChildProcess {
    child: tokio::process::Child,
}

impl HostProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_exit_code(&mut self) -> Option<i32> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(exit_code(status)),
            Ok(None) => None,
            Err(err) => {
                warn!(target: "supervisor", error = %err, "failed to query host exit status");
                None
            }
        }
    }

    fn terminate(&mut self, signal: TerminateSignal) {
        let result = match signal {
            TerminateSignal::Interrupt => interrupt(&mut self.child),
            TerminateSignal::Kill => self.child.start_kill(),
        };
        if let Err(err) = result {
            // Already exited or reaped.
            debug!(target: "supervisor", error = %err, ?signal, "terminate had no effect");
        }
    }
}

#[cfg(unix)]
fn interrupt(child: &mut tokio::process::Child) -> std::io::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = i32::try_from(pid).map_err(|_| std::io::Error::other("pid out of range"))?;
    kill(Pid::from_raw(pid), Signal::SIGINT).map_err(std::io::Error::from)
}

#[cfg(not(unix))]
fn interrupt(child: &mut tokio::process::Child) -> std::io::Result<()> {
    child.start_kill()
}

/// Exit code of a finished process; signal deaths map to `128 + signo`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_splits_program() {
        let command = vec!["electron".to_string(), "main.js".to_string()];
        let launcher = CommandLauncher::from_command(&command, None, "HULL_DEV_SERVER_URL").unwrap();
        assert_eq!(launcher.program, "electron");
        assert_eq!(launcher.args, vec!["main.js"]);
    }

    #[test]
    fn test_from_command_rejects_empty() {
        let err = CommandLauncher::from_command(&[], None, "X").unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_from_signal() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(exit_code(ExitStatus::from_raw(2 << 8)), 2);
        // SIGINT
        assert_eq!(exit_code(ExitStatus::from_raw(2)), 130);
        // SIGKILL
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }

    #[tokio::test]
    async fn test_launch_missing_program() {
        let mut launcher = CommandLauncher {
            program: "hull-definitely-not-a-program".to_string(),
            args: vec![],
            cwd: None,
            env_var: "HULL_DEV_SERVER_URL".to_string(),
        };
        let err = launcher.launch("http://127.0.0.1:1").err().unwrap();
        assert!(matches!(err, CliError::Launch { .. }));
    }
}

//! Development toolchain.
//!
//! - [`server`]: local HTTP server answering through the scheme resolver,
//!   with live reload over Server-Sent Events
//! - [`supervisor`]: host process lifecycle coupled to the server
//! - [`process`]: OS process spawning and signalling
//! - [`watcher`]: file watching with debouncing

pub mod config;
pub mod process;
pub mod server;
pub mod state;
pub mod supervisor;
pub mod watcher;

// Re-exports
pub use config::DevConfig;
pub use process::{ChildProcess, CommandLauncher, HostLauncher, HostProcess, TerminateSignal};
pub use server::{DevServer, DevServerHandle};
pub use state::{DevServerState, SharedState};
pub use supervisor::{
    DevServerControl, ExitKind, HostExit, Supervisor, SupervisorEvent, SupervisorHandle,
    SupervisorOutcome, SupervisorState, TOOLCHAIN_SUCCESS,
};
pub use watcher::{FileChange, FileWatcher, IgnoreRules};

use serde::{Deserialize, Serialize};

/// Events pushed to live-reload clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DevEvent {
    /// Files under the asset root changed
    Reload { paths: Vec<String> },

    /// The host process was restarted
    HostRestarted,
}

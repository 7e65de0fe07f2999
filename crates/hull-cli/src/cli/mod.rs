//! Command-line interface definition for Hull.
//!
//! # Command Structure
//!
//! - `hull dev` - Dev server plus supervised host process
//! - `hull resolve` - Show how a scheme URL maps onto the asset root
//! - `hull entry` - Print the URL the first window would load
//! - `hull settings` - Inspect or edit the persisted feature flags
//! - `hull check` - Configuration and asset validation

mod commands;

use clap::Parser;
use std::path::PathBuf;

pub use commands::{
    CheckArgs, Command, DevArgs, EntryArgs, ResolveArgs, SettingsArgs, SettingsCommand,
};

/// Hull - desktop shell toolchain
#[derive(Parser, Debug)]
#[command(
    name = "hull",
    version,
    about = "Desktop shell toolchain: private-scheme assets and a supervised dev loop",
    long_about = "Hull serves a static web bundle to a desktop host through a private URI scheme.\n\
                  In development it runs a local server, starts the host against it and keeps\n\
                  the two alive together until either one exits."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to hull.config.toml or hull.config.json in the current directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

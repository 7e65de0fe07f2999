//! Hull CLI - desktop shell toolchain.
//!
//! Serves a static web bundle to a desktop host through a private URI scheme
//! and, in development, keeps a local dev server and the host process alive
//! together.
//!
//! # Architecture
//!
//! - [`dev`] - Dev server, host supervisor, process spawning, file watching
//! - [`shell`] - Window bootstrap against the host runtime
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal status lines
//! - `commands` - Individual CLI command implementations
//!
//! # Example
//!
//! ```rust
//! use hull_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod shell;
pub mod ui;

pub use error::{CliError, Result, ResultExt};

//! Command implementations for the Hull CLI.
//!
//! - [`dev`] - Dev server with a supervised host process
//! - [`resolve`] - Scheme URL diagnostics
//! - [`entry`] - Start URL selection
//! - [`settings`] - Persisted feature flags
//! - [`check`] - Configuration validation
//!
//! Each command provides an `execute` function taking its parsed arguments and
//! the global `--config` path.

pub mod check;
pub mod dev;
pub mod entry;
pub mod resolve;
pub mod settings;

pub use check::execute as check_execute;
pub use dev::execute as dev_execute;
pub use entry::execute as entry_execute;
pub use resolve::execute as resolve_execute;
pub use settings::execute as settings_execute;

use crate::error::Result;
use hull_config::{LoadOptions, ShellConfig};
use hull_protocol::{LocaleTable, ResolverOptions, SchemeResolver};
use std::path::{Path, PathBuf};

/// Current working directory.
pub(crate) fn get_cwd() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}

/// Load the shell configuration from the working directory, an explicit
/// file, the environment and `overrides`, in increasing priority.
pub(crate) fn load_config(
    config_path: Option<&Path>,
    overrides: Vec<(String, serde_json::Value)>,
) -> Result<ShellConfig> {
    let mut options = LoadOptions::new(get_cwd()?);
    if let Some(path) = config_path {
        options = options.with_config_path(path);
    }
    for (key, value) in overrides {
        options = options.with_override(key, value);
    }
    Ok(ShellConfig::load(&options)?)
}

/// Build the scheme resolver described by `config`.
pub(crate) fn build_resolver(config: &ShellConfig) -> Result<SchemeResolver> {
    let locales = LocaleTable::from_map(config.default_locale.clone(), config.locales.clone())?;
    Ok(SchemeResolver::new(ResolverOptions {
        scheme: config.scheme.clone(),
        asset_root: config.asset_root.clone(),
        locales,
    })?)
}

//! Settings command implementation.
//!
//! Reads and writes the persisted key-value file the shell consults for its
//! feature flags (`devTools`, `enableHttp`).

use crate::cli::{SettingsArgs, SettingsCommand};
use crate::commands::load_config;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use hull_config::SettingsStore;
use serde_json::Value;
use std::path::Path;

/// Execute the settings command.
///
/// # Errors
///
/// Returns errors for invalid configuration, an unreadable settings file, a
/// missing key on `get`, or a failed write on `set`.
pub async fn execute(args: SettingsArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, Vec::new())?;
    let mut store = SettingsStore::open(config.resolved_settings_path())
        .hint("The settings file must hold a JSON object; fix or delete it")?;

    match args.command {
        SettingsCommand::List => {
            if store.is_empty() {
                ui::info(&format!("No settings stored in {}", store.path().display()));
            }
            for (key, value) in store.iter() {
                println!("{} = {}", key, value);
            }
        }
        SettingsCommand::Get { key } => {
            let value = store
                .get(&key)
                .ok_or_else(|| CliError::InvalidArgument(format!("Unknown setting '{}'", key)))?;
            println!("{}", value);
        }
        SettingsCommand::Set { key, value } => {
            let value = parse_value(&value);
            store
                .set(key.clone(), value.clone())
                .context(format!("Saving '{}'", key))?;
            ui::success(&format!("{} = {} ({})", key, value, store.path().display()));
        }
    }

    Ok(())
}

/// Interpret a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

//! Entry command implementation.
//!
//! Runs the shell bootstrap against a headless runtime and prints the URL the
//! first window loads: the dev server when `dev.server_url_env` is set in the
//! environment, the locale's entry on the private scheme otherwise.

use crate::cli::EntryArgs;
use crate::commands::{build_resolver, load_config};
use crate::error::{CliError, Result};
use crate::shell::{Bootstrap, HostRuntime, LifecycleEvent, WindowId, WindowOptions};
use crate::ui;
use hull_config::{FeatureFlags, SettingsStore};
use std::path::Path;

/// Execute the entry command.
///
/// # Errors
///
/// Returns errors for invalid configuration or an unusable settings file.
pub async fn execute(args: EntryArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, Vec::new())?;
    let resolver = build_resolver(&config)?;

    let dev_server_url = std::env::var(&config.dev.server_url_env)
        .ok()
        .filter(|url| !url.trim().is_empty());

    let mut store = SettingsStore::open(config.resolved_settings_path())?;
    let flags = FeatureFlags::resolve(&mut store, dev_server_url.is_some())?;

    let runtime = HeadlessRuntime::new(args.locale);
    let mut shell = Bootstrap::new(runtime, resolver, flags, dev_server_url);
    shell.handle(LifecycleEvent::Ready);

    let url = shell
        .runtime()
        .loaded
        .first()
        .cloned()
        .ok_or_else(|| CliError::Custom("no window was opened".to_string()))?;

    if shell.start_target().is_dev_server() {
        ui::info("Dev server URL found in environment");
    }
    println!("{}", url);
    Ok(())
}

/// Runtime with no windowing system; records what would be loaded.
struct HeadlessRuntime {
    locale: String,
    loaded: Vec<String>,
}

impl HeadlessRuntime {
    fn new(locale: String) -> Self {
        Self {
            locale,
            loaded: Vec::new(),
        }
    }
}

impl HostRuntime for HeadlessRuntime {
    fn create_window(&mut self, _options: &WindowOptions) -> WindowId {
        WindowId(self.loaded.len() as u64)
    }

    fn load_url(&mut self, _window: WindowId, url: &str) -> std::result::Result<(), String> {
        self.loaded.push(url.to_string());
        Ok(())
    }

    fn window_count(&self) -> usize {
        self.loaded.len()
    }

    fn quit(&mut self) {}

    fn locale(&self) -> String {
        self.locale.clone()
    }
}

//! Persisted key-value settings.
//!
//! A flat JSON object stored in the platform configuration directory. Values
//! are read once at startup and written back immediately on `set`.

use crate::error::{ConfigError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Whether developer tools may be opened in the shell window.
pub const DEV_TOOLS: &str = "devTools";

/// Whether remote `http`/`https` loads are permitted.
pub const ENABLE_HTTP: &str = "enableHttp";

const SETTINGS_FILE_NAME: &str = "config.json";

/// `<platform config dir>/<app_name>/config.json`.
pub fn default_settings_path(app_name: &str) -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app_name)
        .join(SETTINGS_FILE_NAME)
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl SettingsStore {
    /// Open the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => match serde_json::from_str::<Value>(&text)? {
                Value::Object(map) => map,
                _ => return Err(ConfigError::SettingsShape(path)),
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Map::new(),
            Err(err) => return Err(err.into()),
        };

        tracing::debug!(target: "main", path = %path.display(), keys = values.len(), "settings store opened");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// `Some` only when the stored value is a JSON boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Store `value` under `key` and persist the whole file.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.values.insert(key.into(), value.into());
        self.persist()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let text = serde_json::to_string_pretty(&self.values)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, text)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// Feature flags derived from the settings store at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub dev_tools: bool,
    pub enable_http: bool,
}

impl FeatureFlags {
    /// Read the flags, normalising the stored values.
    ///
    /// A missing or non-boolean `devTools` is initialised to `development`.
    /// Anything other than `enableHttp: true` is written back as `false`.
    pub fn resolve(store: &mut SettingsStore, development: bool) -> Result<Self> {
        let dev_tools = match store.get_bool(DEV_TOOLS) {
            Some(value) => value,
            None => {
                store.set(DEV_TOOLS, development)?;
                development
            }
        };

        let enable_http = store.get(ENABLE_HTTP) == Some(&Value::Bool(true));
        if !enable_http && store.get(ENABLE_HTTP) != Some(&Value::Bool(false)) {
            store.set(ENABLE_HTTP, false)?;
        }

        Ok(Self {
            dev_tools,
            enable_http,
        })
    }
}

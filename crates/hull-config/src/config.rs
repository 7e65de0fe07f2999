//! Shell configuration types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Environment variable carrying the development server URL to the host.
pub const DEFAULT_SERVER_URL_ENV: &str = "HULL_DEV_SERVER_URL";

/// Static wiring of a Hull shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Application name; also names the settings directory.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Private URI scheme served by the shell (without `://`).
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Directory containing the packaged front-end files.
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,

    /// Locale used when the UI locale has no entry.
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Locale tag -> entry document, relative to the asset root.
    #[serde(default = "default_locales")]
    pub locales: BTreeMap<String, String>,

    /// Override for the settings file location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<PathBuf>,

    /// Development toolchain settings.
    #[serde(default)]
    pub dev: DevSettings,
}

/// Development server and host supervision settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Host program followed by its arguments.
    #[serde(default)]
    pub command: Vec<String>,

    /// Working directory for the host process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Variable through which the host receives the dev server URL.
    #[serde(default = "default_server_url_env")]
    pub server_url_env: String,

    /// Interval between host exit-code checks.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Paths whose changes restart the host process.
    #[serde(default)]
    pub watch: Vec<PathBuf>,

    /// Patterns ignored by the watcher.
    #[serde(default = "default_watch_ignore")]
    pub watch_ignore: Vec<String>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Push reload events to the front-end when assets change.
    #[serde(default = "default_reload")]
    pub reload: bool,
}

impl Default for DevSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            command: Vec::new(),
            cwd: None,
            server_url_env: default_server_url_env(),
            poll_interval_ms: default_poll_interval_ms(),
            watch: Vec::new(),
            watch_ignore: default_watch_ignore(),
            debounce_ms: default_debounce_ms(),
            reload: default_reload(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            scheme: default_scheme(),
            asset_root: default_asset_root(),
            default_locale: default_locale(),
            locales: default_locales(),
            settings_path: None,
            dev: DevSettings::default(),
        }
    }
}

impl ShellConfig {
    /// Validate field values that serde cannot check.
    ///
    /// # Errors
    ///
    /// - empty scheme or application name
    /// - default locale without an entry
    /// - zero poll interval
    pub fn validate(&self) -> Result<()> {
        if self.scheme.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "scheme".to_string(),
            });
        }

        if self.app_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "app_name".to_string(),
            });
        }

        if !self.locales.contains_key(&self.default_locale) {
            return Err(ConfigError::InvalidValue {
                field: "default_locale".to_string(),
                value: self.default_locale.clone(),
            });
        }

        if self.dev.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dev.poll_interval_ms".to_string(),
                value: "0".to_string(),
            });
        }

        if self.dev.server_url_env.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "dev.server_url_env".to_string(),
            });
        }

        Ok(())
    }

    /// Entry document of the default locale.
    pub fn default_entry(&self) -> Option<&str> {
        self.locales.get(&self.default_locale).map(String::as_str)
    }

    /// Location of the persisted settings file.
    pub fn resolved_settings_path(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| crate::settings::default_settings_path(&self.app_name))
    }
}

pub fn default_app_name() -> String {
    "hull".to_string()
}

pub fn default_scheme() -> String {
    "app".to_string()
}

pub fn default_asset_root() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_locale() -> String {
    "en-US".to_string()
}

/// The locale table shipped with the desktop build.
pub fn default_locales() -> BTreeMap<String, String> {
    [
        ("en-US", "dist/index.html"),
        ("bn", "dist/bn/index.html"),
        ("zh-CN", "dist/zh-cn/index.html"),
        ("fr", "dist/fr/index.html"),
        ("de", "dist/de/index.html"),
        ("hi", "dist/hi/index.html"),
        ("id", "dist/id/index.html"),
        ("it", "dist/it/index.html"),
        ("ja", "dist/ja/index.html"),
        ("ko", "dist/ko/index.html"),
        ("pl", "dist/pl/index.html"),
        ("pt-BR", "dist/pt-br/index.html"),
        ("ru", "dist/ru/index.html"),
        ("es", "dist/es/index.html"),
        ("uk", "dist/uk/index.html"),
        ("vi", "dist/vi/index.html"),
    ]
    .into_iter()
    .map(|(tag, entry)| (tag.to_string(), entry.to_string()))
    .collect()
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    5173
}

pub fn default_server_url_env() -> String {
    DEFAULT_SERVER_URL_ENV.to_string()
}

pub fn default_poll_interval_ms() -> u64 {
    1_000
}

pub fn default_watch_ignore() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        ".git".to_string(),
        "target".to_string(),
        "*.log".to_string(),
        ".DS_Store".to_string(),
    ]
}

pub fn default_debounce_ms() -> u64 {
    100
}

pub fn default_reload() -> bool {
    true
}

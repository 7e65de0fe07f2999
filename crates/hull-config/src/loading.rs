use crate::config::ShellConfig;
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

/// File names looked up in the working directory, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &["hull.config.toml", "hull.config.json"];

/// Inputs to [`ShellConfig::load`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Directory used for config discovery and for anchoring relative paths.
    pub cwd: PathBuf,
    /// Explicit config file; must exist when set.
    pub config_path: Option<PathBuf>,
    /// Dotted-key overrides applied last (e.g. `dev.port`).
    pub overrides: Vec<(String, serde_json::Value)>,
}

impl LoadOptions {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }
}

/// Find the first config file named in [`CONFIG_FILE_NAMES`] inside `dir`.
pub fn discover_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

impl ShellConfig {
    /// Load configuration from multiple sources.
    /// Priority: overrides > `HULL_` environment variables > config file > defaults
    pub fn load(options: &LoadOptions) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(ShellConfig::default()));

        let config_file = match &options.config_path {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    options.cwd.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path));
                }
                Some(path)
            }
            None => discover_config_file(&options.cwd),
        };

        if let Some(path) = &config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        // HULL_SCHEME, HULL_DEV__PORT, ...
        figment = figment.merge(Env::prefixed("HULL_").split("__"));

        for (key, value) in &options.overrides {
            figment = figment.merge(Serialized::default(key, value));
        }

        let mut config: ShellConfig = figment.extract()?;
        config.anchor(&options.cwd);
        config.validate()?;
        Ok(config)
    }

    /// Make relative paths absolute against `cwd`.
    fn anchor(&mut self, cwd: &Path) {
        if self.asset_root.is_relative() {
            self.asset_root = cwd.join(&self.asset_root);
        }
        if let Some(path) = self.settings_path.as_mut().filter(|path| path.is_relative()) {
            *path = cwd.join(&*path);
        }
        if let Some(dir) = self.dev.cwd.as_mut().filter(|dir| dir.is_relative()) {
            *dir = cwd.join(&*dir);
        }
        for path in self.dev.watch.iter_mut().filter(|path| path.is_relative()) {
            *path = cwd.join(&*path);
        }
    }
}

//! Configuration for Hull desktop shells.
//!
//! Two kinds of state live here:
//!
//! - [`ShellConfig`]: static shell wiring (scheme, asset root, locale table,
//!   development toolchain), layered from defaults, a config file, `HULL_`
//!   environment variables and CLI overrides.
//! - [`SettingsStore`]: a small persisted key-value file holding user-facing
//!   feature flags such as developer tools, read and written at runtime.

pub mod config;
pub mod error;
pub mod loading;
pub mod settings;
pub mod validation;

// Re-export main types
pub use config::*;
pub use error::*;
pub use loading::{discover_config_file, LoadOptions, CONFIG_FILE_NAMES};
pub use settings::*;

pub use validation::{check_assets, AssetReport};

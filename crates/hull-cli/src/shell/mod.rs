//! Host window bootstrap.
//!
//! The window runtime is an external collaborator reached through
//! [`HostRuntime`]. [`Bootstrap`] sequences its lifecycle events and decides
//! what the first window loads: the dev server URL when one was handed down
//! through the environment, the private scheme otherwise.

mod bootstrap;

pub use bootstrap::{Bootstrap, LifecycleEvent};

use hull_protocol::SchemeResolver;
use std::fmt;

/// Opaque identifier of a runtime window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    pub width: u32,
    pub height: u32,
    pub dev_tools: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            dev_tools: false,
        }
    }
}

/// Window and application primitives provided by the host runtime.
pub trait HostRuntime {
    fn create_window(&mut self, options: &WindowOptions) -> WindowId;

    /// Load `url` into `window`. Failures are reported, not fatal.
    fn load_url(&mut self, window: WindowId, url: &str) -> Result<(), String>;

    fn window_count(&self) -> usize;

    fn quit(&mut self);

    /// UI locale tag, e.g. `zh-CN`.
    fn locale(&self) -> String;
}

/// What the first window loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartTarget {
    /// Live development server
    DevServer(String),
    /// Packaged entry on the private scheme
    Scheme(String),
}

impl StartTarget {
    pub fn url(&self) -> &str {
        match self {
            StartTarget::DevServer(url) | StartTarget::Scheme(url) => url,
        }
    }

    pub fn is_dev_server(&self) -> bool {
        matches!(self, StartTarget::DevServer(_))
    }
}

impl fmt::Display for StartTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

/// Pick the start URL. A non-empty dev server URL wins; otherwise the
/// locale's entry on the private scheme.
pub fn start_target(dev_server_url: Option<&str>, resolver: &SchemeResolver, locale: &str) -> StartTarget {
    match dev_server_url.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => StartTarget::DevServer(url.to_string()),
        None => StartTarget::Scheme(resolver.entry_url(locale)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hull_protocol::{LocaleTable, ResolverOptions};

    fn resolver() -> SchemeResolver {
        SchemeResolver::new(ResolverOptions {
            scheme: "k8s-website-v1-24".to_string(),
            asset_root: std::env::temp_dir(),
            locales: LocaleTable::builtin(),
        })
        .unwrap()
    }

    #[test]
    fn test_start_target_prefers_dev_server() {
        let target = start_target(Some("http://127.0.0.1:5173"), &resolver(), "zh-CN");
        assert_eq!(target, StartTarget::DevServer("http://127.0.0.1:5173".to_string()));
        assert!(target.is_dev_server());
    }

    #[test]
    fn test_start_target_uses_locale_entry() {
        let target = start_target(None, &resolver(), "zh-CN");
        assert_eq!(target.url(), "k8s-website-v1-24://dist/zh-cn/index.html");

        let target = start_target(Some("  "), &resolver(), "tlh");
        assert_eq!(target.url(), "k8s-website-v1-24://dist/index.html");
    }
}

//! Refusal of remote `http`/`https` loads inside the shell.
//!
//! Packaged builds render only their own scheme; every remote URL is answered
//! with 403 unless remote access was explicitly enabled. Origins can be
//! allowed individually, which is how the development server stays reachable.

use crate::response::ResponseDescriptor;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct RemoteGuard {
    allow_remote: bool,
    allowed_origins: Vec<String>,
}

impl RemoteGuard {
    pub fn new(allow_remote: bool) -> Self {
        Self {
            allow_remote,
            allowed_origins: Vec::new(),
        }
    }

    /// Permit an origin such as `http://127.0.0.1:5173` while remote access
    /// is otherwise disabled.
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        self.allowed_origins
            .push(origin.trim_end_matches('/').to_ascii_lowercase());
        self
    }

    pub fn allows_remote(&self) -> bool {
        self.allow_remote
    }

    /// Returns a `Forbidden` descriptor when `url` must be refused.
    ///
    /// Non-HTTP URLs are never intercepted.
    pub fn check(&self, url: &str) -> Option<ResponseDescriptor> {
        if self.allow_remote || !is_remote(url) {
            return None;
        }

        let lowered = url.to_ascii_lowercase();
        let allowed = self.allowed_origins.iter().any(|origin| {
            lowered
                .strip_prefix(origin.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
        });
        if allowed {
            return None;
        }

        info!(target: "disable_http", url, "refusing remote request");
        Some(ResponseDescriptor::Forbidden {
            url: url.to_string(),
        })
    }
}

fn is_remote(url: &str) -> bool {
    let lowered = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_remote_by_default() {
        let guard = RemoteGuard::new(false);
        let response = guard.check("https://example.com/x").unwrap();
        assert_eq!(response.status(), 403);
        assert!(guard.check("HTTP://example.com").is_some());
    }

    #[test]
    fn test_passes_non_http_urls() {
        let guard = RemoteGuard::new(false);
        assert!(guard.check("app://dist/index.html").is_none());
        assert!(guard.check("file:///tmp/a").is_none());
        assert!(guard.check("ht").is_none());
    }

    #[test]
    fn test_allow_remote_disables_guard() {
        let guard = RemoteGuard::new(true);
        assert!(guard.allows_remote());
        assert!(guard.check("https://example.com").is_none());
    }

    #[test]
    fn test_allowed_origin() {
        let guard = RemoteGuard::new(false).allow_origin("http://127.0.0.1:5173/");
        assert!(guard.check("http://127.0.0.1:5173").is_none());
        assert!(guard.check("http://127.0.0.1:5173/src/main.ts?t=1").is_none());
        assert!(guard.check("http://127.0.0.1:51730/").is_some());
        assert!(guard.check("http://127.0.0.1:5173.evil.com/").is_some());
    }
}

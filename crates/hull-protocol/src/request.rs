//! Incoming scheme requests and the string-level sanitizing applied to them.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading run of `..` segments, each terminated by `/`, `\` or end of input.
static LEADING_TRAVERSAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\.\.(?:/|\\|$))+").expect("traversal pattern is valid"));

/// A request for the application's private scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeRequest {
    raw_url: String,
    scheme: String,
}

impl SchemeRequest {
    /// Create a request. Never fails; malformed URLs are handled at resolution time.
    pub fn new(scheme: impl Into<String>, raw_url: impl Into<String>) -> Self {
        Self {
            raw_url: raw_url.into(),
            scheme: scheme.into(),
        }
    }

    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Path portion of the URL with the scheme prefix, query and fragment removed.
    pub fn candidate(&self) -> &str {
        candidate_path(&self.raw_url, &self.scheme)
    }

    /// Candidate path with leading traversal segments stripped.
    pub fn sanitized(&self) -> &str {
        strip_traversal(self.candidate())
    }
}

/// Extract the candidate relative path from a raw scheme URL.
///
/// The `scheme://` prefix is removed when present. URLs carrying another
/// scheme (or the same scheme in different case) lose everything up to the
/// first `://`; strings without a separator are used as-is. Everything from
/// the first `?` or `#` onward is discarded.
///
/// # Examples
///
/// ```
/// use hull_protocol::candidate_path;
///
/// assert_eq!(candidate_path("app://zh-cn/index.html?x=1", "app"), "zh-cn/index.html");
/// assert_eq!(candidate_path("app://", "app"), "");
/// ```
pub fn candidate_path<'a>(raw_url: &'a str, scheme: &str) -> &'a str {
    let rest = raw_url
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix("://"))
        .or_else(|| raw_url.split_once("://").map(|(_, rest)| rest))
        .unwrap_or(raw_url);

    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Strip every leading `../` or `..\` segment from a candidate path.
///
/// Stripping is repeated, so mixed runs such as `../..\../` are removed in
/// one call. A bare `..` is reduced to the empty string.
///
/// # Examples
///
/// ```
/// use hull_protocol::strip_traversal;
///
/// assert_eq!(strip_traversal("../../etc/passwd"), "etc/passwd");
/// assert_eq!(strip_traversal("..\\../x"), "x");
/// ```
pub fn strip_traversal(candidate: &str) -> &str {
    match LEADING_TRAVERSAL.find(candidate) {
        Some(m) => &candidate[m.end()..],
        None => candidate,
    }
}

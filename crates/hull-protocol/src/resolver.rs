//! Mapping of scheme requests onto the packaged asset directory.
//!
//! Resolution follows a fixed pipeline:
//!
//! 1. strip `scheme://`, the query and the fragment from the raw URL
//! 2. strip every leading `..` segment
//! 3. normalize the remaining segments lexically, never climbing above the root
//! 4. append `index.html` to directory-style paths
//! 5. serve the file when it is readable, otherwise serve the default entry
//!
//! The resolver never returns an error: every input produces a descriptor the
//! host can render.

use crate::error::{ProtocolError, Result};
use crate::locale::LocaleTable;
use crate::request::{strip_traversal, SchemeRequest};
use crate::response::{FallbackReason, ResponseDescriptor};
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Entry document appended to directory requests.
pub const DEFAULT_ENTRY: &str = "index.html";

/// Construction parameters for [`SchemeResolver`].
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Scheme token, without `://`.
    pub scheme: String,
    /// Directory containing all packaged front-end files.
    pub asset_root: PathBuf,
    /// Locale table used for start-document selection and the fallback.
    pub locales: LocaleTable,
}

/// Result of mapping a request onto disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Root joined with the sanitized candidate, before normalization.
    pub requested_path: String,
    /// Normalized path, always inside the asset root.
    pub normalized_path: PathBuf,
    /// Whether `normalized_path` was a readable file.
    pub exists: bool,
}

/// Full diagnostic record of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: String,
    /// Candidate after query removal and traversal stripping.
    pub candidate: String,
    pub resolved: ResolvedPath,
    pub response: ResponseDescriptor,
}

#[derive(Debug)]
struct Inner {
    scheme: String,
    root: PathBuf,
    locales: LocaleTable,
    fallback: PathBuf,
}

/// Resolver for the application's private scheme.
///
/// Holds only immutable state, so clones are cheap and concurrent resolutions
/// need no coordination.
#[derive(Debug, Clone)]
pub struct SchemeResolver {
    inner: Arc<Inner>,
}

enum Access {
    File,
    Directory,
    Unreadable,
    Missing,
}

impl SchemeResolver {
    /// Create a resolver.
    ///
    /// # Errors
    ///
    /// Fails when the scheme token is not a valid URI scheme or a locale entry
    /// would resolve outside the asset root.
    pub fn new(options: ResolverOptions) -> Result<Self> {
        validate_scheme(&options.scheme)?;

        let root = std::path::absolute(&options.asset_root)
            .unwrap_or_else(|_| options.asset_root.clone())
            .clean();

        for (locale, entry) in options.locales.iter() {
            if strip_traversal(entry) != entry || confine(&root, entry).is_none() {
                return Err(ProtocolError::EntryEscapesRoot {
                    locale: locale.to_string(),
                    entry: entry.to_string(),
                });
            }
        }

        let fallback = confine(&root, options.locales.default_entry())
            .unwrap_or_else(|| root.join(DEFAULT_ENTRY));

        Ok(Self {
            inner: Arc::new(Inner {
                scheme: options.scheme,
                root,
                locales: options.locales,
                fallback,
            }),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.inner.scheme
    }

    /// Absolute, normalized asset root.
    pub fn asset_root(&self) -> &Path {
        &self.inner.root
    }

    pub fn locales(&self) -> &LocaleTable {
        &self.inner.locales
    }

    /// The document served whenever a request cannot be satisfied.
    pub fn fallback_path(&self) -> &Path {
        &self.inner.fallback
    }

    /// Entry document for a UI locale; unknown locales get the default entry.
    pub fn entry_for_locale(&self, locale: &str) -> &str {
        self.inner.locales.entry_for(locale)
    }

    /// Start URL for a UI locale, e.g. `app://dist/zh-cn/index.html`.
    pub fn entry_url(&self, locale: &str) -> String {
        format!("{}://{}", self.inner.scheme, self.entry_for_locale(locale))
    }

    /// Build a request for this resolver's scheme.
    pub fn request(&self, raw_url: impl Into<String>) -> SchemeRequest {
        SchemeRequest::new(self.inner.scheme.clone(), raw_url)
    }

    /// Resolve a raw URL string for the given UI locale.
    pub async fn resolve_url(&self, raw_url: &str, locale: &str) -> ResponseDescriptor {
        self.resolve(&self.request(raw_url), locale).await
    }

    /// Resolve a request to a response descriptor.
    ///
    /// `locale` only matters for the no-path request (`app://`), which is
    /// answered with that locale's entry document.
    pub async fn resolve(&self, request: &SchemeRequest, locale: &str) -> ResponseDescriptor {
        self.resolve_detailed(request, locale).await.response
    }

    /// Resolve a request and keep every intermediate path for diagnostics.
    pub async fn resolve_detailed(&self, request: &SchemeRequest, locale: &str) -> Resolution {
        let url = request.raw_url();
        let sanitized = request.sanitized();
        let candidate = if sanitized.trim_matches(['/', '\\']).is_empty() {
            self.entry_for_locale(locale)
        } else {
            sanitized
        };
        let root = &self.inner.root;

        let requested_path = root
            .join(candidate.trim_start_matches(['/', '\\']))
            .display()
            .to_string();

        let Some(mut normalized) = confine(root, candidate) else {
            return self.fall_back(
                url,
                candidate,
                requested_path,
                root.clone(),
                FallbackReason::Malformed,
            );
        };

        if candidate.is_empty() || candidate.ends_with(['/', '\\']) {
            normalized.push(DEFAULT_ENTRY);
        }

        let mut found = check_access(&normalized).await;
        if matches!(found, Access::Directory) {
            normalized.push(DEFAULT_ENTRY);
            found = check_access(&normalized).await;
        }

        match found {
            Access::File => {
                info!(
                    target: "loader",
                    url,
                    candidate,
                    requested_path = %requested_path,
                    normalized_path = %normalized.display(),
                    "serving asset"
                );
                Resolution {
                    url: url.to_string(),
                    candidate: candidate.to_string(),
                    resolved: ResolvedPath {
                        requested_path,
                        normalized_path: normalized.clone(),
                        exists: true,
                    },
                    response: ResponseDescriptor::file(normalized),
                }
            }
            Access::Unreadable => {
                self.fall_back(url, candidate, requested_path, normalized, FallbackReason::Unreadable)
            }
            Access::Directory | Access::Missing => {
                self.fall_back(url, candidate, requested_path, normalized, FallbackReason::NotFound)
            }
        }
    }

    fn fall_back(
        &self,
        url: &str,
        candidate: &str,
        requested_path: String,
        normalized: PathBuf,
        reason: FallbackReason,
    ) -> Resolution {
        let fallback = self.inner.fallback.clone();
        warn!(
            target: "loader",
            url,
            candidate,
            requested_path = %requested_path,
            normalized_path = %normalized.display(),
            fallback_path = %fallback.display(),
            reason = reason.as_str(),
            "falling back to default entry"
        );
        Resolution {
            url: url.to_string(),
            candidate: candidate.to_string(),
            resolved: ResolvedPath {
                requested_path,
                normalized_path: normalized,
                exists: false,
            },
            response: ResponseDescriptor::fallback(fallback, reason),
        }
    }
}

/// Lexically normalize `candidate` beneath `root`.
///
/// Both `/` and `\` separate segments. `..` removes the previous segment but
/// never climbs above `root`. Returns `None` for segments that could change
/// the path's anchor on some platform (drive prefixes) or contain NUL.
fn confine(root: &Path, candidate: &str) -> Option<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in candidate.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s if s.contains([':', '\0']) => return None,
            s => segments.push(s),
        }
    }

    let mut path = root.to_path_buf();
    path.extend(segments);
    Some(path)
}

/// Check read access to a path without following it outside the filesystem API.
async fn check_access(path: &Path) -> Access {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Access::Directory,
        Ok(meta) if meta.is_file() => match tokio::fs::File::open(path).await {
            Ok(_) => Access::File,
            Err(_) => Access::Unreadable,
        },
        Ok(_) => Access::Unreadable,
        Err(_) => Access::Missing,
    }
}

fn validate_scheme(scheme: &str) -> Result<()> {
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(ProtocolError::InvalidScheme(scheme.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, SchemeResolver) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("dist/zh-cn")).unwrap();
        fs::create_dir_all(root.join("dist/assets")).unwrap();
        fs::write(root.join("dist/index.html"), "<html>en</html>").unwrap();
        fs::write(root.join("dist/zh-cn/index.html"), "<html>zh</html>").unwrap();
        fs::write(root.join("dist/assets/app.js"), "console.log(1)").unwrap();

        let resolver = SchemeResolver::new(ResolverOptions {
            scheme: "app".to_string(),
            asset_root: root.to_path_buf(),
            locales: LocaleTable::builtin(),
        })
        .unwrap();
        (temp, resolver)
    }

    #[test]
    fn test_confine_never_escapes() {
        let root = Path::new("/srv/app");
        for candidate in ["a/../../..", "x/../../../etc/passwd", "..", "a\\..\\..\\b", "./././"] {
            let path = confine(root, candidate).unwrap();
            assert!(path.starts_with(root), "{candidate} -> {}", path.display());
        }
        assert_eq!(confine(root, "a/./b//c").unwrap(), Path::new("/srv/app/a/b/c"));
        assert_eq!(confine(root, "a/../b").unwrap(), Path::new("/srv/app/b"));
    }

    #[test]
    fn test_confine_rejects_drive_prefixes() {
        let root = Path::new("/srv/app");
        assert!(confine(root, "C:/Windows/win.ini").is_none());
        assert!(confine(root, "a/b\0c").is_none());
    }

    #[test]
    fn test_validate_scheme() {
        assert!(validate_scheme("app").is_ok());
        assert!(validate_scheme("k8s-website-v1-24").is_ok());
        assert!(validate_scheme("my.app+v2").is_ok());
        assert!(validate_scheme("").is_err());
        assert!(validate_scheme("1app").is_err());
        assert!(validate_scheme("app://").is_err());
    }

    #[test]
    fn test_new_rejects_escaping_entry() {
        let err = SchemeResolver::new(ResolverOptions {
            scheme: "app".to_string(),
            asset_root: PathBuf::from("/srv/app"),
            locales: LocaleTable::new("en", "../outside/index.html"),
        })
        .unwrap_err();
        assert!(matches!(err, ProtocolError::EntryEscapesRoot { .. }));
    }

    #[tokio::test]
    async fn test_serves_existing_file() {
        let (_temp, resolver) = fixture();
        let response = resolver.resolve_url("app://dist/assets/app.js", "en-US").await;

        assert!(!response.is_fallback());
        assert_eq!(response.content_type(), "application/javascript");
        assert_eq!(
            response.path().unwrap(),
            resolver.asset_root().join("dist/assets/app.js")
        );
    }

    #[tokio::test]
    async fn test_directory_request_appends_index() {
        let (_temp, resolver) = fixture();

        let response = resolver.resolve_url("app://dist/zh-cn/", "en-US").await;
        assert!(!response.is_fallback());
        assert_eq!(
            response.path().unwrap(),
            resolver.asset_root().join("dist/zh-cn/index.html")
        );

        // Existing directory without a trailing separator behaves the same.
        let response = resolver.resolve_url("app://dist/zh-cn", "en-US").await;
        assert_eq!(
            response.path().unwrap(),
            resolver.asset_root().join("dist/zh-cn/index.html")
        );
    }

    #[tokio::test]
    async fn test_missing_file_falls_back() {
        let (_temp, resolver) = fixture();
        let resolution = resolver
            .resolve_detailed(&resolver.request("app://dist/routes/settings"), "en-US")
            .await;

        assert!(!resolution.resolved.exists);
        assert_eq!(
            resolution.response,
            ResponseDescriptor::Fallback {
                path: resolver.asset_root().join("dist/index.html"),
                content_type: "text/html; charset=utf-8",
                reason: FallbackReason::NotFound,
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_candidate_falls_back() {
        let (_temp, resolver) = fixture();
        let response = resolver.resolve_url("app://C:/Windows/win.ini", "en-US").await;
        assert!(matches!(
            response,
            ResponseDescriptor::Fallback {
                reason: FallbackReason::Malformed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_no_path_request_uses_locale_entry() {
        let (_temp, resolver) = fixture();

        let resolution = resolver.resolve_detailed(&resolver.request("app://"), "zh-CN").await;
        assert_eq!(resolution.candidate, "dist/zh-cn/index.html");
        assert!(!resolution.response.is_fallback());
        assert_eq!(resolution.response.read().await.unwrap(), b"<html>zh</html>");

        let response = resolver.resolve_url("app://?x=1", "xx-YY").await;
        assert_eq!(response.read().await.unwrap(), b"<html>en</html>");

        // A real path ignores the locale.
        let response = resolver.resolve_url("app://dist/assets/app.js", "zh-CN").await;
        assert_eq!(response.path().unwrap(), resolver.asset_root().join("dist/assets/app.js"));
    }

    #[tokio::test]
    async fn test_entry_url_by_locale() {
        let (_temp, resolver) = fixture();
        assert_eq!(resolver.entry_url("zh-CN"), "app://dist/zh-cn/index.html");
        assert_eq!(resolver.entry_url("xx-YY"), "app://dist/index.html");
        assert_eq!(resolver.fallback_path(), resolver.asset_root().join("dist/index.html"));
    }
}

//! Change notifications for the dev loop.
//!
//! One [`FileWatcher`] covers the asset root (live reload) and any host files
//! listed in `dev.watch` (host restart). Events pass through [`IgnoreRules`]
//! and a per-path debounce before reaching the channel.

use crate::error::{CliError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    fn from_kind(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            EventKind::Remove(_) => Some(FileChange::Removed(path)),
            _ => None,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(path) | FileChange::Created(path) | FileChange::Removed(path) => {
                path
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    /// `*.log`: file name suffix
    Suffix(String),
    /// `node_modules`: any path component with this name
    Component(String),
}

/// Ignore patterns compiled against a fixed set of watch roots.
///
/// Paths outside every root, hidden entries and pattern matches are ignored.
/// Matching is relative to the root, so a watched file is matched by its own
/// name.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    roots: Vec<PathBuf>,
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    pub fn new(roots: &[PathBuf], patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .map(|pattern| match pattern.strip_prefix('*') {
                Some(suffix) => Pattern::Suffix(suffix.to_string()),
                None => Pattern::Component(pattern.trim_matches('/').to_string()),
            })
            .collect();

        Self {
            roots: roots.to_vec(),
            patterns,
        }
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(relative) = self.relative(path) else {
            return true;
        };

        let names: Vec<&str> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();

        if names.iter().any(|name| name.starts_with('.')) {
            return true;
        }

        self.patterns.iter().any(|pattern| match pattern {
            Pattern::Suffix(suffix) => names.last().is_some_and(|name| name.ends_with(suffix.as_str())),
            Pattern::Component(wanted) => names.iter().any(|name| name == wanted),
        })
    }

    fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        let root = self.roots.iter().find(|root| path.starts_with(root))?;
        let relative = path.strip_prefix(root).ok()?;
        if relative.as_os_str().is_empty() {
            path.file_name().map(Path::new)
        } else {
            Some(relative)
        }
    }
}

/// Drops repeat events for the same path inside the debounce window.
#[derive(Debug)]
struct Debouncer {
    window: Duration,
    seen: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            window,
            seen: HashMap::new(),
        }
    }

    fn admit(&mut self, path: &Path, now: Instant) -> bool {
        let window = self.window;
        self.seen.retain(|_, last| now.duration_since(*last) < window);
        if self.seen.contains_key(path) {
            return false;
        }
        self.seen.insert(path.to_path_buf(), now);
        true
    }
}

/// Recursive watcher over directories and single files.
///
/// Dropping it stops delivery; the receiver then yields `None`.
pub struct FileWatcher {
    _inner: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl FileWatcher {
    /// Start watching `roots`.
    ///
    /// # Errors
    ///
    /// Fails when a root does not exist or the platform watcher cannot be set up.
    pub fn new(
        roots: Vec<PathBuf>,
        ignore: Vec<String>,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if let Some(missing) = roots.iter().find(|root| !root.exists()) {
            return Err(CliError::FileNotFound(missing.clone()));
        }

        let rules = IgnoreRules::new(&roots, &ignore);
        let mut debouncer = Debouncer::new(Duration::from_millis(debounce_ms));
        let (tx, rx) = mpsc::channel(128);

        let mut inner = notify::recommended_watcher(move |event: notify::Result<Event>| {
            let Ok(event) = event else {
                return;
            };
            let now = Instant::now();

            for path in event.paths {
                if rules.is_ignored(&path) || !debouncer.admit(&path, now) {
                    continue;
                }
                if let Some(change) = FileChange::from_kind(&event.kind, path) {
                    // Receiver gone means the dev loop is shutting down.
                    if tx.blocking_send(change).is_err() {
                        return;
                    }
                }
            }
        })?;

        for root in &roots {
            let mode = if root.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            inner.watch(root, mode)?;
        }

        Ok((
            Self {
                _inner: inner,
                roots,
            },
            rx,
        ))
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(patterns: &[&str]) -> IgnoreRules {
        let roots = vec![PathBuf::from("/project/app"), PathBuf::from("/project/main.js")];
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        IgnoreRules::new(&roots, &patterns)
    }

    #[test]
    fn test_component_pattern() {
        let rules = rules(&["node_modules"]);
        assert!(rules.is_ignored(Path::new("/project/app/node_modules/pkg/index.js")));
        assert!(rules.is_ignored(Path::new("/project/app/dist/node_modules/x.js")));
        assert!(!rules.is_ignored(Path::new("/project/app/dist/index.html")));
        assert!(!rules.is_ignored(Path::new("/project/app/node_modules_backup/a.js")));
    }

    #[test]
    fn test_suffix_pattern() {
        let rules = rules(&["*.log", "*~"]);
        assert!(rules.is_ignored(Path::new("/project/app/debug.log")));
        assert!(rules.is_ignored(Path::new("/project/app/dist/index.html~")));
        assert!(!rules.is_ignored(Path::new("/project/app/log/index.html")));
    }

    #[test]
    fn test_hidden_entries() {
        let rules = rules(&[]);
        assert!(rules.is_ignored(Path::new("/project/app/.git/config")));
        assert!(rules.is_ignored(Path::new("/project/app/dist/.cache/file.js")));
    }

    #[test]
    fn test_watched_file_matches_by_name() {
        assert!(!rules(&[]).is_ignored(Path::new("/project/main.js")));
        assert!(rules(&["*.js"]).is_ignored(Path::new("/project/main.js")));
    }

    #[test]
    fn test_outside_roots() {
        assert!(rules(&[]).is_ignored(Path::new("/other/file.js")));
    }

    #[test]
    fn test_debounce_per_path() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();
        let a = Path::new("/project/app/a.js");
        let b = Path::new("/project/app/b.js");

        assert!(debouncer.admit(a, start));
        assert!(debouncer.admit(b, start));
        assert!(!debouncer.admit(a, start + Duration::from_millis(50)));
        assert!(debouncer.admit(a, start + Duration::from_millis(150)));
    }

    #[test]
    fn test_event_kinds() {
        let path = PathBuf::from("/project/app/a.js");
        let kind = EventKind::Create(notify::event::CreateKind::File);
        assert_eq!(FileChange::from_kind(&kind, path.clone()), Some(FileChange::Created(path.clone())));
        assert_eq!(FileChange::from_kind(&EventKind::Any, path), None);
    }

    #[test]
    fn test_missing_root() {
        let result = FileWatcher::new(vec![PathBuf::from("/definitely/not/here")], vec![], 100);
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }
}

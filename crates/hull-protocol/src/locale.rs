//! Locale-to-entry mapping for the shell's start document.

use crate::error::{ProtocolError, Result};
use std::collections::BTreeMap;

/// Static mapping from locale tag to the entry document shipped for it.
///
/// The table always holds exactly one designated default. Lookups are exact
/// matches on the tag; any unknown tag yields the default entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleTable {
    default_tag: String,
    entries: BTreeMap<String, String>,
}

impl LocaleTable {
    /// Create a table containing only the default locale.
    pub fn new(default_tag: impl Into<String>, default_entry: impl Into<String>) -> Self {
        let default_tag = default_tag.into();
        let mut entries = BTreeMap::new();
        entries.insert(default_tag.clone(), default_entry.into());
        Self {
            default_tag,
            entries,
        }
    }

    /// Add or replace the entry for a locale tag.
    pub fn with_entry(mut self, tag: impl Into<String>, entry: impl Into<String>) -> Self {
        self.entries.insert(tag.into(), entry.into());
        self
    }

    /// Build a table from a configured map.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingDefaultLocale`] if `default_tag` has no entry.
    pub fn from_map(
        default_tag: impl Into<String>,
        entries: BTreeMap<String, String>,
    ) -> Result<Self> {
        let default_tag = default_tag.into();
        if !entries.contains_key(&default_tag) {
            return Err(ProtocolError::MissingDefaultLocale(default_tag));
        }
        Ok(Self {
            default_tag,
            entries,
        })
    }

    /// The table shipped with the desktop build: English is the primary
    /// edition at `dist/index.html`, translations live under `dist/<lang>/`.
    pub fn builtin() -> Self {
        Self::new("en-US", "dist/index.html")
            .with_entry("bn", "dist/bn/index.html")
            .with_entry("zh-CN", "dist/zh-cn/index.html")
            .with_entry("fr", "dist/fr/index.html")
            .with_entry("de", "dist/de/index.html")
            .with_entry("hi", "dist/hi/index.html")
            .with_entry("id", "dist/id/index.html")
            .with_entry("it", "dist/it/index.html")
            .with_entry("ja", "dist/ja/index.html")
            .with_entry("ko", "dist/ko/index.html")
            .with_entry("pl", "dist/pl/index.html")
            .with_entry("pt-BR", "dist/pt-br/index.html")
            .with_entry("ru", "dist/ru/index.html")
            .with_entry("es", "dist/es/index.html")
            .with_entry("uk", "dist/uk/index.html")
            .with_entry("vi", "dist/vi/index.html")
    }

    /// Entry for `tag`, or the default entry when the tag is unknown.
    pub fn entry_for(&self, tag: &str) -> &str {
        self.entries
            .get(tag)
            .map(String::as_str)
            .unwrap_or_else(|| self.default_entry())
    }

    pub fn default_tag(&self) -> &str {
        &self.default_tag
    }

    pub fn default_entry(&self) -> &str {
        // Every constructor inserts the default tag.
        self.entries
            .get(&self.default_tag)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(tag, entry)` pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for LocaleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

use crate::config::ShellConfig;
use std::path::PathBuf;

/// Result of checking the locale table against the asset root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetReport {
    /// `(locale tag, expected path)` for every entry present on disk.
    pub present: Vec<(String, PathBuf)>,
    /// `(locale tag, expected path)` for every entry missing on disk.
    pub missing: Vec<(String, PathBuf)>,
    /// Whether the default locale's entry (the fallback document) exists.
    pub fallback_present: bool,
}

impl AssetReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check that every locale entry exists under the configured asset root.
pub fn check_assets(config: &ShellConfig) -> AssetReport {
    let mut report = AssetReport::default();

    for (tag, entry) in &config.locales {
        let path = config.asset_root.join(entry);
        if path.is_file() {
            if *tag == config.default_locale {
                report.fallback_present = true;
            }
            report.present.push((tag.clone(), path));
        } else {
            report.missing.push((tag.clone(), path));
        }
    }

    report
}

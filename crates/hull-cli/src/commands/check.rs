//! Check command implementation.
//!
//! Validates the configuration and reports locale entries missing from the
//! asset root.

use crate::cli::CheckArgs;
use crate::commands::{build_resolver, load_config};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use hull_config::{check_assets, discover_config_file};
use std::path::Path;

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Load and validate the configuration
/// 2. Build the scheme resolver (scheme token, entry confinement)
/// 3. Check every locale entry exists under the asset root
///
/// # Errors
///
/// Returns errors for invalid configuration, a missing fallback document, or
/// (with `--strict`) any missing locale entry.
pub async fn execute(args: CheckArgs, config_path: Option<&Path>) -> Result<()> {
    ui::info("Checking configuration...");

    match config_path {
        Some(path) => ui::info(&format!("Using {}", path.display())),
        None => match discover_config_file(&super::get_cwd()?) {
            Some(path) => ui::info(&format!("Using {}", path.display())),
            None => ui::warning("No hull.config.toml found, using defaults"),
        },
    }

    let config = load_config(config_path, Vec::new())?;
    let resolver = build_resolver(&config)?;
    ui::success("Configuration is valid!");

    ui::info(&format!(
        "Checking locale entries in {}...",
        resolver.asset_root().display()
    ));
    let report = check_assets(&config);

    for (tag, path) in &report.present {
        ui::success(&format!("  {} -> {}", tag, path.display()));
    }
    for (tag, path) in &report.missing {
        ui::warning(&format!("  {} missing: {}", tag, path.display()));
    }

    if !report.fallback_present {
        return Err::<(), _>(CliError::FileNotFound(resolver.fallback_path().to_path_buf()))
            .hint("Build the front-end bundle into asset_root; every unknown route falls back to this file");
    }

    if !report.is_complete() {
        let message = format!(
            "{} of {} locale entries are missing",
            report.missing.len(),
            report.missing.len() + report.present.len()
        );
        if args.strict {
            return Err(CliError::Custom(message));
        }
        ui::warning(&message);
        return Ok(());
    }

    ui::success("All locale entries present");
    Ok(())
}

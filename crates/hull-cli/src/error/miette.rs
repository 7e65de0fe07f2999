//! Conversion of [`CliError`] into `miette` reports for the binary.

use crate::error::CliError;
use miette::Report;

/// Turn a command error into a report, with a help line where one applies.
pub fn cli_error_to_miette(err: CliError) -> Report {
    let help = match err.hint() {
        Some(hint) => Some(hint.to_string()),
        None => default_help(err.root()).map(str::to_string),
    };

    match help {
        Some(help) => miette::miette!(help = help, "{}", err),
        None => miette::miette!("{}", err),
    }
}

fn default_help(err: &CliError) -> Option<&'static str> {
    match err {
        CliError::Config(_) => Some("Run `hull check` to validate hull.config.toml"),
        CliError::Launch { .. } => {
            Some("Set dev.command in hull.config.toml or pass the host command after `--`")
        }
        CliError::Protocol(_) => Some("Check `scheme` and the `locales` table in hull.config.toml"),
        _ => None,
    }
}

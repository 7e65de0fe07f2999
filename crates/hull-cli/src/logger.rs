//! Logging setup for the Hull CLI.
//!
//! Log records are grouped by tracing target rather than module path:
//!
//! - `main`: startup and settings
//! - `loader`: custom-scheme resolution
//! - `disable_http`: refused remote requests
//! - `supervisor`: host process lifecycle and exit codes
//!
//! `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=loader=debug`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `--verbose`, `--quiet` nor `RUST_LOG` applies.
pub const DEFAULT_FILTER: &str =
    "hull_cli=info,hull_config=info,hull_protocol=info,main=info,loader=info,disable_http=info,supervisor=info";

const VERBOSE_FILTER: &str =
    "hull_cli=debug,hull_config=debug,hull_protocol=debug,main=debug,loader=debug,disable_http=debug,supervisor=debug";

const QUIET_FILTER: &str = "error";

/// Build the filter for the given global flags.
///
/// Priority: `--verbose` > `--quiet` > `RUST_LOG` > [`DEFAULT_FILTER`].
pub fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(build_filter(verbose, quiet), no_color);
}

/// Initialize the global subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    // Targets double as log scopes, so they stay visible.
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter_wins() {
        let filter = build_filter(true, true);
        assert!(filter.to_string().contains("supervisor=debug"));
    }

    #[test]
    fn test_quiet_filter() {
        let filter = build_filter(false, true);
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::new(DEFAULT_FILTER);
        assert!(filter.to_string().contains("loader=info"));
    }
}

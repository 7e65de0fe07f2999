//! Hull CLI entry point: argument parsing, logging setup and command dispatch.

use clap::Parser;
use hull_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let config = args.config.as_deref();
    let result = match args.command {
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args, config).await,
        cli::Command::Resolve(resolve_args) => commands::resolve_execute(resolve_args, config).await,
        cli::Command::Entry(entry_args) => commands::entry_execute(entry_args, config).await,
        cli::Command::Settings(settings_args) => {
            commands::settings_execute(settings_args, config).await
        }
        cli::Command::Check(check_args) => commands::check_execute(check_args, config).await,
    };

    result.map_err(error::cli_error_to_miette)
}

//! One-line status messages on stderr.
//!
//! ```no_run
//! use hull_cli::ui::success;
//!
//! success("Dev server closed");
//! ```

use owo_colors::OwoColorize;

use super::colors_enabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Info,
    Warning,
    Error,
}

impl Status {
    fn symbol(self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Info => "ℹ",
            Status::Warning => "⚠",
            Status::Error => "✗",
        }
    }
}

fn render(status: Status, message: &str, color: bool) -> String {
    let symbol = status.symbol();
    if !color {
        return format!("{symbol} {message}");
    }

    match status {
        Status::Success => format!("{} {}", symbol.green().bold(), message),
        Status::Info => format!("{} {}", symbol.cyan().bold(), message),
        // Problems color the whole line.
        Status::Warning => format!("{} {}", symbol.yellow().bold(), message.yellow()),
        Status::Error => format!("{} {}", symbol.red().bold(), message.red()),
    }
}

fn emit(status: Status, message: &str) {
    eprintln!("{}", render(status, message, colors_enabled()));
}

pub fn success(message: &str) {
    emit(Status::Success, message);
}

pub fn info(message: &str) {
    emit(Status::Info, message);
}

pub fn warning(message: &str) {
    emit(Status::Warning, message);
}

pub fn error(message: &str) {
    emit(Status::Error, message);
}

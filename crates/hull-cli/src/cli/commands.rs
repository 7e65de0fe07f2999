use clap::{Args, Subcommand};

/// Available Hull subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the dev server and supervise the host process
    ///
    /// The host is started once the server listens, with the server URL in
    /// its environment. Closing either side shuts down the other.
    Dev(DevArgs),

    /// Resolve a scheme URL against the asset root
    ///
    /// Prints every intermediate path so mismatches between the bundle
    /// layout and the requested URL are easy to spot.
    Resolve(ResolveArgs),

    /// Print the URL the shell's first window would load
    Entry(EntryArgs),

    /// Read or write persisted shell settings
    Settings(SettingsArgs),

    /// Validate configuration and locale entries
    Check(CheckArgs),
}

/// Arguments for the dev command
#[derive(Args, Debug, Default)]
pub struct DevArgs {
    /// Address the dev server binds to
    #[arg(long, value_name = "IP")]
    pub host: Option<String>,

    /// Port for the dev server (0 picks a free port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// How often the host's exit status is polled
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Do not watch files for reload or restart
    #[arg(long)]
    pub no_watch: bool,

    /// Host command, overriding dev.command
    ///
    /// Examples:
    ///   hull dev -- electron .
    ///   hull dev -- ./target/debug/my-shell --flag
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// URL on the private scheme, e.g. app://dist/zh-cn/index.html
    pub url: String,

    /// UI locale for the no-path request; also shows its entry URL
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the entry command
#[derive(Args, Debug)]
pub struct EntryArgs {
    /// UI locale tag
    #[arg(short, long, default_value = "en-US")]
    pub locale: String,
}

/// Arguments for the settings command
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// List every stored key
    List,

    /// Print one value
    Get {
        key: String,
    },

    /// Store a value; parsed as JSON when possible, a string otherwise
    Set {
        key: String,
        value: String,
    },
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Treat missing locale entries as errors
    #[arg(long)]
    pub strict: bool,
}

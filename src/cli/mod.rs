//! CLI definitions for apptail.
//!
//! Provides the top-level parser and subcommand arguments.

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "apptail")]
#[command(version, about = "Fetch and follow the logs of hosted applications", long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Verbose diagnostics on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for apptail.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print recent logs of an application, optionally following them
    Logs(LogsArgs),

    /// Print recent logs of an add-on attached to an application
    AddonLogs(AddonLogsArgs),

    /// Config file commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options shared by both log commands.
#[derive(Args, Debug)]
pub struct FollowArgs {
    /// Keep streaming new lines after the backlog
    #[arg(short = 'f', long = "follow")]
    pub follow: bool,

    /// Number of historical lines (defaults to the config's `lines`)
    #[arg(short = 'n', long = "lines", value_name = "N", allow_negative_numbers = true)]
    pub lines: Option<i64>,
}

/// Arguments for the logs subcommand.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Application name
    #[arg(value_name = "APP")]
    pub app: String,

    #[command(flatten)]
    pub follow: FollowArgs,

    /// Only show these process types, separated by '|' (e.g. "web|worker-1")
    #[arg(short = 'F', long = "filter", value_name = "EXPR", default_value = "")]
    pub filter: String,
}

/// Arguments for the addon-logs subcommand.
#[derive(Args, Debug)]
pub struct AddonLogsArgs {
    /// Application name
    #[arg(value_name = "APP")]
    pub app: String,

    /// Add-on identifier
    #[arg(value_name = "ADDON")]
    pub addon: String,

    #[command(flatten)]
    pub follow: FollowArgs,
}

/// Config subcommand actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the config file
    Validate,
    /// Show effective configuration
    Show,
}

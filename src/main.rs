mod cli;
mod cmd;

use anyhow::Result;
use apptail::config;
use apptail::LogTarget;
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostics filter.
const LOG_ENV: &str = "APPTAIL_LOG";

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("apptail=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let code = match run(cli) {
        Ok(()) => 0,
        Err(err) => {
            // Config errors carry their own cargo-style header.
            match err.downcast_ref::<config::ConfigError>() {
                Some(config_err) => eprint!("{}", config_err),
                None => eprintln!("{} {:#}", "error:".red().bold(), err),
            }
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config { action } => {
            let result = match action {
                ConfigAction::Validate => cmd::config::validate(),
                ConfigAction::Show => cmd::config::show(),
            };
            if let Err(code) = result {
                std::process::exit(code);
            }
            Ok(())
        }
        Commands::Logs(args) => {
            let cfg = load_config()?;
            let colorize = cfg.color && !cli.no_color;
            cmd::logs::run(
                &cfg,
                LogTarget::App(args.app),
                &args.follow,
                args.filter,
                colorize,
            )
        }
        Commands::AddonLogs(args) => {
            let cfg = load_config()?;
            let colorize = cfg.color && !cli.no_color;
            cmd::logs::run(
                &cfg,
                LogTarget::Addon {
                    app: args.app,
                    addon: args.addon,
                },
                &args.follow,
                String::new(),
                colorize,
            )
        }
    }
}

fn load_config() -> Result<config::Config> {
    let discovery = config::discover();
    Ok(config::load(&discovery)?)
}

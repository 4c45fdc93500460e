//! Config validate and show commands for apptail.
//!
//! Provides config introspection and validation for CI pipelines and developer debugging.

use apptail::config::{self, Config};
use colored::Colorize;

/// Validate the effective config file.
///
/// Follows Unix conventions:
/// - Exit 0 with no output on success (quiet success)
/// - Exit 1 with error message to stderr on failure
pub fn validate() -> Result<(), i32> {
    let discovery = config::discover();
    let config_path = match discovery.effective() {
        Some(path) => path,
        None => {
            eprintln!("{} No config found to validate", "error:".red().bold());
            return Err(1);
        }
    };

    match config::load_single_file(config_path) {
        Ok(_) => Ok(()),
        Err(e) => {
            eprint!("{}", e);
            Err(1)
        }
    }
}

/// Show the effective configuration, environment overrides included.
///
/// The API token is masked. Respects NO_COLOR via the colored crate.
pub fn show() -> Result<(), i32> {
    let discovery = config::discover();
    let cfg = match config::load(&discovery) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprint!("{}", e);
            return Err(1);
        }
    };

    match cfg.loaded_from.last() {
        Some(path) => println!("Using: {}", path.display().to_string().dimmed()),
        None => println!("{}", "No config found. Using defaults.".dimmed()),
    }
    println!();
    show_config(&cfg);
    Ok(())
}

fn show_config(cfg: &Config) {
    show_field("api_url", cfg.api_url.clone());
    show_field("api_token", cfg.masked_token());
    show_field("color", Some(cfg.color.to_string()));
    show_field("lines", Some(cfg.lines.to_string()));
    show_field("transport", Some(cfg.transport.to_string()));

    println!("{}:", "reconnect".cyan());
    println!(
        "  {}: {}",
        "interval_ms".blue(),
        cfg.reconnect.interval.as_millis().to_string().green()
    );
    match cfg.reconnect.max_attempts {
        Some(max) => println!("  {}: {}", "max_attempts".blue(), max.to_string().green()),
        None => println!("  {}: {}", "max_attempts".blue(), "(unlimited)".dimmed()),
    }
}

fn show_field(name: &str, value: Option<String>) {
    match value {
        Some(value) => println!("{}: {}", name.cyan(), value.green()),
        None => println!("{}: {}", name.cyan(), "(not set)".dimmed()),
    }
}

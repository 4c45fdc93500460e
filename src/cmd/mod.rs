//! Subcommand handlers for apptail.

pub mod config;
pub mod logs;

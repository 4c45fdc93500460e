// Library interface for apptail
// Exposes the log client so the binary and tests share one implementation

pub mod api;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod frame;
pub mod logs;
pub mod render;
pub mod tail;
pub mod transport;

#[cfg(test)]
pub mod test_utils;

pub use error::{LogsError, Result};
pub use logs::{tail_logs, LogTarget, TailOptions};
